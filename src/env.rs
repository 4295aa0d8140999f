use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Per-session process state that builtins may change.
///
/// Child processes inherit `vars` and start in `current_dir`. `exit` raises
/// `should_exit` and the interpreter shuts down after that line.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Environment {
    /// Snapshot of the variables and working directory this process started with.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            should_exit: false,
        }
    }

    /// Session variable `key`, or the process variable when the session has none.
    pub fn get_var(&self, key: &str) -> Option<String> {
        match self.vars.get(key) {
            Some(val) => Some(val.clone()),
            None => stdenv::var(key).ok(),
        }
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// `HOME` (`USERPROFILE` on Windows) when set and non-empty, otherwise the
    /// platform's notion of the home directory.
    pub fn home_dir(&self) -> Option<PathBuf> {
        let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        self.get_var(key)
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_vars_shadow_process_vars() {
        let mut env = Environment::new();
        env.vars.clear();
        assert!(env.get_var("PATH").is_some());

        env.set_var("PATH", "/only/here");
        assert_eq!(env.get_var("PATH").as_deref(), Some("/only/here"));
        assert_eq!(env.get_var("AURASHELL_SURELY_UNSET_VAR"), None);
    }

    #[test]
    #[cfg(unix)]
    fn home_dir_follows_home_var() {
        let mut env = Environment::new();
        env.set_var("HOME", "/some/where/else");
        assert_eq!(env.home_dir(), Some(PathBuf::from("/some/where/else")));
    }

    #[test]
    #[cfg(unix)]
    fn empty_home_falls_back_to_platform_lookup() {
        let mut env = Environment::new();
        env.set_var("HOME", "");
        assert_eq!(env.home_dir(), dirs::home_dir());
    }
}
