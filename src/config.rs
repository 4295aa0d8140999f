use crate::env::Environment;
use argh::FromArgs;
use std::path::PathBuf;

/// File name of the history kept in the home directory.
pub const HISTORY_FILE_NAME: &str = ".aurashell_history";

/// Log filter used when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(FromArgs, Debug)]
/// AuraShell: an interactive shell with live command suggestions and typo correction.
pub struct ShellArgs {
    #[argh(option)]
    /// file the command history is loaded from and saved to (default: ~/.aurashell_history).
    pub history_file: Option<PathBuf>,

    #[argh(option)]
    /// tracing filter used when RUST_LOG is not set (default: warn).
    pub log_level: Option<String>,
}

/// Settings of one interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub history_file: PathBuf,
    pub log_level: String,
}

impl ShellConfig {
    /// Fill in defaults for everything the command line left out.
    pub fn from_args(args: ShellArgs, env: &Environment) -> Self {
        let history_file = args.history_file.unwrap_or_else(|| {
            env.home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(HISTORY_FILE_NAME)
        });
        Self {
            history_file,
            log_level: args
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn defaults_live_in_home() {
        let mut env = Environment::new();
        env.set_var("HOME", "/home/someone");
        let args = ShellArgs::from_args(&["aurashell"], &[]).expect("no arguments is valid");
        let config = ShellConfig::from_args(args, &env);
        assert_eq!(
            config.history_file,
            PathBuf::from("/home/someone/.aurashell_history")
        );
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn options_override_defaults() {
        let args = ShellArgs::from_args(
            &["aurashell"],
            &["--history-file", "/tmp/h.txt", "--log-level", "debug"],
        )
        .expect("valid options");
        let config = ShellConfig::from_args(args, &Environment::new());
        assert_eq!(config.history_file, PathBuf::from("/tmp/h.txt"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert!(ShellArgs::from_args(&["aurashell"], &["script.sh"]).is_err());
    }
}
