use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Names of every program reachable through the search path.
///
/// The index is built once when the session starts and never rescanned. Names are
/// lowercased, deduplicated and kept sorted so that ranking ties and suggestion
/// order are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandIndex {
    names: Vec<String>,
}

impl CommandIndex {
    /// Scan the `PATH` of `env`.
    ///
    /// On Windows the extensions listed in `PATHEXT` decide what is executable;
    /// everywhere else a file must carry an execute bit and have no extension.
    pub fn build(env: &Environment) -> Self {
        let Some(search_paths) = env.get_var("PATH") else {
            tracing::debug!("PATH is not set, command index is empty");
            return Self::default();
        };
        let extensions = executable_extensions(env);
        Self::scan(OsStr::new(&search_paths), &extensions)
    }

    /// Scan an explicit search path. An empty `extensions` list selects the
    /// execute-bit model.
    pub fn scan(search_paths: &OsStr, extensions: &[String]) -> Self {
        let mut names = BTreeSet::new();
        for dir in std::env::split_paths(search_paths) {
            match list_commands(&dir, extensions) {
                Ok(found) => {
                    tracing::trace!(
                        dir = %dir.display(),
                        count = found.len(),
                        "indexed directory"
                    );
                    names.extend(found);
                }
                Err(err) => tracing::debug!(error = %err, "skipping search path entry"),
            }
        }
        tracing::debug!(commands = names.len(), "command index built");
        Self {
            names: names.into_iter().collect(),
        }
    }

    /// Build an index from known names, e.g. for a host without a search path.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_lowercase())
            .collect();
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names.binary_search(&name).is_ok()
    }

    /// The full candidate universe: `builtins` in the given order, then every
    /// indexed name that is not already a builtin.
    pub fn universe(&self, builtins: &[&str]) -> Vec<String> {
        let mut all: Vec<String> = builtins.iter().map(|name| name.to_string()).collect();
        all.extend(
            self.names
                .iter()
                .filter(|name| !builtins.contains(&name.as_str()))
                .cloned(),
        );
        all
    }

    /// Ask the platform's locate utility (`which`, or `where` on Windows) for the
    /// full path of `name`.
    ///
    /// This is independent of the index itself: it is a best-effort lookup used by
    /// `type`, and any failure simply means "not found".
    pub fn find_exact_path(&self, name: &str) -> Option<PathBuf> {
        let locator = if cfg!(windows) { "where" } else { "which" };
        let output = match Command::new(locator).arg(name).output() {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(locator, error = %err, "locate utility unavailable");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
    }
}

fn executable_extensions(env: &Environment) -> Vec<String> {
    if !cfg!(windows) {
        return Vec::new();
    }
    env.get_var("PATHEXT")
        .unwrap_or_default()
        .split(';')
        .filter(|ext| !ext.is_empty())
        .map(str::to_owned)
        .collect()
}

fn list_commands(dir: &Path, extensions: &[String]) -> ShellResult<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|source| ShellError::ResourceUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };
        let path = entry.path();
        if let Some(name) = command_name(&file_name, extensions, || is_executable(&path)) {
            found.push(name);
        }
    }
    Ok(found)
}

/// Map a directory entry to the command name it provides, if any.
///
/// With `extensions`, a file whose name ends in one of them (case-insensitive)
/// provides its stem. Without, a file with no `.` in its name provides itself
/// when `executable` says so.
fn command_name(
    file_name: &str,
    extensions: &[String],
    executable: impl FnOnce() -> bool,
) -> Option<String> {
    if extensions.is_empty() {
        if file_name.contains('.') || !executable() {
            return None;
        }
        return Some(file_name.to_lowercase());
    }

    let lowered = file_name.to_lowercase();
    if !extensions
        .iter()
        .any(|ext| lowered.ends_with(&ext.to_lowercase()))
    {
        return None;
    }
    Path::new(file_name)
        .file_stem()
        .and_then(OsStr::to_str)
        .filter(|stem| !stem.is_empty())
        .map(str::to_lowercase)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    // fs::metadata follows symlinks, which PATH directories are full of.
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_unique_temp_dir;
    use std::fs::File;

    #[cfg(unix)]
    fn touch(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        File::create(path).expect("touch");
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("chmod");
    }

    #[test]
    fn extension_model_strips_known_extensions() {
        let exts = vec![".EXE".to_string(), ".BAT".to_string()];
        assert_eq!(
            command_name("Notepad.exe", &exts, || false),
            Some("notepad".to_string())
        );
        assert_eq!(
            command_name("build.bat", &exts, || false),
            Some("build".to_string())
        );
        assert_eq!(command_name("readme.txt", &exts, || true), None);
    }

    #[test]
    fn execute_bit_model_rejects_dotted_names() {
        assert_eq!(command_name("Git", &[], || true), Some("git".to_string()));
        assert_eq!(command_name("git", &[], || false), None);
        assert_eq!(command_name("lib.so", &[], || true), None);
    }

    #[test]
    #[cfg(unix)]
    fn scan_finds_executables_sorted_and_deduplicated() {
        let first = make_unique_temp_dir("first");
        let second = make_unique_temp_dir("second");
        touch(&first.join("zeta"), 0o755);
        touch(&first.join("Alpha"), 0o755);
        touch(&first.join("notes"), 0o644);
        touch(&first.join("script.sh"), 0o755);
        touch(&second.join("alpha"), 0o755);
        fs::create_dir_all(first.join("subdir")).unwrap();

        let missing = first.join("does_not_exist");
        let search = std::env::join_paths([&first, &missing, &second]).unwrap();
        let index = CommandIndex::scan(&search, &[]);

        assert_eq!(index.names(), &["alpha".to_string(), "zeta".to_string()]);
        assert!(index.contains("ZETA"));
        assert!(!index.contains("notes"));

        let _ = fs::remove_dir_all(first);
        let _ = fs::remove_dir_all(second);
    }

    #[test]
    fn universe_lists_builtins_first_without_duplicates() {
        let index = CommandIndex::from_names(["ls", "echo", "git"]);
        let universe = index.universe(&["exit", "echo"]);
        assert_eq!(universe, vec!["exit", "echo", "git", "ls"]);
    }

    #[test]
    fn build_without_path_is_empty() {
        let mut env = Environment::new();
        env.set_var("PATH", "");
        assert!(CommandIndex::build(&env).is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn find_exact_path_locates_sh() {
        let index = CommandIndex::default();
        if let Some(path) = index.find_exact_path("sh") {
            assert!(path.ends_with("sh"), "unexpected path {:?}", path);
        }
        assert_eq!(
            index.find_exact_path("surely_no_such_command_aurashell_xyz"),
            None
        );
    }
}
