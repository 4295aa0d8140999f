use crate::command::{CommandFactory, ExecutableCommand, Outcome, Session};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Lowercased stderr fragments that mean the program itself could not be found.
const NOT_FOUND_MARKERS: [&str; 3] = ["not recognized", "not found", "no such file"];

/// Command that is not a builtin.
///
/// It runs to completion with stdout and stderr captured; nothing is streamed
/// while the program is running.
pub struct ExternalCommand {
    name: String,
    program: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, program: OsString, args: Vec<OsString>) -> Self {
        Self {
            name: name.into(),
            program,
            args,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH")?;
        let executable = find_command_path(OsStr::new(&search_paths), Path::new(&name))?;
        Some(Box::new(ExternalCommand::new(
            name,
            executable.as_os_str().to_owned(),
            args.iter().map(|x| x.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session<'_>,
    ) -> Result<Outcome> {
        let env = &*session.env;
        tracing::debug!(program = ?self.program, args = ?self.args, "spawning");
        let output = match std::process::Command::new(&self.program)
            .args(&self.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .output()
        {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    name = %self.name,
                    error = %err,
                    "program vanished before spawn"
                );
                return Ok(Outcome::Unresolved);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to run {}", self.name));
            }
        };

        let code = exit_code(output.status);
        tracing::debug!(name = %self.name, code, "finished");
        if !output.status.success() && reports_missing_program(&output.stderr) {
            return Ok(Outcome::Unresolved);
        }
        stdout.write_all(&output.stdout)?;
        stdout.write_all(&output.stderr)?;
        Ok(Outcome::Finished(code))
    }
}

/// Whether a failed program's stderr says that what it tried to run is missing.
fn reports_missing_program(stderr: &[u8]) -> bool {
    let stderr = String::from_utf8_lossy(stderr).to_lowercase();
    NOT_FOUND_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
}

fn exit_code(exit_status: ExitStatus) -> i32 {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => {
            // Empty path -> not found
            None
        }
        (Some(x), None) => {
            // Single component -> search in PATH
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => {
            // Multiple components -> search in current dir
            find_by_path(path).map(Cow::Borrowed)
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
