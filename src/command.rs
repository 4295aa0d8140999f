use crate::env::Environment;
use crate::history::HistoryStore;
use crate::index::CommandIndex;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// What happened when a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran to completion with the given exit code.
    Finished(ExitCode),
    /// The command could not be resolved to anything runnable; the caller should
    /// offer corrections instead of reporting output.
    Unresolved,
    /// The command asked the host to wipe its output surface.
    ClearScreen,
}

/// Session state a command is allowed to see while it runs.
///
/// Commands get the environment mutably (`cd` and `exit` change it) and the
/// history and command index read-only.
pub struct Session<'a> {
    pub env: &'a mut Environment,
    pub history: &'a HistoryStore,
    pub index: &'a CommandIndex,
    /// Builtin names in their documented order.
    pub builtins: &'a [&'static str],
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
/// Everything a command prints goes to `stdout`; the interpreter forwards it to
/// the output surface once the command returns.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, session: &mut Session<'_>)
    -> Result<Outcome>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables (e.g., using PATH).
pub trait CommandFactory: Send + Sync {
    /// Name of the builtin this factory produces, if it produces one.
    fn builtin_name(&self) -> Option<&'static str> {
        None
    }

    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
