use crate::command::{CommandFactory, ExecutableCommand, Outcome, Session};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use anyhow::{Result, anyhow};
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process. They take no flags: every word after the name is
/// plain data, and words a builtin has no use for are ignored.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Build the command from the words that followed its name.
    fn from_words(args: &[&str]) -> Self;

    /// Executes the command, writing whatever it prints to `stdout`.
    fn execute(self, stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        session: &mut Session<'_>,
    ) -> Result<Outcome> {
        match BuiltinCommand::execute(*self, stdout, session) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                Ok(Outcome::Finished(1))
            }
        }
    }
}

impl<T: BuiltinCommand + Send + Sync + 'static> CommandFactory for Factory<T> {
    fn builtin_name(&self) -> Option<&'static str> {
        Some(T::name())
    }

    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(Box::new(T::from_words(args)))
        } else {
            None
        }
    }
}

/// Factories for every builtin, in the order `help` lists them.
pub(crate) fn factories() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<Type>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<History>::default()),
        Box::new(Factory::<Clear>::default()),
        Box::new(Factory::<Help>::default()),
    ]
}

fn first_word(args: &[&str]) -> Option<String> {
    args.first().map(|word| word.to_string())
}

/// Leave the shell, saving the command history first. Arguments are ignored.
#[derive(Debug, PartialEq, Eq)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_words(_args: &[&str]) -> Self {
        Exit
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome> {
        session.env.should_exit = true;
        Ok(Outcome::Finished(0))
    }
}

/// Write the arguments to standard output, separated by spaces.
#[derive(Debug, PartialEq, Eq)]
pub struct Echo {
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn from_words(args: &[&str]) -> Self {
        Echo {
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session<'_>) -> Result<Outcome> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(Outcome::Finished(0))
    }
}

/// Tell whether a name is a builtin or where the program it runs lives.
#[derive(Debug, PartialEq, Eq)]
pub struct Type {
    pub name: Option<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn from_words(args: &[&str]) -> Self {
        Type {
            name: first_word(args),
        }
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome> {
        let Some(name) = self.name else {
            writeln!(stdout, "type: missing operand")?;
            return Ok(Outcome::Finished(1));
        };

        if session.builtins.contains(&name.as_str()) {
            writeln!(stdout, "{} is a shell builtin", name)?;
            return Ok(Outcome::Finished(0));
        }
        match session.index.find_exact_path(&name) {
            Some(path) => {
                writeln!(stdout, "{} is {}", name, path.display())?;
                Ok(Outcome::Finished(0))
            }
            None => {
                writeln!(stdout, "{}: not found", name)?;
                Ok(Outcome::Finished(1))
            }
        }
    }
}

/// Change the current working directory.
/// Without a target, or with `~`, changes to the home directory.
#[derive(Debug, PartialEq, Eq)]
pub struct Cd {
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_words(args: &[&str]) -> Self {
        Cd {
            target: first_word(args),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome> {
        let env = &mut *session.env;
        let target = match self.target.as_deref() {
            None | Some("~") => env
                .home_dir()
                .ok_or_else(|| anyhow!("cd error: home directory is not known"))?,
            Some(t) => PathBuf::from(t),
        };

        let new_dir = if target.is_absolute() {
            target.clone()
        } else {
            env.current_dir.join(&target)
        };

        let canonical = fs::canonicalize(&new_dir).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ShellError::DirectoryNotFound(target.clone()),
            _ => ShellError::Filesystem {
                context: "cd error".to_string(),
                source,
            },
        })?;

        env::set_current_dir(&canonical).map_err(|source| ShellError::Filesystem {
            context: "cd error".to_string(),
            source,
        })?;
        env.current_dir = canonical;
        Ok(Outcome::Finished(0))
    }
}

/// Print the current working directory to standard output.
#[derive(Debug, PartialEq, Eq)]
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn from_words(_args: &[&str]) -> Self {
        Pwd
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome> {
        writeln!(stdout, "{}", session.env.current_dir.to_string_lossy())?;
        Ok(Outcome::Finished(0))
    }
}

/// Print every line submitted so far, oldest first.
#[derive(Debug, PartialEq, Eq)]
pub struct History;

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn from_words(_args: &[&str]) -> Self {
        History
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome> {
        for (i, entry) in session.history.entries().iter().enumerate() {
            writeln!(stdout, "  {}  {}", i + 1, entry)?;
        }
        Ok(Outcome::Finished(0))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Clear;

impl BuiltinCommand for Clear {
    fn name() -> &'static str {
        "clear"
    }

    fn from_words(_args: &[&str]) -> Self {
        Clear
    }

    fn execute(self, _stdout: &mut dyn Write, _session: &mut Session<'_>) -> Result<Outcome> {
        Ok(Outcome::ClearScreen)
    }
}

/// List the builtin commands.
#[derive(Debug, PartialEq, Eq)]
pub struct Help;

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn from_words(_args: &[&str]) -> Self {
        Help
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session<'_>) -> Result<Outcome> {
        writeln!(stdout, "AuraShell Built-in Commands:")?;
        for name in session.builtins {
            writeln!(stdout, "  - {}", name)?;
        }
        writeln!(
            stdout,
            "All other system commands (ls, grep, etc.) are also available."
        )?;
        Ok(Outcome::Finished(0))
    }
}
