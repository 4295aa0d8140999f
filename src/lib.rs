//! AuraShell: an interactive shell core with live command suggestions,
//! typo correction and persistent history.
//!
//! The crate is split into a UI-independent part and a terminal host. The
//! [`Interpreter`] consumes [`ShellEvent`]s and reports everything it wants
//! shown through a [`Surface`], so it can be driven by a test, by a GUI, or by
//! the `rustyline` loop in [`repl`]. Command lookup, history, suggestions and
//! corrections live in their own modules ([`index`], [`history`], [`suggest`],
//! [`correction`]) and can be used on their own.

mod builtin;
pub mod command;
pub mod config;
pub mod correction;
pub mod env;
pub mod error;
mod external;
pub mod history;
pub mod index;
mod interpreter;
pub mod repl;
pub mod suggest;
pub mod surface;

pub use config::ShellConfig;
pub use error::ShellError;
pub use history::HistoryStore;
pub use index::CommandIndex;
pub use interpreter::{Flow, Interpreter, Mode, NavKey, ShellEvent};
pub use suggest::SuggestionEngine;
pub use surface::{BufferSurface, Surface};
