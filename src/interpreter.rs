use crate::builtin;
use crate::command::{CommandFactory, Outcome, Session};
use crate::correction::{self, PendingCorrection};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::history::HistoryStore;
use crate::index::CommandIndex;
use crate::suggest::{Direction, SuggestionEngine};
use crate::surface::Surface;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only commands defined in this crate are supported: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Something the host surface observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// The input line now reads this text because the user typed.
    TextChanged(String),
    /// The user pressed Enter on this line.
    SubmitLine(String),
    NavigateKey(NavKey),
}

/// Keys that move through the suggestion list or the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Previous suggestion while the list is visible, otherwise older history.
    Up,
    /// Next suggestion while the list is visible, otherwise newer history.
    Down,
    /// Older history, even while suggestions are visible.
    HistoryBack,
    /// Newer history, even while suggestions are visible.
    HistoryForward,
    /// Next suggestion.
    Tab,
    /// Dismiss the suggestion list.
    Escape,
}

/// Whether the session goes on after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// What the next submitted line means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// The line is a command.
    #[default]
    Normal,
    /// The line answers the correction menu that was just printed.
    AwaitingCorrection(PendingCorrection),
}

/// The command-interpretation core of the shell.
///
/// The interpreter owns the [`Environment`], the command index, the history and
/// the suggestion state, and reacts to [`ShellEvent`]s forwarded by a host. All
/// visible effects go through the [`Surface`] passed to [`handle`](Self::handle).
///
/// Example
/// ```
/// use aurashell::{BufferSurface, Flow, Interpreter, ShellEvent};
/// let mut sh = Interpreter::default();
/// let mut surface = BufferSurface::new();
/// let flow = sh.handle(ShellEvent::SubmitLine("echo hello world".into()), &mut surface);
/// assert_eq!(flow, Flow::Continue);
/// assert_eq!(surface.output(), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    builtins: Vec<&'static str>,
    index: CommandIndex,
    universe: Vec<String>,
    history: HistoryStore,
    suggestions: SuggestionEngine,
    mode: Mode,
}

impl Interpreter {
    /// Create an interpreter from explicit parts.
    ///
    /// Factories are consulted in order; builtin factories should come before the
    /// external launcher so that builtins win.
    pub fn new(
        env: Environment,
        commands: Vec<Box<dyn CommandFactory>>,
        index: CommandIndex,
        history: HistoryStore,
    ) -> Self {
        let builtins: Vec<&'static str> = commands
            .iter()
            .filter_map(|f| f.builtin_name())
            .collect();
        let universe = index.universe(&builtins);
        Self {
            env,
            commands,
            builtins,
            index,
            universe,
            history,
            suggestions: SuggestionEngine::new(),
            mode: Mode::Normal,
        }
    }

    /// Create an interpreter with the default commands, indexing the `PATH` of `env`.
    pub fn with_history(env: Environment, history: HistoryStore) -> Self {
        let index = CommandIndex::build(&env);
        Self::new(env, Self::default_commands(), index, history)
    }

    /// The builtins in documented order followed by the external command launcher.
    pub fn default_commands() -> Vec<Box<dyn CommandFactory>> {
        let mut commands = builtin::factories();
        commands.push(Box::new(Factory::<ExternalCommand>::default()));
        commands
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_awaiting_correction(&self) -> bool {
        matches!(self.mode, Mode::AwaitingCorrection(_))
    }

    pub fn builtin_names(&self) -> &[&'static str] {
        &self.builtins
    }

    /// Builtins followed by indexed commands: what suggestions and corrections draw from.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    /// React to one host event.
    pub fn handle(&mut self, event: ShellEvent, surface: &mut dyn Surface) -> Flow {
        match event {
            ShellEvent::TextChanged(text) => {
                self.text_changed(&text, surface);
                Flow::Continue
            }
            ShellEvent::SubmitLine(line) => self.submit(&line, surface),
            ShellEvent::NavigateKey(key) => {
                self.navigate(key, surface);
                Flow::Continue
            }
        }
    }

    /// Persist the history before the session ends. A failed save is reported but
    /// does not stop the shutdown.
    pub fn shutdown(&mut self, surface: &mut dyn Surface) {
        surface.print("Saving history... Exiting AuraShell...\n");
        if let Err(err) = self.history.save() {
            tracing::warn!(error = %err, "history was not saved");
            surface.print(&format!("Error saving history: {}\n", err));
        }
    }

    fn submit(&mut self, line: &str, surface: &mut dyn Surface) -> Flow {
        // Enter on a highlighted suggestion takes the suggestion instead of running.
        if let Some(text) = self.suggestions.confirm() {
            surface.hide_suggestions();
            surface.set_input(&text, true);
            return Flow::Continue;
        }
        self.hide_suggestions(surface);

        let line = line.trim();
        if line.is_empty() {
            self.history.reset_cursor();
        } else {
            self.history.append(line);
        }

        if let Mode::AwaitingCorrection(pending) = std::mem::take(&mut self.mode) {
            self.resolve_correction(pending, line, surface);
            return Flow::Continue;
        }

        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Flow::Continue;
        };
        let args: Vec<&str> = words.collect();
        self.run(name, &args, surface)
    }

    fn run(&mut self, name: &str, args: &[&str], surface: &mut dyn Surface) -> Flow {
        let mut out = Vec::new();
        let outcome = self.dispatch(name, args, &mut out);
        if !out.is_empty() {
            surface.print(&String::from_utf8_lossy(&out));
        }

        match outcome {
            Ok(Outcome::Finished(code)) => tracing::trace!(name, code, "command finished"),
            Ok(Outcome::ClearScreen) => surface.clear(),
            Ok(Outcome::Unresolved) => self.offer_corrections(name, args, surface),
            Err(err) => {
                tracing::warn!(name, error = %err, "command failed");
                surface.print(&format!("Error: {:#}\n", err));
            }
        }

        if self.env.should_exit {
            self.shutdown(surface);
            return Flow::Exit;
        }
        Flow::Continue
    }

    fn dispatch(
        &mut self,
        name: &str,
        args: &[&str],
        out: &mut Vec<u8>,
    ) -> anyhow::Result<Outcome> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                let mut session = Session {
                    env: &mut self.env,
                    history: &self.history,
                    index: &self.index,
                    builtins: &self.builtins,
                };
                return cmd.execute(out, &mut session);
            }
        }
        Ok(Outcome::Unresolved)
    }

    fn offer_corrections(&mut self, name: &str, args: &[&str], surface: &mut dyn Surface) {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        match correction::suggest(name, &args, &self.universe) {
            Some(pending) => {
                surface.print(&pending.menu());
                self.mode = Mode::AwaitingCorrection(pending);
            }
            None => {
                let err = ShellError::CommandNotFound(name.to_string());
                surface.print(&format!("{}\n", err));
            }
        }
    }

    fn resolve_correction(
        &mut self,
        pending: PendingCorrection,
        response: &str,
        surface: &mut dyn Surface,
    ) {
        let typo = pending.typo().to_string();
        match correction::resolve(pending, response) {
            Ok(text) => {
                tracing::debug!(typo = %typo, chosen = text.trim_end(), "correction accepted");
                surface.set_input(&text, true);
            }
            Err(err) => {
                tracing::debug!(typo = %typo, error = %err, "correction dropped");
                surface.print(&format!("{}\n", err));
            }
        }
    }

    fn text_changed(&mut self, text: &str, surface: &mut dyn Surface) {
        if self.suggestions.update(text, &self.universe) {
            surface.show_suggestions(self.suggestions.matches(), self.suggestions.selected());
        } else {
            surface.hide_suggestions();
        }
    }

    fn navigate(&mut self, key: NavKey, surface: &mut dyn Surface) {
        let listing = self.suggestions.is_active();
        match key {
            NavKey::Up if listing => self.move_selection(Direction::Backward, surface),
            NavKey::Down | NavKey::Tab if listing => {
                self.move_selection(Direction::Forward, surface)
            }
            NavKey::Tab => {}
            NavKey::Up | NavKey::HistoryBack => {
                self.hide_suggestions(surface);
                let text = self.history.back().to_string();
                surface.set_input(&text, false);
            }
            NavKey::Down | NavKey::HistoryForward => {
                self.hide_suggestions(surface);
                let text = self.history.forward().to_string();
                surface.set_input(&text, false);
            }
            NavKey::Escape => self.hide_suggestions(surface),
        }
    }

    fn move_selection(&mut self, direction: Direction, surface: &mut dyn Surface) {
        self.suggestions.navigate(direction);
        surface.show_suggestions(self.suggestions.matches(), self.suggestions.selected());
    }

    fn hide_suggestions(&mut self, surface: &mut dyn Surface) {
        if self.suggestions.is_active() {
            self.suggestions.hide();
            surface.hide_suggestions();
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default commands, the `PATH` of the current
    /// process and a history that is not persisted.
    fn default() -> Self {
        Self::with_history(Environment::new(), HistoryStore::in_memory())
    }
}
