//! Terminal host: a `rustyline` editor that forwards keystrokes to the
//! [`Interpreter`] as [`ShellEvent`]s and renders what it is told.

use crate::config::ShellConfig;
use crate::env::Environment;
use crate::history::HistoryStore;
use crate::interpreter::{Flow, Interpreter, NavKey, ShellEvent};
use crate::surface::Surface;
use anyhow::anyhow;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hint, Hinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Context, Editor, Event, EventContext, EventHandler,
    Helper, KeyCode, KeyEvent, Modifiers, Movement, RepeatCount,
};
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Rows of the suggestion list shown at once.
const VISIBLE_SUGGESTIONS: usize = 10;

/// Renders interpreter output on stdout and keeps what the line editor needs
/// to draw next.
struct TerminalSurface {
    at_line_start: bool,
    pending_input: Option<String>,
    suggestions: Option<(Vec<String>, Option<usize>)>,
}

impl TerminalSurface {
    fn new() -> Self {
        Self {
            at_line_start: true,
            pending_input: None,
            suggestions: None,
        }
    }

    /// Make sure the next prompt starts on a fresh line.
    fn finish_line(&mut self) {
        if !self.at_line_start {
            self.print("\n");
        }
    }

    /// The suggestion list as one line, selected entry in brackets.
    fn hint(&self) -> Option<SuggestionHint> {
        let (matches, selected) = self.suggestions.as_ref()?;
        let start = selected
            .map(|i| i.saturating_sub(VISIBLE_SUGGESTIONS - 1))
            .unwrap_or(0);
        let mut rendered: Vec<String> = matches
            .iter()
            .enumerate()
            .skip(start)
            .take(VISIBLE_SUGGESTIONS)
            .map(|(i, name)| {
                if Some(i) == *selected {
                    format!("[{}]", name)
                } else {
                    name.clone()
                }
            })
            .collect();
        let hidden = matches.len() - rendered.len();
        if hidden > 0 {
            rendered.push(format!("(+{})", hidden));
        }
        Some(SuggestionHint(format!("   {}", rendered.join("  "))))
    }
}

impl Surface for TerminalSurface {
    fn print(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        print!("{}", text);
        let _ = io::stdout().flush();
        self.at_line_start = text.ends_with('\n');
    }

    fn clear(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
        self.at_line_start = true;
    }

    fn set_input(&mut self, text: &str, _select_all: bool) {
        // A terminal line has no selection; the caret lands at the end.
        self.pending_input = Some(text.to_string());
    }

    fn show_suggestions(&mut self, matches: &[String], selected: Option<usize>) {
        self.suggestions = Some((matches.to_vec(), selected));
    }

    fn hide_suggestions(&mut self) {
        self.suggestions = None;
    }
}

/// Everything the editor callbacks and the read loop share.
struct Shared {
    interpreter: Interpreter,
    surface: TerminalSurface,
    /// Input text the interpreter has already seen; refreshes that do not change
    /// the text (cursor moves, our own replacements) are not text changes.
    last_text: String,
}

type SharedState = Arc<Mutex<Shared>>;

fn lock(state: &SharedState) -> MutexGuard<'_, Shared> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Suggestion list drawn after the cursor. It is display only: accepting a hint
/// must not paste the list into the line.
struct SuggestionHint(String);

impl Hint for SuggestionHint {
    fn display(&self) -> &str {
        &self.0
    }

    fn completion(&self) -> Option<&str> {
        None
    }
}

struct ShellHelper {
    state: SharedState,
}

impl Hinter for ShellHelper {
    type Hint = SuggestionHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<SuggestionHint> {
        let mut guard = lock(&self.state);
        let shared = &mut *guard;
        if shared.last_text != line {
            shared.last_text = line.to_string();
            shared
                .interpreter
                .handle(ShellEvent::TextChanged(line.to_string()), &mut shared.surface);
        }
        if pos < line.len() {
            return None;
        }
        shared.surface.hint()
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{}\x1b[0m", hint))
    }
}

impl Completer for ShellHelper {
    type Candidate = String;
}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// Forwards one navigation key and turns the interpreter's reaction into an
/// editor command.
struct NavHandler {
    state: SharedState,
    key: NavKey,
}

impl ConditionalEventHandler for NavHandler {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        _ctx: &EventContext,
    ) -> Option<Cmd> {
        let mut guard = lock(&self.state);
        let shared = &mut *guard;
        shared
            .interpreter
            .handle(ShellEvent::NavigateKey(self.key), &mut shared.surface);
        match shared.surface.pending_input.take() {
            Some(text) => {
                shared.last_text = text.clone();
                Some(Cmd::Replace(Movement::WholeLine, Some(text)))
            }
            None => Some(Cmd::Repaint),
        }
    }
}

fn bind_navigation(rl: &mut Editor<ShellHelper, DefaultHistory>, state: &SharedState) {
    let bindings = [
        (KeyEvent(KeyCode::Up, Modifiers::NONE), NavKey::Up),
        (KeyEvent(KeyCode::Down, Modifiers::NONE), NavKey::Down),
        (KeyEvent(KeyCode::Up, Modifiers::CTRL), NavKey::HistoryBack),
        (KeyEvent(KeyCode::Down, Modifiers::CTRL), NavKey::HistoryForward),
        (KeyEvent(KeyCode::Tab, Modifiers::NONE), NavKey::Tab),
        (KeyEvent(KeyCode::Esc, Modifiers::NONE), NavKey::Escape),
    ];
    for (key_event, key) in bindings {
        rl.bind_sequence(
            key_event,
            EventHandler::Conditional(Box::new(NavHandler {
                state: Arc::clone(state),
                key,
            })),
        );
    }
}

fn prompt(interpreter: &Interpreter) -> String {
    if interpreter.is_awaiting_correction() {
        return "? ".to_string();
    }
    format!("{}$ ", interpreter.env().current_dir.display())
}

/// Run an interactive session until `exit` or end of input.
pub fn run(config: &ShellConfig) -> anyhow::Result<()> {
    let env = Environment::new();
    let (history, load_error) = HistoryStore::load(&config.history_file);
    let interpreter = Interpreter::with_history(env, history);
    tracing::debug!(
        commands = interpreter.universe().len(),
        "interpreter ready"
    );

    let state: SharedState = Arc::new(Mutex::new(Shared {
        interpreter,
        surface: TerminalSurface::new(),
        last_text: String::new(),
    }));

    let rl_config = Config::builder().auto_add_history(false).build();
    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::with_config(rl_config)
        .map_err(|e| anyhow!("failed to create readline editor: {}", e))?;
    rl.set_helper(Some(ShellHelper {
        state: Arc::clone(&state),
    }));
    bind_navigation(&mut rl, &state);

    {
        let mut guard = lock(&state);
        if let Some(err) = load_error {
            tracing::warn!(error = %err, "history was not loaded");
            guard.surface.print(&format!("Error loading history: {}\n", err));
        }
        guard
            .surface
            .print("Welcome to AuraShell. History loaded. Type 'help' for commands.\n");
    }

    loop {
        let (prompt, initial) = {
            let mut guard = lock(&state);
            let shared = &mut *guard;
            shared.surface.finish_line();
            let initial = shared.surface.pending_input.take().unwrap_or_default();
            shared.last_text = initial.clone();
            (prompt(&shared.interpreter), initial)
        };

        match rl.readline_with_initial(&prompt, (&initial, "")) {
            Ok(line) => {
                let mut guard = lock(&state);
                let shared = &mut *guard;
                let flow = shared
                    .interpreter
                    .handle(ShellEvent::SubmitLine(line), &mut shared.surface);
                if flow == Flow::Exit {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C drops the current line
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!(error = %err, "readline failed");
                break;
            }
        }
    }

    let mut guard = lock(&state);
    let shared = &mut *guard;
    shared.surface.finish_line();
    shared.interpreter.shutdown(&mut shared.surface);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_brackets_selection() {
        let mut surface = TerminalSurface::new();
        assert!(surface.hint().is_none());

        surface.show_suggestions(&["git".to_string(), "give".to_string()], Some(1));
        assert_eq!(surface.hint().unwrap().display(), "   git  [give]");
        assert_eq!(surface.hint().unwrap().completion(), None);
    }

    #[test]
    fn hint_windows_long_lists_around_selection() {
        let names: Vec<String> = (0..15).map(|i| format!("cmd{:02}", i)).collect();
        let mut surface = TerminalSurface::new();

        surface.show_suggestions(&names, None);
        let hint = surface.hint().unwrap();
        assert!(hint.display().starts_with("   cmd00  cmd01"));
        assert!(hint.display().ends_with("cmd09  (+5)"));

        surface.show_suggestions(&names, Some(12));
        let hint = surface.hint().unwrap();
        assert!(hint.display().starts_with("   cmd03"));
        assert!(hint.display().contains("[cmd12]"));
    }

    #[test]
    fn set_input_is_kept_for_next_prompt() {
        let mut surface = TerminalSurface::new();
        surface.set_input("git ", true);
        assert_eq!(surface.pending_input.as_deref(), Some("git "));
        surface.hide_suggestions();
        assert!(surface.suggestions.is_none());
    }
}
