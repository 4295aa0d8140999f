/// Direction of an explicit selection move in the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Live prefix completion for the command being typed.
///
/// The engine only holds what is on screen: the displayed matches and the
/// selected row. It is recomputed on every text change; the selection survives a
/// recomputation only when the match list comes out identical.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    displayed: Vec<String>,
    selected: Option<usize>,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the matches for `buffer` over `universe`.
    ///
    /// Returns whether the list should be visible afterwards. A buffer that is
    /// empty or already holds whitespace (the user is past the command name)
    /// hides the list.
    pub fn update(&mut self, buffer: &str, universe: &[String]) -> bool {
        if buffer.is_empty() || buffer.chars().any(char::is_whitespace) {
            self.hide();
            return false;
        }

        let matches: Vec<String> = universe
            .iter()
            .filter(|name| name.starts_with(buffer))
            .cloned()
            .collect();
        if matches.is_empty() {
            self.hide();
            return false;
        }

        if matches != self.displayed {
            self.selected = None;
            self.displayed = matches;
        } else if self.selected.is_some_and(|i| i >= self.displayed.len()) {
            self.selected = None;
        }
        true
    }

    pub fn is_active(&self) -> bool {
        !self.displayed.is_empty()
    }

    pub fn matches(&self) -> &[String] {
        &self.displayed
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move the selection one row, wrapping at both ends. With nothing selected,
    /// forward picks the first row and backward the last.
    pub fn navigate(&mut self, direction: Direction) -> Option<usize> {
        let len = self.displayed.len();
        if len == 0 {
            return None;
        }
        let next = match (self.selected, direction) {
            (None, Direction::Forward) => 0,
            (None, Direction::Backward) => len - 1,
            (Some(i), Direction::Forward) => (i + 1) % len,
            (Some(i), Direction::Backward) => (i + len - 1) % len,
        };
        self.selected = Some(next);
        self.selected
    }

    /// Take the selected candidate as the new input text (with a trailing space)
    /// and hide the list. Returns `None` when nothing is selected.
    pub fn confirm(&mut self) -> Option<String> {
        let chosen = self
            .selected
            .and_then(|i| self.displayed.get(i))
            .map(|name| format!("{} ", name))?;
        self.hide();
        Some(chosen)
    }

    pub fn hide(&mut self) {
        self.displayed.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefix_matches_keep_universe_order() {
        let all = universe(&["git", "give", "ls"]);
        let mut engine = SuggestionEngine::new();
        assert!(engine.update("gi", &all));
        assert_eq!(engine.matches(), &["git".to_string(), "give".to_string()]);
        assert_eq!(engine.selected(), None);
    }

    #[test]
    fn unchanged_matches_keep_selection() {
        let all = universe(&["git", "give", "ls"]);
        let mut engine = SuggestionEngine::new();
        engine.update("gi", &all);
        engine.navigate(Direction::Forward);
        engine.navigate(Direction::Forward);
        assert_eq!(engine.selected(), Some(1));

        assert!(engine.update("gi", &all));
        assert_eq!(engine.selected(), Some(1));
    }

    #[test]
    fn changed_matches_reset_selection() {
        let all = universe(&["git", "give", "ls"]);
        let mut engine = SuggestionEngine::new();
        engine.update("g", &all);
        engine.navigate(Direction::Backward);
        assert_eq!(engine.selected(), Some(1));

        engine.update("giv", &all);
        assert_eq!(engine.matches(), &["give".to_string()]);
        assert_eq!(engine.selected(), None);
    }

    #[test]
    fn whitespace_empty_or_no_match_hides() {
        let all = universe(&["git", "give"]);
        let mut engine = SuggestionEngine::new();
        assert!(engine.update("g", &all));
        assert!(!engine.update("git status", &all));
        assert!(!engine.is_active());

        engine.update("g", &all);
        assert!(!engine.update("", &all));
        assert!(!engine.update("zz", &all));
        assert!(engine.matches().is_empty());
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let all = universe(&["git"]);
        let mut engine = SuggestionEngine::new();
        assert!(!engine.update("GI", &all));
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let all = universe(&["ga", "gb", "gc"]);
        let mut engine = SuggestionEngine::new();
        engine.update("g", &all);

        assert_eq!(engine.navigate(Direction::Backward), Some(2));
        assert_eq!(engine.navigate(Direction::Forward), Some(0));
        assert_eq!(engine.navigate(Direction::Backward), Some(2));
        assert_eq!(engine.navigate(Direction::Backward), Some(1));
    }

    #[test]
    fn navigate_without_list_does_nothing() {
        let mut engine = SuggestionEngine::new();
        assert_eq!(engine.navigate(Direction::Forward), None);
    }

    #[test]
    fn confirm_returns_selection_with_space_and_hides() {
        let all = universe(&["git", "give"]);
        let mut engine = SuggestionEngine::new();
        engine.update("gi", &all);
        assert_eq!(engine.confirm(), None);

        engine.navigate(Direction::Forward);
        assert_eq!(engine.confirm(), Some("git ".to_string()));
        assert!(!engine.is_active());
        assert_eq!(engine.selected(), None);
    }
}
