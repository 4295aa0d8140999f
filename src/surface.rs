/// The rendering side of the shell: whatever displays output, the input line and
/// the suggestion list.
///
/// The interpreter never reads anything back from a surface; it only tells it
/// what to show.
pub trait Surface {
    /// Append text to the output area.
    fn print(&mut self, text: &str);

    /// Wipe the output area.
    fn clear(&mut self);

    /// Replace the input line with `text` and put the caret at its end. With
    /// `select_all` the whole text is also selected so that typing replaces it.
    fn set_input(&mut self, text: &str, select_all: bool);

    /// Show `matches` as the suggestion list, highlighting `selected`.
    fn show_suggestions(&mut self, matches: &[String], selected: Option<usize>);

    fn hide_suggestions(&mut self);
}

/// Memory-backed surface that records everything it is told.
///
/// Useful for embedding the interpreter without a terminal, and for tests.
#[derive(Debug, Clone, Default)]
pub struct BufferSurface {
    output: String,
    input: Option<(String, bool)>,
    suggestions: Option<(Vec<String>, Option<usize>)>,
    clears: usize,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed since the last clear.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Return the collected output and start over.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// The last text placed in the input line, if any.
    pub fn input(&self) -> Option<&str> {
        self.input.as_ref().map(|(text, _)| text.as_str())
    }

    /// Whether the last text placed in the input line was selected.
    pub fn input_selected(&self) -> bool {
        self.input.as_ref().is_some_and(|(_, selected)| *selected)
    }

    pub fn take_input(&mut self) -> Option<String> {
        self.input.take().map(|(text, _)| text)
    }

    /// The visible suggestion list and its selected row.
    pub fn suggestions(&self) -> Option<(&[String], Option<usize>)> {
        self.suggestions
            .as_ref()
            .map(|(matches, selected)| (matches.as_slice(), *selected))
    }

    /// How many times the output area was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Surface for BufferSurface {
    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn clear(&mut self) {
        self.output.clear();
        self.clears += 1;
    }

    fn set_input(&mut self, text: &str, select_all: bool) {
        self.input = Some((text.to_string(), select_all));
    }

    fn show_suggestions(&mut self, matches: &[String], selected: Option<usize>) {
        self.suggestions = Some((matches.to_vec(), selected));
    }

    fn hide_suggestions(&mut self) {
        self.suggestions = None;
    }
}
