use crate::interpreter::KEYWORDS;

const MAX_SUGGESTIONS: usize = 5;

/// The single editable input line under the transcript.
#[derive(Default)]
pub struct LineEditor {
    buffer: String,
    /// Cursor position, counted in chars.
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    suggestions: Vec<String>,
    suggestion_index: Option<usize>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn selected_suggestion(&self) -> Option<usize> {
        self.suggestion_index
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_pos)
            .map_or(self.buffer.len(), |(offset, _)| offset)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn insert_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let offset = self.byte_offset(self.cursor);
            self.buffer.insert(offset, ch);
            self.cursor += 1;
        }
        self.update_suggestions();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let offset = self.byte_offset(self.cursor);
            self.buffer.remove(offset);
            self.update_suggestions();
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let offset = self.byte_offset(self.cursor);
            self.buffer.remove(offset);
            self.update_suggestions();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Drops the current line without recording it (Ctrl+C).
    pub fn discard(&mut self) {
        self.set_buffer(String::new());
        self.history_index = None;
    }

    /// Hands back the finished line and resets for the next one.
    pub fn take_line(&mut self) -> String {
        let line = self.take_unrecorded();
        if !line.trim().is_empty() && self.history.last() != Some(&line) {
            self.history.push(line.clone());
        }
        line
    }

    fn take_unrecorded(&mut self) -> String {
        self.cursor = 0;
        self.history_index = None;
        self.hide_suggestions();
        std::mem::take(&mut self.buffer)
    }

    /// Inserts a pasted block. Every newline finishes a line, which is
    /// returned for dispatch; text after the last newline stays in the editor.
    /// Pasted lines stay out of the history.
    pub fn paste(&mut self, text: &str) -> Vec<String> {
        let mut finished = Vec::new();
        let mut segments = text.split('\n').peekable();
        while let Some(segment) = segments.next() {
            self.insert_text(segment.strip_suffix('\r').unwrap_or(segment));
            if segments.peek().is_some() {
                finished.push(self.take_unrecorded());
            }
        }
        finished
    }

    pub fn history_prev(&mut self) {
        self.hide_suggestions();
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            None => self.history.len() - 1,
            Some(index) => index.saturating_sub(1),
        };
        self.history_index = Some(index);
        self.set_buffer(self.history[index].clone());
    }

    pub fn history_next(&mut self) {
        self.hide_suggestions();
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 >= self.history.len() {
            self.history_index = None;
            self.set_buffer(String::new());
        } else {
            self.history_index = Some(index + 1);
            self.set_buffer(self.history[index + 1].clone());
        }
    }

    /// Cycles through keyword completions. Returns false when there is nothing to complete.
    pub fn complete(&mut self) -> bool {
        if self.suggestions.is_empty() {
            return false;
        }
        let index = match self.suggestion_index {
            None => 0,
            Some(index) => (index + 1) % self.suggestions.len(),
        };
        self.suggestion_index = Some(index);
        self.buffer = self.suggestions[index].clone();
        self.cursor = self.char_len();
        true
    }

    pub fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestion_index = None;
    }

    fn set_buffer(&mut self, text: String) {
        self.buffer = text;
        self.cursor = self.char_len();
    }

    fn update_suggestions(&mut self) {
        self.suggestion_index = None;
        let prefix = self.buffer.trim_start().to_lowercase();
        if prefix.is_empty() || prefix.contains(char::is_whitespace) {
            self.suggestions.clear();
            return;
        }
        self.suggestions = KEYWORDS
            .iter()
            .filter(|keyword| keyword.starts_with(&prefix) && **keyword != prefix)
            .take(MAX_SUGGESTIONS)
            .map(|keyword| keyword.to_string())
            .collect();
    }
}
