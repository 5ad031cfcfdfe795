//! Input field handling for the terminal user interface.

/// A single-line text input with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits cleanly.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text, cursor at the end.
    #[cfg(test)]
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the cursor.
    pub fn handle_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Text with the cursor drawn as a block, for rendering.
    pub fn display(&self) -> String {
        let at = self.byte_index(self.cursor);
        format!("{}█{}", &self.value[..at], &self.value[at..])
    }

    /// Take the trimmed value, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_around_multibyte_chars() {
        let mut field = InputField::with_value("café");
        field.handle_char('!');
        assert_eq!(field.value, "café!");
        field.move_cursor_left();
        field.move_cursor_left();
        field.handle_backspace();
        assert_eq!(field.value, "caé!");
        field.handle_delete();
        assert_eq!(field.value, "ca!");
        assert_eq!(field.display(), "ca█!");
    }

    #[test]
    fn take_trims_and_resets() {
        let mut field = InputField::with_value("  Review  ");
        assert_eq!(field.take(), "Review");
        assert!(field.value.is_empty());
        assert_eq!(field.cursor, 0);
    }
}
