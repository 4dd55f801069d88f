// Multi-line text buffer with a cursor, used to edit a commit message.
//
// The buffer stores `char`s so that cursor motion and deletion never split a
// multi-byte character. Rendering lives in `ui`; this module has no
// terminal dependencies.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: Vec<char>,
    cursor: usize,
}

impl LineEditor {
    /// Creates an editor holding `initial` with the cursor at the end.
    pub fn new(initial: &str) -> Self {
        let buffer: Vec<char> = initial.chars().collect();
        let cursor = buffer.len();
        Self { buffer, cursor }
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Cursor position as a char offset into the buffer.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().split('\n').map(str::to_string).collect()
    }

    /// Zero-based (line, column) of the cursor, in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.buffer[..self.cursor];
        let line = before.iter().filter(|&&ch| ch == '\n').count();
        let col = self.cursor - self.line_start(self.cursor);
        (line, col)
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    /// Deletes the char before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    /// Deletes the char under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    /// Moves to the previous line, keeping the column when it fits.
    pub fn move_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let col = self.cursor - start;
        let prev_start = self.line_start(start - 1);
        let prev_len = (start - 1) - prev_start;
        self.cursor = prev_start + col.min(prev_len);
    }

    /// Moves to the next line, keeping the column when it fits.
    pub fn move_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.buffer.len() {
            return;
        }
        let col = self.cursor - self.line_start(self.cursor);
        let next_start = end + 1;
        let next_len = self.line_end(next_start) - next_start;
        self.cursor = next_start + col.min(next_len);
    }

    fn line_start(&self, pos: usize) -> usize {
        self.buffer[..pos]
            .iter()
            .rposition(|&ch| ch == '\n')
            .map_or(0, |idx| idx + 1)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.buffer[pos..]
            .iter()
            .position(|&ch| ch == '\n')
            .map_or(self.buffer.len(), |idx| pos + idx)
    }
}
