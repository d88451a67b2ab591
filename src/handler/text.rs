//! Text edit buffer used while a widget is in text editing.
//!
//! Cursor and selection are byte offsets into the buffer and always sit on
//! char boundaries. The length limit counts characters.

// ---------------------------------------------------------------------------
// Undo stack
// ---------------------------------------------------------------------------

/// Bounded undo/redo history of buffer snapshots.
#[derive(Debug, Clone)]
struct TextUndo {
    states: Vec<(String, usize)>,
    /// Index of the current state.
    pos: usize,
    limit: usize,
}

impl TextUndo {
    fn new(text: &str, cursor: usize, limit: usize) -> Self {
        Self { states: vec![(text.to_owned(), cursor)], pos: 0, limit: limit.max(1) }
    }

    fn push(&mut self, text: &str, cursor: usize) {
        if self.states.get(self.pos).is_some_and(|(t, _)| t == text) {
            return;
        }
        self.states.truncate(self.pos + 1);
        self.states.push((text.to_owned(), cursor));
        if self.states.len() > self.limit {
            self.states.remove(0);
        }
        self.pos = self.states.len() - 1;
    }

    fn undo(&mut self) -> Option<&(String, usize)> {
        if self.pos == 0 {
            return None;
        }
        self.pos -= 1;
        self.states.get(self.pos)
    }

    fn redo(&mut self) -> Option<&(String, usize)> {
        if self.pos + 1 >= self.states.len() {
            return None;
        }
        self.pos += 1;
        self.states.get(self.pos)
    }
}

// ---------------------------------------------------------------------------
// TextEdit
// ---------------------------------------------------------------------------

/// Character class used for word-wise movement.
#[derive(PartialEq, Eq, Clone, Copy)]
enum CharClass {
    Space,
    Punct,
    Word,
}

fn class_of(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Space
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// An editable string with cursor, selection and undo.
#[derive(Debug, Clone)]
pub struct TextEdit {
    buf: String,
    cursor: usize,
    /// Selection anchor; the selection spans anchor..cursor when they differ.
    anchor: usize,
    /// Maximum length in characters; 0 means unlimited.
    max_len: usize,
    undo: TextUndo,
}

impl TextEdit {
    /// Start editing `text` with everything selected.
    pub fn new(text: impl Into<String>, max_len: usize, undo_steps: usize) -> Self {
        let buf: String = text.into();
        let end = buf.len();
        Self { undo: TextUndo::new(&buf, end, undo_steps), buf, cursor: end, anchor: 0, max_len }
    }

    pub fn text(&self) -> &str {
        &self.buf
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Ordered selection bounds, if anything is selected.
    pub fn selection(&self) -> Option<(usize, usize)> {
        (self.anchor != self.cursor)
            .then(|| (self.anchor.min(self.cursor), self.anchor.max(self.cursor)))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection().map(|(a, b)| &self.buf[a..b])
    }

    pub fn select_all(&mut self) {
        self.anchor = 0;
        self.cursor = self.buf.len();
    }

    pub fn clear_selection(&mut self) {
        self.anchor = self.cursor;
    }

    /// Replace the whole buffer, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buf = self.truncated(text).to_owned();
        self.cursor = self.buf.len();
        self.anchor = self.cursor;
        self.snapshot();
    }

    // ── Insertion and deletion ───────────────────────────────────────

    /// Insert `s` over the selection. Returns whether anything changed.
    pub fn insert(&mut self, s: &str) -> bool {
        let had_selection = self.delete_selection();
        let room = if self.max_len == 0 {
            usize::MAX
        } else {
            self.max_len.saturating_sub(self.buf.chars().count())
        };
        let s: String = s.chars().take(room).collect();
        if s.is_empty() {
            if had_selection {
                self.snapshot();
            }
            return had_selection;
        }
        self.buf.insert_str(self.cursor, &s);
        self.cursor += s.len();
        self.anchor = self.cursor;
        self.snapshot();
        true
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        let mut tmp = [0u8; 4];
        self.insert(c.encode_utf8(&mut tmp))
    }

    /// Backspace; `word` deletes to the previous word start.
    pub fn delete_prev(&mut self, word: bool) -> bool {
        if self.delete_selection() {
            self.snapshot();
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let start = if word { self.word_start(self.cursor) } else { self.prev_boundary(self.cursor) };
        self.buf.drain(start..self.cursor);
        self.cursor = start;
        self.anchor = start;
        self.snapshot();
        true
    }

    /// Delete forward; `word` deletes to the next word end.
    pub fn delete_next(&mut self, word: bool) -> bool {
        if self.delete_selection() {
            self.snapshot();
            return true;
        }
        if self.cursor >= self.buf.len() {
            return false;
        }
        let end = if word { self.word_end(self.cursor) } else { self.next_boundary(self.cursor) };
        self.buf.drain(self.cursor..end);
        self.snapshot();
        true
    }

    /// Remove and return the selection.
    pub fn cut(&mut self) -> Option<String> {
        let text = self.selected_text()?.to_owned();
        self.delete_selection();
        self.snapshot();
        Some(text)
    }

    // ── Movement ─────────────────────────────────────────────────────

    pub fn move_left(&mut self, word: bool, select: bool) {
        if !select {
            if let Some((a, _)) = self.selection() {
                self.cursor = a;
                self.anchor = a;
                return;
            }
        }
        self.cursor = if word { self.word_start(self.cursor) } else { self.prev_boundary(self.cursor) };
        if !select {
            self.anchor = self.cursor;
        }
    }

    pub fn move_right(&mut self, word: bool, select: bool) {
        if !select {
            if let Some((_, b)) = self.selection() {
                self.cursor = b;
                self.anchor = b;
                return;
            }
        }
        self.cursor = if word { self.word_end(self.cursor) } else { self.next_boundary(self.cursor) };
        if !select {
            self.anchor = self.cursor;
        }
    }

    pub fn home(&mut self, select: bool) {
        self.cursor = 0;
        if !select {
            self.anchor = 0;
        }
    }

    pub fn end(&mut self, select: bool) {
        self.cursor = self.buf.len();
        if !select {
            self.anchor = self.cursor;
        }
    }

    /// Put the cursor at the character nearest to `x` pixels from the text
    /// start, given a fixed glyph advance.
    pub fn set_cursor_from_x(&mut self, x: f32, char_width: f32, select: bool) {
        let col = if char_width > 0.0 { (x / char_width).round().max(0.0) as usize } else { 0 };
        self.cursor = self.buf.char_indices().nth(col).map_or(self.buf.len(), |(i, _)| i);
        if !select {
            self.anchor = self.cursor;
        }
    }

    // ── Undo ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        match self.undo.undo() {
            Some((text, cursor)) => {
                self.buf = text.clone();
                self.cursor = *cursor;
                self.anchor = *cursor;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some((text, cursor)) => {
                self.buf = text.clone();
                self.cursor = *cursor;
                self.anchor = *cursor;
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn snapshot(&mut self) {
        self.undo.push(&self.buf, self.cursor);
    }

    fn delete_selection(&mut self) -> bool {
        let Some((a, b)) = self.selection() else {
            return false;
        };
        self.buf.drain(a..b);
        self.cursor = a;
        self.anchor = a;
        true
    }

    fn truncated<'s>(&self, s: &'s str) -> &'s str {
        if self.max_len == 0 {
            return s;
        }
        s.char_indices().nth(self.max_len).map_or(s, |(i, _)| &s[..i])
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        self.buf[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self, pos: usize) -> usize {
        self.buf[pos..].chars().next().map_or(self.buf.len(), |c| pos + c.len_utf8())
    }

    /// Skip spaces backwards, then the run of one character class.
    fn word_start(&self, pos: usize) -> usize {
        let mut iter = self.buf[..pos].char_indices().rev().peekable();
        while iter.next_if(|(_, c)| class_of(*c) == CharClass::Space).is_some() {}
        let Some(&(_, first)) = iter.peek() else {
            return 0;
        };
        let class = class_of(first);
        let mut start = pos;
        while let Some((i, _)) = iter.next_if(|(_, c)| class_of(*c) == class) {
            start = i;
        }
        start
    }

    /// Skip the run of one character class forwards, then spaces.
    fn word_end(&self, pos: usize) -> usize {
        let mut iter = self.buf[pos..].char_indices().peekable();
        if let Some(&(_, first)) = iter.peek() {
            let class = class_of(first);
            if class != CharClass::Space {
                while iter.next_if(|(_, c)| class_of(*c) == class).is_some() {}
            }
        }
        while iter.next_if(|(_, c)| class_of(*c) == CharClass::Space).is_some() {}
        iter.peek().map_or(self.buf.len(), |(i, _)| pos + i)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
