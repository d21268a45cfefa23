use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Minimal line editor for the search prompt.
#[derive(Default)]
pub struct Inputter {
    buffer: String,
    cursor: usize, // in chars
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug)]
pub struct InputSnapshot {
    pub input: String,
    pub cursor: usize,
    pub finished: bool,
    pub canceled: bool,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputSnapshot {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.finished = true,
            (KeyCode::Esc, KeyModifiers::NONE) => {
                self.buffer.clear();
                self.cursor = 0;
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Left, KeyModifiers::NONE) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, KeyModifiers::NONE) => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
            }
            (code, _) => {
                if let Some(chr) = code.as_char() {
                    self.buffer.insert(self.byte_pos(), chr);
                    self.cursor += 1;
                }
            }
        }
        self.snapshot()
    }

    /// Start an input round, seeded with an existing term so the active
    /// search can be edited in place.
    pub fn start(&mut self, seed: &str) {
        self.buffer = seed.to_string();
        self.cursor = self.char_len();
        self.finished = false;
        self.canceled = false;
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            input: self.buffer.clone(),
            cursor: self.cursor,
            finished: self.finished,
            canceled: self.canceled,
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let pos = self.byte_pos();
            self.buffer.remove(pos);
        }
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_pos(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len())
    }
}
