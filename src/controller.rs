use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode};
use tracing::trace;

use crate::domain::{AppConfig, DqvError, Message};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DqvError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            // While the search prompt is open every key goes to the inputter.
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Tab => Some(Message::SwitchFocus),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Left => Some(Message::PrevPage),
            KeyCode::Right => Some(Message::NextPage),
            KeyCode::Up => Some(Message::MoveUp),
            KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Char('s') => Some(Message::CyclePageSize),
            KeyCode::Char('y') => Some(Message::CopyRow),
            KeyCode::Char('[') => Some(Message::PrevDataset),
            KeyCode::Char(']') => Some(Message::NextDataset),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                Some(Message::SelectDataset(c as usize - '1' as usize))
            }
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
