use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::parse::Table;

// Custom error type used across the whole application.
#[derive(Debug)]
pub enum DqvError {
    IoError(Error),
    CsvError(csv::Error),
    CatalogError(String),
    UnknownDataset(String),
    LoadingFailed(String),
}

impl From<Error> for DqvError {
    fn from(err: Error) -> Self {
        DqvError::IoError(err)
    }
}

impl From<csv::Error> for DqvError {
    fn from(err: csv::Error) -> Self {
        DqvError::CsvError(err)
    }
}

impl From<serde_json::Error> for DqvError {
    fn from(err: serde_json::Error) -> Self {
        DqvError::CatalogError(err.to_string())
    }
}

impl DqvError {
    // Short message shown in the error popup.
    pub fn user_message(&self) -> String {
        match self {
            DqvError::IoError(e) => format!("File access failed: {e}"),
            DqvError::CsvError(e) => format!("Reading data failed: {e}"),
            DqvError::CatalogError(m) => format!("Bad catalog: {m}"),
            DqvError::UnknownDataset(k) => format!("No dataset named \"{k}\""),
            DqvError::LoadingFailed(m) => m.clone(),
        }
    }
}

// The two independently paginated/searchable table views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Raw,
    Cleaned,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Raw => "Raw",
            View::Cleaned => "Cleaned",
        }
    }

    pub fn other(&self) -> View {
        match self {
            View::Raw => View::Cleaned,
            View::Cleaned => View::Raw,
        }
    }
}

#[derive(Debug)]
pub enum Message {
    Quit,
    Help,
    Exit,
    SwitchFocus,
    SelectDataset(usize),
    NextDataset,
    PrevDataset,
    Search,
    NextPage,
    PrevPage,
    CyclePageSize,
    MoveUp,
    MoveDown,
    CopyRow,
    RawKey(KeyEvent),
    Loaded(Box<LoadOutcome>),
    LoadFailed { generation: u64, message: String },
}

// Result of one background load, tagged with the generation that started it.
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub dataset: usize,
    pub raw: Table,
    pub cleaned: Table,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct AppConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            event_poll_time: 100,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// The page sizes the UI cycles through. Anything else is rejected by the
// view state machine.
pub const PAGE_SIZES: [usize; 3] = [50, 100, 200];
pub const DEFAULT_PAGE_SIZE: usize = 50;

pub const NULL_MARKER: &str = "NULL";

pub const HELP_TEXT: &str = "\
dqv key bindings

  q          quit
  ?          this help
  Esc        close popup / cancel input
  Tab        switch focus raw <-> cleaned
  /          search in the focused view
  Left/Right previous / next page
  Up/Down    move row cursor
  s          cycle page size (50, 100, 200)
  y          copy selected row to the clipboard
  1..9       select dataset
  [ / ]      previous / next dataset
";
