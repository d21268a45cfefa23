use std::fs;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Instant;

use arboard::Clipboard;
use tracing::{debug, error, info, trace};

use crate::catalog::{Catalog, DatasetEntry};
use crate::domain::{AppConfig, DqvError, HELP_TEXT, LoadOutcome, Message, View};
use crate::inputter::{InputSnapshot, Inputter};
use crate::parse::{Table, parse_csv};
use crate::stats::{DataStats, compute_stats};
use crate::view::{CellValue, ViewState};

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

/// Everything the UI needs to draw one table pane.
#[derive(Debug, Default, Clone)]
pub struct PaneData {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub page_line: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub page_size: usize,
    pub matches: usize,
    pub term: String,
    pub cursor: usize,
    pub focused: bool,
}

/// Plain-data snapshot handed to the rendering side. The UI never touches
/// the model beyond this.
#[derive(Debug, Default, Clone)]
pub struct UIData {
    pub dataset_titles: Vec<String>,
    pub selected_dataset: usize,
    pub description: String,
    pub stats: Option<DataStats>,
    pub raw: PaneData,
    pub cleaned: PaneData,
    pub status_message: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub input_active: bool,
    pub input: InputSnapshot,
    pub input_view: Option<View>,
    pub loading: bool,
}

pub struct Model {
    catalog: Catalog,
    selected: usize,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    raw_table: Table,
    cleaned_table: Table,
    stats: Option<DataStats>,
    raw_view: ViewState,
    cleaned_view: ViewState,
    focus: View,
    generation: u64,
    loader_tx: Sender<Message>,
    loader_rx: Receiver<Message>,
    input: Inputter,
    last_input: InputSnapshot,
    active_input: bool,
    input_view: Option<View>,
    uidata: UIData,
    popup_message: String,
    status_message: String,
}

impl Model {
    pub fn init(config: &AppConfig, catalog: Catalog) -> Self {
        let (loader_tx, loader_rx) = channel();
        let mut model = Self {
            catalog,
            selected: 0,
            status: Status::EMPTY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            raw_table: Table::default(),
            cleaned_table: Table::default(),
            stats: None,
            raw_view: ViewState::new(config.page_size),
            cleaned_view: ViewState::new(config.page_size),
            focus: View::Raw,
            generation: 0,
            loader_tx,
            loader_rx,
            input: Inputter::default(),
            last_input: InputSnapshot::default(),
            active_input: false,
            input_view: None,
            uidata: UIData::default(),
            popup_message: String::new(),
            status_message: "Started dqv!".to_string(),
        };
        model.update_uidata();
        model
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_input
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    // ----------------------- Dataset loading ------------------------- //

    /// Kick off an asynchronous load of the given catalog entry. Each load
    /// carries a generation tag; results from an older generation are
    /// discarded when they arrive.
    pub fn select_dataset(&mut self, index: usize) {
        if index >= self.catalog.datasets.len() {
            trace!("Ignoring selection of unknown dataset index {index}");
            return;
        }
        self.selected = index;
        self.generation += 1;
        self.status = Status::LOADING;

        let entry = self.catalog.datasets[index].clone();
        let generation = self.generation;
        let tx = self.loader_tx.clone();
        self.set_status_message(format!("Loading {} ...", entry.name));
        info!("Loading dataset \"{}\" (generation {})", entry.key, generation);

        thread::spawn(move || {
            let start_time = Instant::now();
            let message = match load_pair(&entry) {
                Ok((raw, cleaned)) => {
                    debug!(
                        "Loaded \"{}\" in {}ms",
                        entry.key,
                        start_time.elapsed().as_millis()
                    );
                    Message::Loaded(Box::new(LoadOutcome {
                        generation,
                        dataset: index,
                        raw,
                        cleaned,
                    }))
                }
                Err(e) => Message::LoadFailed {
                    generation,
                    message: e.user_message(),
                },
            };
            // The receiver is gone when the app is shutting down.
            let _ = tx.send(message);
        });
        self.update_uidata();
    }

    pub fn select_dataset_by_key(&mut self, key: &str) -> Result<(), DqvError> {
        let index = self.catalog.index_of(key)?;
        self.select_dataset(index);
        Ok(())
    }

    /// Drain loader results that arrived since the last tick.
    pub fn poll_loader(&mut self) -> Result<(), DqvError> {
        let pending: Vec<Message> = self.loader_rx.try_iter().collect();
        for message in pending {
            self.update(message)?;
        }
        Ok(())
    }

    fn apply_load(&mut self, outcome: LoadOutcome) {
        if outcome.generation != self.generation {
            trace!(
                "Discarding stale load result (generation {} != {})",
                outcome.generation, self.generation
            );
            return;
        }
        let skipped = outcome.raw.skipped + outcome.cleaned.skipped;
        // Both tables, the stats and both view states are replaced in one
        // step; nothing was touched before this point.
        self.raw_table = outcome.raw;
        self.cleaned_table = outcome.cleaned;
        self.stats = Some(compute_stats(&self.raw_table, &self.cleaned_table));
        self.raw_view.reset(self.raw_table.rows.len());
        self.cleaned_view.reset(self.cleaned_table.rows.len());
        self.status = Status::READY;

        let entry = &self.catalog.datasets[outcome.dataset];
        let mut message = format!(
            "Loaded {}: {} raw / {} cleaned rows",
            entry.name,
            self.raw_table.rows.len(),
            self.cleaned_table.rows.len()
        );
        if skipped > 0 {
            message.push_str(&format!(" ({skipped} lines skipped)"));
        }
        self.set_status_message(message);
    }

    fn load_failed(&mut self, generation: u64, message: String) {
        if generation != self.generation {
            trace!("Discarding stale load failure (generation {generation})");
            return;
        }
        error!("Dataset load failed: {message}");
        // Previous tables stay in place; only the alert is raised.
        self.status = if self.stats.is_some() {
            Status::READY
        } else {
            Status::EMPTY
        };
        self.show_popup(format!("Loading failed!\n\n{message}"));
        self.set_status_message("Loading failed");
    }

    // --------------------------- Updates ----------------------------- //

    pub fn update(&mut self, message: Message) -> Result<(), DqvError> {
        trace!("Update: {:?} {:?}", self.modus, message);
        match message {
            Message::Loaded(outcome) => self.apply_load(*outcome),
            Message::LoadFailed {
                generation,
                message,
            } => self.load_failed(generation, message),
            other => match self.modus {
                Modus::TABLE => self.update_table(other),
                Modus::POPUP => match other {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.close_popup(),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = other {
                        self.raw_input(key);
                    }
                }
            },
        }
        self.update_uidata();
        Ok(())
    }

    fn update_table(&mut self, message: Message) {
        match message {
            Message::Quit => self.quit(),
            Message::Help => self.show_popup(HELP_TEXT.to_string()),
            Message::Exit => (),
            Message::SwitchFocus => self.focus = self.focus.other(),
            Message::SelectDataset(idx) => self.select_dataset(idx),
            Message::NextDataset => {
                let next = (self.selected + 1) % self.catalog.datasets.len();
                self.select_dataset(next);
            }
            Message::PrevDataset => {
                let n = self.catalog.datasets.len();
                self.select_dataset((self.selected + n - 1) % n);
            }
            Message::Search => self.enter_search(),
            Message::NextPage => self.next_page(self.focus),
            Message::PrevPage => self.prev_page(self.focus),
            Message::CyclePageSize => {
                self.view_mut(self.focus).cycle_page_size();
                let size = self.view(self.focus).page_size();
                self.set_status_message(format!("Page size {size}"));
            }
            Message::MoveUp => self.view_mut(self.focus).move_cursor_up(),
            Message::MoveDown => self.view_mut(self.focus).move_cursor_down(),
            Message::CopyRow => self.copy_selected_row(),
            _ => (),
        }
    }

    // Per-view operations, also the unit-test surface.

    pub fn search(&mut self, view: View, term: &str) {
        match view {
            View::Raw => self.raw_view.search(&self.raw_table.rows, term),
            View::Cleaned => self.cleaned_view.search(&self.cleaned_table.rows, term),
        }
        if term.is_empty() {
            self.set_status_message(format!("{}: search cleared", view.label()));
        } else {
            self.set_status_message(format!(
                "{}: {} matches for \"{}\"",
                view.label(),
                self.view(view).match_count(),
                term
            ));
        }
        self.update_uidata();
    }

    pub fn set_page_size(&mut self, view: View, size: usize) {
        self.view_mut(view).set_page_size(size);
        self.update_uidata();
    }

    pub fn next_page(&mut self, view: View) {
        self.view_mut(view).next_page();
        self.update_uidata();
    }

    pub fn prev_page(&mut self, view: View) {
        self.view_mut(view).prev_page();
        self.update_uidata();
    }

    fn view(&self, view: View) -> &ViewState {
        match view {
            View::Raw => &self.raw_view,
            View::Cleaned => &self.cleaned_view,
        }
    }

    fn view_mut(&mut self, view: View) -> &mut ViewState {
        match view {
            View::Raw => &mut self.raw_view,
            View::Cleaned => &mut self.cleaned_view,
        }
    }

    fn table(&self, view: View) -> &Table {
        match view {
            View::Raw => &self.raw_table,
            View::Cleaned => &self.cleaned_table,
        }
    }

    // ------------------------- Search input -------------------------- //

    fn enter_search(&mut self) {
        trace!("Entering search input for {:?}", self.focus);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.active_input = true;
        self.input_view = Some(self.focus);
        let seed = self.view(self.focus).term().to_string();
        self.input.start(&seed);
        self.last_input = self.input.snapshot();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        if !self.active_input {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.active_input = false;
            self.modus = self.previous_modus;
            self.previous_modus = Modus::CMDINPUT;
            let view = self.input_view.take().unwrap_or(self.focus);
            if !self.last_input.canceled {
                let term = self.last_input.input.clone();
                self.search(view, &term);
            }
        }
    }

    // --------------------------- Popups ------------------------------ //

    fn show_popup(&mut self, message: String) {
        // An open search prompt is abandoned; the alert takes over.
        self.active_input = false;
        self.input_view = None;
        self.previous_modus = match self.modus {
            Modus::TABLE => Modus::TABLE,
            Modus::POPUP => self.previous_modus,
            Modus::CMDINPUT => Modus::TABLE,
        };
        self.modus = Modus::POPUP;
        self.popup_message = message;
    }

    fn close_popup(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    // -------------------------- Clipboard ----------------------------- //

    fn copy_selected_row(&mut self) {
        let line = {
            let table = self.table(self.focus);
            let view = self.view(self.focus);
            view.selected_row().map(|row_idx| {
                let row = &table.rows[row_idx];
                table
                    .columns
                    .iter()
                    .map(|col| match row.get(col) {
                        Some(Some(value)) => wrap_cell_content(value),
                        _ => String::new(),
                    })
                    .collect::<Vec<String>>()
                    .join(",")
            })
        };
        let Some(line) = line else {
            self.set_status_message("Nothing to copy");
            return;
        };
        // The clipboard is opened on demand so headless runs never need a
        // display server.
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(line)) {
            Ok(_) => self.set_status_message("Copied row to clipboard"),
            Err(e) => {
                trace!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Clipboard unavailable");
            }
        }
    }

    // --------------------------- UI data ------------------------------ //

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn pane_data(&self, view: View) -> PaneData {
        let table = self.table(view);
        let state = self.view(view);
        PaneData {
            title: format!("{} · {} rows", view.label(), table.rows.len()),
            columns: table.columns.clone(),
            rows: state.page_cells(&table.rows, &table.columns),
            page_line: state.page_info(),
            prev_enabled: state.has_prev(),
            next_enabled: state.has_next(),
            page_size: state.page_size(),
            matches: state.match_count(),
            term: state.term().to_string(),
            cursor: state.cursor(),
            focused: self.focus == view,
        }
    }

    fn update_uidata(&mut self) {
        let entry = &self.catalog.datasets[self.selected];
        self.uidata = UIData {
            dataset_titles: self
                .catalog
                .datasets
                .iter()
                .map(|d| d.tab_title())
                .collect(),
            selected_dataset: self.selected,
            description: entry.description.clone(),
            stats: self.stats.clone(),
            raw: self.pane_data(View::Raw),
            cleaned: self.pane_data(View::Cleaned),
            status_message: self.status_message.clone(),
            show_popup: matches!(self.modus, Modus::POPUP),
            popup_message: self.popup_message.clone(),
            input_active: self.active_input,
            input: self.last_input.clone(),
            input_view: self.input_view,
            loading: self.status == Status::LOADING,
        };
    }
}

/// Read and parse both files of a dataset pair. Nothing is committed to the
/// model until both succeed.
pub fn load_pair(entry: &DatasetEntry) -> Result<(Table, Table), DqvError> {
    let raw = load_table(&entry.raw_path)?;
    let cleaned = load_table(&entry.cleaned_path)?;
    Ok((raw, cleaned))
}

fn load_table(path: &Path) -> Result<Table, DqvError> {
    let text = fs::read_to_string(path).map_err(|e| {
        DqvError::LoadingFailed(format!("Could not read {}: {e}", path.display()))
    })?;
    parse_csv(&text)
}

// Quote a field the way a CSV consumer expects it when pasting elsewhere.
fn wrap_cell_content(content: &str) -> String {
    let needs_escaping = content.contains('"');
    let needs_wrapping = content.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(content);

    if needs_escaping {
        out = out.replace("\"", "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}
