use std::collections::BTreeSet;
use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::config::{Settings, SCORE_MAX};
use crate::db::RecordStore;
use crate::errors::StoreError;
use crate::models::{Entry, Item, ITEM_COUNT};

use super::forms::{BeckForm, ConfirmEntryDelete, FormField};
use super::helpers::{centered_rect, surface_error};
use super::screens::{table_cells, table_header, EntryTable, Page};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows jumped by PageUp / PageDown in the data view.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the current page.
enum Mode {
    Normal,
    ConfirmDelete(ConfirmEntryDelete),
}

/// Result of a successful insert from the form.
#[derive(Debug)]
pub(crate) struct Committed {
    pub(crate) id: i64,
    /// Set when the row was written but re-reading the table failed.
    pub(crate) refresh_error: Option<String>,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the store, the live form, and the table that
/// mirrors the store's contents.
pub struct App {
    store: RecordStore,
    form: BeckForm,
    table: EntryTable,
    page: Page,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: RecordStore, entries: Vec<Entry>, settings: &Settings) -> Self {
        Self {
            store,
            form: BeckForm::new(),
            table: EntryTable::new(entries),
            page: Page::from_index(settings.last_page),
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Preferences worth persisting for the next launch.
    pub fn settings(&self) -> Settings {
        Settings {
            last_page: self.page.index(),
        }
    }

    /// Close the database. The store would also close on drop; doing it here
    /// keeps the shutdown visible in the log before the log writer goes away.
    pub fn shutdown(&mut self) {
        self.store.close();
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    /// Ctrl+S: commit from anywhere on the input page.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        if self.page == Page::Input && matches!(self.mode, Mode::Normal) {
            self.submit_form();
        }
        Ok(())
    }

    /// Ctrl+R: discard the current form values.
    pub(crate) fn handle_ctrl_r(&mut self) -> Result<()> {
        if self.page == Page::Input && matches!(self.mode, Mode::Normal) {
            self.form.reset();
            self.set_status("Form reset.", StatusKind::Info);
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Tab => {
                self.switch_page(self.page.toggle());
                return Ok(Mode::Normal);
            }
            KeyCode::F(1) => {
                self.switch_page(Page::Input);
                return Ok(Mode::Normal);
            }
            KeyCode::F(2) => {
                self.switch_page(Page::Data);
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.page {
            Page::Input => self.handle_input_key(code, exit),
            Page::Data => self.handle_data_key(code, exit),
        }
    }

    fn handle_input_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Up | KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::Down => self.form.focus_next(),
            KeyCode::Home => self.form.focus(FormField::Date),
            KeyCode::End => self.form.focus(FormField::Score(Item::Sleep)),
            KeyCode::Left => {
                if let FormField::Score(item) = self.form.active {
                    self.form.step(item, -1);
                }
            }
            KeyCode::Right => {
                if let FormField::Score(item) = self.form.active {
                    self.form.step(item, 1);
                }
            }
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char('q') | KeyCode::Char('Q') if !self.form.editing_text() => *exit = true,
            KeyCode::Char(ch) => {
                if self.form.push_char(ch) {
                    self.form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_data_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => *exit = true,
            KeyCode::Esc => {
                if self.table.marked.is_empty() {
                    self.clear_status();
                } else {
                    self.table.clear_marks();
                    self.set_status("Selection cleared.", StatusKind::Info);
                }
            }
            KeyCode::Up => self.table.move_selection(-1),
            KeyCode::Down => self.table.move_selection(1),
            KeyCode::PageUp => self.table.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.table.move_selection(PAGE_STEP),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            KeyCode::Char(' ') => {
                if let Some(marked) = self.table.toggle_mark() {
                    let count = self.table.marked.len();
                    let verb = if marked { "Marked" } else { "Unmarked" };
                    self.set_status(format!("{verb} entry ({count} selected)."), StatusKind::Info);
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('-') | KeyCode::Delete => {
                let ids = self.table.selected_ids();
                if ids.is_empty() {
                    self.set_status("No entries selected.", StatusKind::Info);
                } else {
                    return Ok(Mode::ConfirmDelete(self.confirm_for(ids)));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmEntryDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.delete_selected() {
                    Ok(removed) => {
                        info!(removed, "entries deleted");
                        let noun = if removed == 1 { "entry" } else { "entries" };
                        self.set_status(format!("Deleted {removed} {noun}."), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let detail = format!("{err:#}");
                        warn!(error = %detail, "delete failed");
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Commit the form: snapshot, insert, and only after a confirmed insert
    /// reset the form and refresh the table. Only the insert decides success;
    /// a failed refresh is reported on the returned value.
    pub(crate) fn commit(&mut self) -> Result<Committed> {
        let values = self.form.snapshot();
        let id = self
            .store
            .insert_entry(&values)
            .context("failed to save entry")?;
        self.form.reset();

        let refresh_error = self.reload_entries(Some(id)).err().map(|err| {
            let detail = format!("{err:#}");
            warn!(id, error = %detail, "entry saved but table refresh failed");
            surface_error(&err)
        });
        Ok(Committed { id, refresh_error })
    }

    /// Delete whatever the table currently considers selected. An empty
    /// selection does nothing. The confirm dialog blocks table input, so the
    /// selection here is the one the dialog was opened for.
    pub(crate) fn delete_selected(&mut self) -> Result<usize> {
        let ids = self.table.selected_ids();
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self
            .store
            .delete_entries(&ids)
            .context("failed to delete entries")?;
        self.table.clear_marks();
        self.reload_entries(None)?;
        Ok(removed)
    }

    /// Re-query the store into the table, optionally moving the cursor to `focus_id`.
    fn reload_entries(&mut self, focus_id: Option<i64>) -> Result<()> {
        let entries = self
            .store
            .query_all_entries()
            .context("failed to load entries")?;
        self.table.set_entries(entries);
        if let Some(id) = focus_id {
            self.table.focus_id(id);
        }
        Ok(())
    }

    /// Run the commit workflow and report the outcome in the UI and the log.
    fn submit_form(&mut self) {
        let summary = self.form.summary;
        match self.commit() {
            Ok(Committed {
                id,
                refresh_error: None,
            }) => {
                info!(id, summary, "entry committed");
                self.set_status(
                    format!("Entry #{id} saved (summary {summary})."),
                    StatusKind::Info,
                );
            }
            Ok(Committed {
                id,
                refresh_error: Some(reason),
            }) => {
                info!(id, summary, "entry committed");
                self.set_status(
                    format!("Entry #{id} saved, but the table could not be refreshed: {reason}"),
                    StatusKind::Error,
                );
            }
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(error = %detail, "commit failed");
                let message = match err.downcast_ref::<StoreError>() {
                    Some(StoreError::ValueCount { .. }) => {
                        "Entry not saved: date must be YYYY-MM-DD and time HH:MM:SS.".to_string()
                    }
                    _ => format!("Entry not saved: {}", surface_error(&err)),
                };
                self.form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn confirm_for(&self, ids: BTreeSet<i64>) -> ConfirmEntryDelete {
        let first_label = ids
            .iter()
            .next()
            .and_then(|id| self.table.entries.iter().find(|e| e.id == *id))
            .map(|entry| format!("#{} ({})", entry.id, entry.timestamp()))
            .unwrap_or_default();
        ConfirmEntryDelete { ids, first_label }
    }

    fn switch_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.clear_status();
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.page {
            Page::Input => self.draw_input_page(frame, chunks[1]),
            Page::Data => self.draw_data_page(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        if let Mode::ConfirmDelete(confirm) = &self.mode {
            self.draw_confirm_delete(frame, area, confirm);
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new([Page::Input.title(), Page::Data.title()])
            .select(self.page.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(tabs, area);
    }

    fn draw_input_page(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Beck Inventory (0-{SCORE_MAX} per item)"));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::with_capacity(FormField::COUNT + 4);
        lines.push(self.form.build_line(FormField::Date));
        lines.push(self.form.build_line(FormField::Time));
        lines.push(Line::from(""));
        for item in Item::ALL {
            lines.push(self.form.build_line(FormField::Score(item)));
        }
        lines.push(Line::from(""));
        lines.push(self.form.summary_line());
        if let Some(error) = &self.form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let cursor_row = match self.form.active {
            FormField::Date => Some((0u16, &self.form.date)),
            FormField::Time => Some((1u16, &self.form.time)),
            FormField::Score(_) => None,
        };
        if let Some((row, text)) = cursor_row {
            // pointer (2) + padded label (14)
            let x = inner.x + 16 + text.chars().count() as u16;
            let y = inner.y + row;
            if x < inner.right() && y < inner.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }

    fn draw_data_page(&self, frame: &mut Frame, area: Rect) {
        let title = if self.table.marked.is_empty() {
            format!("Entries ({})", self.table.len())
        } else {
            format!(
                "Entries ({}, {} selected)",
                self.table.len(),
                self.table.marked.len()
            )
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.table.is_empty() {
            let message = Paragraph::new("No entries yet. Commit one from the Input View.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(table_header().into_iter().map(Cell::from)).style(header_style);

        let rows = self.table.entries.iter().map(|entry| {
            let marked = self.table.is_marked(entry.id);
            let row = Row::new(table_cells(entry, marked).into_iter().map(Cell::from));
            if marked {
                row.style(Style::default().fg(Color::Magenta))
            } else {
                row
            }
        });

        let mut widths = vec![
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(8),
        ];
        widths.extend(std::iter::repeat(Constraint::Length(3)).take(ITEM_COUNT));
        widths.push(Constraint::Length(3));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_selected(Some(self.table.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.mode, self.page) {
            (Mode::ConfirmDelete(_), _) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[n/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Page::Input) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Field   "),
                Span::styled("[←→/0-3]", key_style),
                Span::raw(" Score   "),
                Span::styled("[Enter/^S]", key_style),
                Span::raw(" Commit   "),
                Span::styled("[^R]", key_style),
                Span::raw(" Reset   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Data View   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Quit"),
            ]),
            (_, Page::Data) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Move   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Select   "),
                Span::styled("[d]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Input View   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmEntryDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Entries").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let question = if confirm.ids.len() == 1 {
            format!("Delete entry {} permanently?", confirm.first_label)
        } else {
            format!(
                "Delete {} entries starting with {} permanently?",
                confirm.ids.len(),
                confirm.first_label
            )
        };

        let lines = vec![
            Line::from(question),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
