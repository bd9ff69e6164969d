use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace};
use tracing_error::SpanTrace;

use crate::domain::{FormMode, HELP_TEXT, Message, RosterConfig, RosterError};
use crate::employee::{EmployeeRecord, SortColumn, SortDirection};
use crate::filter::FilterCriteria;
use crate::form::{EmployeeForm, FormField};
use crate::inputter::{InputAction, Inputter};
use crate::roster::{LoadState, RosterController};
use crate::source::{EmployeeSource, FetchHandle, StaticSource, spawn_fetch};

pub const PAGE_SIZES: [usize; 5] = [5, 10, 20, 50, 100];

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    FORM,
    POPUP,
}

/// The popup form as the ui renders it.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub title: String,
    pub labels: Vec<&'static str>,
    pub values: Vec<String>,
    pub selected: usize,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct ColumnHeader {
    pub title: &'static str,
    pub sort: Option<SortDirection>,
    pub width: usize,
}

/// Snapshot of everything the ui needs for one frame.
pub struct UIData {
    pub name: String,
    pub header: Vec<ColumnHeader>,
    pub rows: Vec<Vec<String>>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub nrows: usize, // Records in the filtered view
    pub nrecords: usize,
    pub filter_summary: String,
    pub loading: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub form: Option<FormView>,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            header: Vec::new(),
            rows: Vec::new(),
            selected_row: 0,
            selected_column: 0,
            page: 1,
            total_pages: 0,
            page_size: 0,
            nrows: 0,
            nrecords: 0,
            filter_summary: String::new(),
            loading: false,
            show_popup: false,
            popup_message: String::new(),
            form: None,
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: RosterConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    roster: RosterController,
    fetch: Option<FetchHandle>,
    source_name: String,
    curser_row: usize,    // Row on the current page
    curser_column: usize, // Index into SortColumn::ALL
    form_mode: Option<FormMode>,
    form_values: Vec<String>,
    form_field: usize,
    draft: EmployeeForm, // Unsubmitted add form, kept between openings
    input: Inputter,
    clipboard: Option<Clipboard>,
    uidata: UIData,
    status_message: String,
    popup_message: String,
}

impl Model {
    pub fn init(config: &RosterConfig, source: Option<Arc<dyn EmployeeSource>>) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            roster: RosterController::new(config.page_size),
            fetch: None,
            source_name: String::from("roster"),
            curser_row: 0,
            curser_column: 1,
            form_mode: None,
            form_values: Vec::new(),
            form_field: 0,
            draft: EmployeeForm::default(),
            input: Inputter::default(),
            clipboard: None,
            uidata: UIData::empty(),
            status_message: String::from("Started roster!"),
            popup_message: String::new(),
        };
        match source {
            Some(source) => {
                model.source_name = source.name();
                model.roster.begin_load();
                model.fetch = Some(spawn_fetch(source));
                model.status = Status::LOADING;
                model.set_status_message(format!("Loading {} ...", model.source_name));
            }
            None => model.roster.initialize(&StaticSource::default()),
        }
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn roster(&self) -> &RosterController {
        &self.roster
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FORM
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        trace!("Status: {}", self.status_message);
    }

    #[instrument(skip(self), fields(source = %self.source_name))]
    fn poll_fetch(&mut self) {
        let Some(result) = self.fetch.as_ref().and_then(|handle| handle.try_take()) else {
            return;
        };
        self.fetch = None;
        self.roster.complete_load(result);
        self.status = Status::READY;
        let message = match self.roster.load_error() {
            Some(e) => {
                let span_trace = SpanTrace::capture();
                error!("Could not load employees: {e}\n{span_trace}");
                format!("Loading failed: {e}")
            }
            None => format!("Loaded {} employees", self.roster.records().len()),
        };
        self.set_status_message(message);
        self.curser_row = 0;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), RosterError> {
        if self.fetch.is_some() {
            self.poll_fetch();
        }

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_selection_up(),
                    Message::MoveDown => self.move_selection_down(),
                    Message::MoveLeft => self.move_selection_left(),
                    Message::MoveRight => self.move_selection_right(),
                    Message::NextPage => {
                        self.roster.next_page();
                        self.clamp_curser();
                    }
                    Message::PrevPage => {
                        self.roster.prev_page();
                        self.clamp_curser();
                    }
                    Message::GrowPageSize => self.change_page_size(true),
                    Message::ShrinkPageSize => self.change_page_size(false),
                    Message::SortColumn => self.sort_current_column(),
                    Message::AddEmployee | Message::EditEmployee | Message::DeleteEmployee
                        if self.status == Status::LOADING =>
                    {
                        self.set_status_message("Employees are still loading");
                    }
                    Message::AddEmployee => self.open_form(FormMode::Add),
                    Message::EditEmployee => self.edit_selected(),
                    Message::DeleteEmployee => self.delete_selected(),
                    Message::EditFilter => self.open_form(FormMode::Filter),
                    Message::ClearFilter => self.clear_filter(),
                    Message::CopyRow => self.copy_selected_row(),
                    Message::Help => self.show_popup(HELP_TEXT.to_string()),
                    _ => (),
                },
                Modus::FORM => {
                    if let Message::RawKey(key) = msg {
                        self.form_input(key)
                    }
                }
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.close_popup(),
                    _ => (),
                },
            }
        }

        self.update_uidata();
        Ok(())
    }

    // -------------------- Table handling functions ---------------------- //

    fn selected_view_index(&self) -> Option<usize> {
        let idx = self.roster.page_offset() + self.curser_row;
        (idx < self.roster.filtered_len()).then_some(idx)
    }

    fn selected_record(&self) -> Option<&EmployeeRecord> {
        self.selected_view_index()
            .and_then(|idx| self.roster.record_at(idx))
    }

    fn clamp_curser(&mut self) {
        let rows_on_page = self.roster.current_page().len();
        self.curser_row = self.curser_row.min(rows_on_page.saturating_sub(1));
    }

    fn move_selection_up(&mut self) {
        if self.curser_row > 0 {
            self.curser_row -= 1;
        } else if self.roster.page() > 1 {
            // Wrap onto the bottom of the previous page
            self.roster.prev_page();
            self.curser_row = self.roster.page_size() - 1;
        }
    }

    fn move_selection_down(&mut self) {
        let rows_on_page = self.roster.current_page().len();
        if self.curser_row + 1 < rows_on_page {
            self.curser_row += 1;
        } else if self.roster.page() < self.roster.total_pages() {
            self.roster.next_page();
            self.curser_row = 0;
        }
    }

    fn move_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
    }

    fn move_selection_right(&mut self) {
        if self.curser_column + 1 < SortColumn::ALL.len() {
            self.curser_column += 1;
        }
    }

    fn change_page_size(&mut self, grow: bool) {
        let current = self.roster.page_size();
        let next = if grow {
            PAGE_SIZES.iter().copied().find(|&s| s > current)
        } else {
            PAGE_SIZES.iter().rev().copied().find(|&s| s < current)
        };
        if let Some(size) = next {
            self.roster.set_page_size(size);
            self.curser_row = 0;
            self.set_status_message(format!("Showing {size} employees per page"));
        }
    }

    fn sort_current_column(&mut self) {
        self.roster.sort_by(SortColumn::ALL[self.curser_column]);
        if let Some((column, direction)) = self.roster.sort() {
            self.set_status_message(format!("Sorted by {} {:?}", column.title(), direction));
        }
    }

    fn clear_filter(&mut self) {
        if self.roster.criteria().is_empty() {
            self.set_status_message("No filters active");
            return;
        }
        self.roster.apply_filter(FilterCriteria::default());
        self.curser_row = 0;
        self.set_status_message("Filters cleared");
    }

    fn edit_selected(&mut self) {
        match self.selected_record().and_then(|r| r.id) {
            Some(id) => self.open_form(FormMode::Edit(id)),
            None => self.set_status_message("No employee selected"),
        }
    }

    fn delete_selected(&mut self) {
        let Some(idx) = self.selected_view_index() else {
            self.set_status_message("No employee selected");
            return;
        };
        if let Some(removed) = self.roster.delete_record(idx) {
            info!("Deleted {:?} ({})", removed.id, removed.full_name());
            self.set_status_message(format!("Deleted {}", removed.full_name().trim()));
        }
        self.curser_row = 0;
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    pub fn row_as_csv(record: &EmployeeRecord) -> String {
        SortColumn::ALL[1..]
            .iter()
            .map(|&column| Model::wrap_cell_content(&record.cell(column)))
            .collect::<Vec<String>>()
            .join(",")
    }

    fn copy_selected_row(&mut self) {
        let Some(row_content) = self.selected_record().map(Model::row_as_csv) else {
            return;
        };
        if self.clipboard.is_none() {
            self.clipboard = Clipboard::new()
                .map_err(|e| debug!("Clipboard unavailable: {e:?}"))
                .ok();
        }
        let message = match self.clipboard.as_mut().map(|c| c.set_text(row_content)) {
            Some(Ok(_)) => "Copied row to clipboard.",
            Some(Err(e)) => {
                trace!("Error copying to clipboard: {:?}", e);
                "Could not copy row"
            }
            None => "No clipboard available",
        };
        self.set_status_message(message);
    }

    // -------------------- Popup handling functions ---------------------- //

    fn show_popup(&mut self, message: String) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = message;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    // -------------------- Form handling functions ---------------------- //

    fn open_form(&mut self, mode: FormMode) {
        self.form_values = match mode {
            FormMode::Add => Model::values_from_employee(&self.draft),
            FormMode::Edit(id) => match self.roster.get(id) {
                Some(record) => Model::values_from_employee(&EmployeeForm::from_record(record)),
                None => return,
            },
            FormMode::Filter => self.roster.criteria().patterns().to_vec(),
        };
        trace!("Opening {mode:?} form");
        self.form_mode = Some(mode);
        self.form_field = 0;
        self.input.set(&self.form_values[0]);
        self.previous_modus = self.modus;
        self.modus = Modus::FORM;
    }

    fn values_from_employee(form: &EmployeeForm) -> Vec<String> {
        FormField::ALL
            .iter()
            .map(|&field| form.get(field).to_string())
            .collect()
    }

    fn employee_from_values(values: &[String]) -> EmployeeForm {
        let mut form = EmployeeForm::default();
        for (&field, value) in FormField::ALL.iter().zip(values) {
            form.set(field, value.clone());
        }
        form
    }

    fn form_labels(&self) -> Vec<&'static str> {
        match self.form_mode {
            Some(FormMode::Filter) => FilterCriteria::LABELS.to_vec(),
            _ => FormField::ALL.iter().map(|f| f.label()).collect(),
        }
    }

    fn form_input(&mut self, key: KeyEvent) {
        let action = self.input.read(key);
        self.form_values[self.form_field] = self.input.get().to_string();
        match action {
            InputAction::Edited => {}
            InputAction::NextField => self.select_form_field(self.form_field + 1),
            InputAction::PrevField => {
                let count = self.form_values.len();
                self.select_form_field(self.form_field + count - 1)
            }
            InputAction::Submit => self.submit_form(),
            InputAction::Cancel => self.close_form(),
        }
    }

    fn select_form_field(&mut self, field: usize) {
        self.form_field = field % self.form_values.len();
        self.input.set(&self.form_values[self.form_field]);
    }

    fn close_form(&mut self) {
        if self.form_mode == Some(FormMode::Add) {
            self.draft = Model::employee_from_values(&self.form_values);
        }
        self.form_mode = None;
        self.input.clear();
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::FORM;
    }

    fn submit_form(&mut self) {
        let Some(mode) = self.form_mode else {
            return;
        };
        let result = match mode {
            FormMode::Add => {
                self.draft = Model::employee_from_values(&self.form_values);
                self.roster
                    .submit_form(&mut self.draft)
                    .map(|id| format!("Employee {id} successfully added!"))
            }
            FormMode::Edit(id) => {
                let mut form = Model::employee_from_values(&self.form_values);
                self.roster
                    .update_record(id, &mut form)
                    .map(|_| format!("Employee {id} successfully updated!"))
            }
            FormMode::Filter => {
                let criteria = FilterCriteria::from_patterns(&self.form_values);
                self.roster.apply_filter(criteria);
                Ok(format!("{} employees match", self.roster.filtered_len()))
            }
        };

        match result {
            Ok(message) => {
                info!("{message}");
                self.form_mode = None;
                self.input.clear();
                self.modus = Modus::TABLE;
                self.previous_modus = Modus::FORM;
                self.curser_row = 0;
                self.set_status_message(message);
            }
            Err(e) => {
                // Stay in the form so the input can be corrected.
                debug!("Form rejected: {e}");
                self.show_popup(format!("Operation Failed\n\n{e}"));
            }
        }
    }

    // -------------------- UI data ---------------------- //

    fn column_width(&self, column: SortColumn, rows: &[Vec<String>], col_idx: usize) -> usize {
        let title_width = column.title().chars().count() + 2; // Room for the sort marker
        let data_width = rows
            .iter()
            .map(|row| row[col_idx].chars().count())
            .max()
            .unwrap_or(0);
        title_width.max(data_width).min(self.config.max_column_width)
    }

    fn update_uidata(&mut self) {
        let offset = self.roster.page_offset();
        let rows: Vec<Vec<String>> = self
            .roster
            .current_page()
            .iter()
            .enumerate()
            .map(|(i, record)| {
                SortColumn::ALL
                    .iter()
                    .map(|&column| match column {
                        SortColumn::Index => (offset + i + 1).to_string(),
                        _ => record.cell(column),
                    })
                    .collect()
            })
            .collect();

        let header = SortColumn::ALL
            .iter()
            .enumerate()
            .map(|(idx, &column)| ColumnHeader {
                title: column.title(),
                sort: self.roster.sort_indicator(column),
                width: self.column_width(column, &rows, idx),
            })
            .collect();

        let form = self.form_mode.map(|mode| FormView {
            title: match mode {
                FormMode::Add => " Add employee ".to_string(),
                FormMode::Edit(id) => format!(" Edit employee {id} "),
                FormMode::Filter => " Filter ".to_string(),
            },
            labels: self.form_labels(),
            values: self.form_values.clone(),
            selected: self.form_field,
            cursor: self.input.cursor(),
        });

        self.uidata = UIData {
            name: self.source_name.clone(),
            header,
            rows,
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            page: self.roster.page(),
            total_pages: self.roster.total_pages(),
            page_size: self.roster.page_size(),
            nrows: self.roster.filtered_len(),
            nrecords: self.roster.records().len(),
            filter_summary: self.roster.criteria().describe(),
            loading: matches!(self.roster.load_state(), LoadState::Loading),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.popup_message.clone(),
            form,
            status_message: self.status_message.clone(),
        };
    }
}
