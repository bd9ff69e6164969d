use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::employee::EmployeeId;
use crate::form::FormValidationError;

pub const HELP_TEXT: &str = "\
q           quit
arrows      move row / column cursor
s           sort by selected column (again to reverse)
n / p       next / previous page
+ / -       grow / shrink page size
a           add employee
e           edit selected employee
d           delete selected employee
f           edit filters
c           clear filters
y           copy selected row as csv
?           this help
Esc         close popup

Form: Tab/Down next field, BackTab/Up previous field,
      Enter submit, Esc cancel";

#[derive(Debug)]
pub enum RosterError {
    IoError(Error),
    PolarsError(PolarsError),
    FetchFailed(String),
    InvalidPath(String),
    Validation(FormValidationError),
    UnknownEmployee(EmployeeId),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::IoError(e) => write!(f, "io error: {e}"),
            RosterError::PolarsError(e) => write!(f, "could not read data: {e}"),
            RosterError::FetchFailed(reason) => write!(f, "fetching employees failed: {reason}"),
            RosterError::InvalidPath(reason) => write!(f, "invalid path: {reason}"),
            RosterError::Validation(e) => write!(f, "{e}"),
            RosterError::UnknownEmployee(id) => write!(f, "no employee with id {id}"),
            RosterError::FileNotFound => write!(f, "file not found"),
            RosterError::PermissionDenied => write!(f, "permission denied"),
            RosterError::UnknownFileType => write!(f, "unknown file type"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<Error> for RosterError {
    fn from(err: Error) -> Self {
        RosterError::IoError(err)
    }
}

impl From<PolarsError> for RosterError {
    fn from(err: PolarsError) -> Self {
        RosterError::PolarsError(err)
    }
}

impl From<FormValidationError> for RosterError {
    fn from(err: FormValidationError) -> Self {
        RosterError::Validation(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct RosterConfig {
    pub page_size: usize,
    pub event_poll_time: u64,
    pub max_column_width: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            event_poll_time: 100,
            max_column_width: 24,
        }
    }
}

/// Which set of fields the form popup is editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Add,
    Edit(EmployeeId),
    Filter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    GrowPageSize,
    ShrinkPageSize,
    SortColumn,
    AddEmployee,
    EditEmployee,
    DeleteEmployee,
    EditFilter,
    ClearFilter,
    CopyRow,
    Help,
    Exit,
    RawKey(KeyEvent),
}
