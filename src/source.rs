use polars::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::domain::RosterError;
use crate::employee::{EmployeeId, EmployeeRecord};

pub type FetchResult = Result<Vec<EmployeeRecord>, RosterError>;

/// Anything that can hand out the full employee list in one call.
pub trait EmployeeSource: Send + Sync {
    fn fetch_employees(&self) -> FetchResult;

    /// Short label for the status line.
    fn name(&self) -> String;
}

#[derive(Debug, Default)]
pub struct StaticSource {
    employees: Vec<EmployeeRecord>,
}

impl StaticSource {
    pub fn new(employees: Vec<EmployeeRecord>) -> Self {
        Self { employees }
    }
}

impl EmployeeSource for StaticSource {
    fn fetch_employees(&self) -> FetchResult {
        Ok(self.employees.clone())
    }

    fn name(&self) -> String {
        "roster".to_string()
    }
}

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// Reads employees from a csv, parquet or arrow file. Column names follow
/// the employee service json keys (`firstName`, `contactNumber`, ...).
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn detect_file_type(path: &Path) -> Result<FileType, RosterError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(RosterError::UnknownFileType),
        }
    }

    fn check_file(path: &Path) -> Result<FileType, RosterError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RosterError::FileNotFound,
            ErrorKind::PermissionDenied => RosterError::PermissionDenied,
            _ => RosterError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(RosterError::FetchFailed("Not a file!".into()));
        }
        trace!("{} is {} bytes", path.display(), metadata.len());
        Self::detect_file_type(path)
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }

    fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}

impl EmployeeSource for FileSource {
    fn fetch_employees(&self) -> FetchResult {
        let start_time = Instant::now();
        let frame = match Self::check_file(&self.path)? {
            FileType::CSV => Self::load_csv(&self.path)?,
            FileType::PARQUET => Self::load_parquet(&self.path)?,
            FileType::ARROW => Self::load_arrow(&self.path)?,
        };
        let df = frame.collect()?;
        let employees = records_from_frame(&df)?;
        info!(
            "Loaded {} employees from {} in {}ms",
            employees.len(),
            self.path.display(),
            start_time.elapsed().as_millis()
        );
        Ok(employees)
    }

    fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string()
    }
}

// Every column is read as string; absent columns become all None.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PolarsError> {
    let Ok(column) = df.column(name) else {
        debug!("Column {name} missing, leaving it empty");
        return Ok(vec![None; df.height()]);
    };
    let column = column.cast(&DataType::String)?;
    let series = column.str()?;
    Ok(series
        .into_iter()
        .map(|value| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .collect())
}

fn parse_age(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u32)
    })
}

fn records_from_frame(df: &DataFrame) -> Result<Vec<EmployeeRecord>, PolarsError> {
    let mut ids = string_column(df, "id")?.into_iter();
    let mut first_names = string_column(df, "firstName")?.into_iter();
    let mut last_names = string_column(df, "lastName")?.into_iter();
    let mut dobs = string_column(df, "dob")?.into_iter();
    let mut ages = string_column(df, "age")?.into_iter();
    let mut salaries = string_column(df, "salary")?.into_iter();
    let mut contact_numbers = string_column(df, "contactNumber")?.into_iter();
    let mut emails = string_column(df, "email")?.into_iter();
    let mut addresses = string_column(df, "address")?.into_iter();
    let mut image_urls = string_column(df, "imageUrl")?.into_iter();

    let mut employees = Vec::with_capacity(df.height());
    for _ in 0..df.height() {
        employees.push(EmployeeRecord {
            id: ids
                .next()
                .flatten()
                .and_then(|s| s.parse::<u64>().ok())
                .map(EmployeeId),
            first_name: first_names.next().flatten(),
            last_name: last_names.next().flatten(),
            dob: dobs.next().flatten(),
            age: ages.next().flatten().as_deref().and_then(parse_age),
            salary: salaries.next().flatten(),
            contact_number: contact_numbers.next().flatten(),
            email: emails.next().flatten(),
            address: addresses.next().flatten(),
            image_url: image_urls.next().flatten(),
        });
    }
    Ok(employees)
}

/// A fetch running on the rayon pool. The ui loop polls it each tick.
pub struct FetchHandle {
    rx: Receiver<FetchResult>,
    started: Instant,
}

impl FetchHandle {
    pub fn try_take(&self) -> Option<FetchResult> {
        match self.rx.try_recv() {
            Ok(result) => {
                debug!(
                    "Fetch finished after {}ms",
                    self.started.elapsed().as_millis()
                );
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RosterError::FetchFailed(
                "fetch worker exited without a result".into(),
            ))),
        }
    }
}

pub fn spawn_fetch(source: Arc<dyn EmployeeSource>) -> FetchHandle {
    let (tx, rx) = mpsc::channel();
    trace!("Spawning fetch from {}", source.name());
    rayon::spawn(move || {
        // The receiver may be gone if the ui quit while loading.
        let _ = tx.send(source.fetch_employees());
    });
    FetchHandle {
        rx,
        started: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("roster-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_csv_with_missing_columns() {
        let path = temp_file(
            "employees.csv",
            "id,firstName,lastName,dob,age,salary,contactNumber,email,address\n\
             7,Bob,Stone,1990-01-01,30,50000,555-0100,bob@example.com,1 Main St\n\
             ,Ann,Lee,1985-02-03,,62000,555-0101,ann@example.com,\n",
        );
        let employees = FileSource::new(path.clone()).fetch_employees().unwrap();
        fs::remove_file(path).unwrap();

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].id, Some(EmployeeId(7)));
        assert_eq!(employees[0].first_name.as_deref(), Some("Bob"));
        assert_eq!(employees[0].age, Some(30));
        assert_eq!(employees[0].salary.as_deref(), Some("50000"));
        assert_eq!(employees[0].image_url, None);
        assert_eq!(employees[1].id, None);
        assert_eq!(employees[1].age, None);
        assert_eq!(employees[1].address, None);
    }

    #[test]
    fn reads_fixture_into_paged_roster() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/employees.csv");
        let source = FileSource::new(path);
        assert_eq!(source.name(), "employees.csv");

        let mut roster = crate::roster::RosterController::new(10);
        roster.initialize(&source);
        assert_eq!(roster.records().len(), 15);
        assert_eq!(roster.total_pages(), 2);
        roster.next_page();
        roster.next_page();
        assert_eq!(roster.page(), 2);
        assert_eq!(roster.current_page().len(), 5);
        assert_eq!(roster.records()[5].last_name.as_deref(), Some("Müller"));
    }

    #[test]
    fn fixture_sorts_by_salary_amount() {
        use crate::employee::SortColumn;

        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/employees.csv");
        let mut roster = crate::roster::RosterController::new(20);
        roster.initialize(&FileSource::new(path));
        let salaries = |roster: &crate::roster::RosterController| -> Vec<String> {
            roster
                .filtered()
                .iter()
                .map(|r| r.salary.clone().unwrap_or_default())
                .collect()
        };

        roster.sort_by(SortColumn::Salary);
        let ascending = salaries(&roster);
        assert_eq!(ascending.first().map(String::as_str), Some("36000"));
        assert_eq!(ascending.last().map(String::as_str), Some("120000"));

        roster.sort_by(SortColumn::Salary);
        let descending = salaries(&roster);
        assert_eq!(descending.first().map(String::as_str), Some("120000"));
        assert_eq!(descending[1], "99000");
    }

    #[test]
    fn missing_file_is_reported() {
        let source = FileSource::new(PathBuf::from("/definitely/not/here.csv"));
        assert!(matches!(
            source.fetch_employees(),
            Err(RosterError::FileNotFound)
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let path = temp_file("employees.txt", "id\n1\n");
        let result = FileSource::new(path.clone()).fetch_employees();
        fs::remove_file(path).unwrap();
        assert!(matches!(result, Err(RosterError::UnknownFileType)));
    }

    #[test]
    fn age_accepts_whole_floats_only() {
        assert_eq!(parse_age("30"), Some(30));
        assert_eq!(parse_age("30.0"), Some(30));
        assert_eq!(parse_age("30.5"), None);
        assert_eq!(parse_age("-2"), None);
    }

    #[test]
    fn spawned_fetch_delivers_result() {
        let source = StaticSource::new(vec![EmployeeRecord::default(); 3]);
        let handle = spawn_fetch(Arc::new(source));
        let mut result = None;
        for _ in 0..200 {
            result = handle.try_take();
            if result.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(result.unwrap().unwrap().len(), 3);
    }
}
