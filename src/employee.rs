use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmployeeId(pub u64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single roster entry. Everything except the id may be missing when the
/// record comes from an incomplete source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeRecord {
    pub id: Option<EmployeeId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub age: Option<u32>,
    pub salary: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

impl EmployeeRecord {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
    }

    pub fn value(&self, column: SortColumn) -> SortValue<'_> {
        match column {
            SortColumn::Index => SortValue::Number(None),
            SortColumn::FirstName => SortValue::Text(self.first_name.as_deref()),
            SortColumn::LastName => SortValue::Text(self.last_name.as_deref()),
            SortColumn::Dob => SortValue::Text(self.dob.as_deref()),
            SortColumn::Age => SortValue::Number(self.age.map(f64::from)),
            SortColumn::Salary => match self.salary.as_deref().map(str::parse::<f64>) {
                Some(Ok(amount)) if amount.is_finite() => SortValue::Number(Some(amount)),
                _ => SortValue::Text(self.salary.as_deref()),
            },
            SortColumn::ContactNumber => SortValue::Text(self.contact_number.as_deref()),
            SortColumn::Email => SortValue::Text(self.email.as_deref()),
            SortColumn::Address => SortValue::Text(self.address.as_deref()),
        }
    }

    /// Display string for a table cell. Salaries are shown as entered.
    pub fn cell(&self, column: SortColumn) -> String {
        match column {
            SortColumn::Index => "∅".to_string(),
            SortColumn::Age => self.age.map_or_else(|| "∅".to_string(), |n| n.to_string()),
            SortColumn::FirstName => or_missing(&self.first_name),
            SortColumn::LastName => or_missing(&self.last_name),
            SortColumn::Dob => or_missing(&self.dob),
            SortColumn::Salary => or_missing(&self.salary),
            SortColumn::ContactNumber => or_missing(&self.contact_number),
            SortColumn::Email => or_missing(&self.email),
            SortColumn::Address => or_missing(&self.address),
        }
    }
}

fn or_missing(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("∅").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Index,
    FirstName,
    LastName,
    Dob,
    Age,
    Salary,
    ContactNumber,
    Email,
    Address,
}

impl SortColumn {
    pub const ALL: [SortColumn; 9] = [
        SortColumn::Index,
        SortColumn::FirstName,
        SortColumn::LastName,
        SortColumn::Dob,
        SortColumn::Age,
        SortColumn::Salary,
        SortColumn::ContactNumber,
        SortColumn::Email,
        SortColumn::Address,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortColumn::Index => "#",
            SortColumn::FirstName => "First Name",
            SortColumn::LastName => "Last Name",
            SortColumn::Dob => "DOB",
            SortColumn::Age => "Age",
            SortColumn::Salary => "Salary",
            SortColumn::ContactNumber => "Contact",
            SortColumn::Email => "Email",
            SortColumn::Address => "Address",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
}

impl SortValue<'_> {
    /// Text compares case-insensitively first. Equal folds put the lowercase
    /// spelling first, so "bob" sorts before "Bob". Numbers order before
    /// text, and missing values order before present ones.
    pub fn compare(&self, other: &SortValue<'_>) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => match (a, b) {
                (Some(a), Some(b)) => locale_compare(a, b),
                (a, b) => a.is_some().cmp(&b.is_some()),
            },
            (SortValue::Number(a), SortValue::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(b),
                (a, b) => a.is_some().cmp(&b.is_some()),
            },
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        }
    }
}

fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}
