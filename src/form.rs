use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::employee::EmployeeRecord;

// Local part, then dot separated domain labels and an alphabetic tld.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_%+'\-]+(\.[A-Za-z0-9_%+'\-]+)*@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern is valid")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Dob,
    Age,
    Salary,
    ContactNumber,
    Email,
    Address,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Dob,
        FormField::Age,
        FormField::Salary,
        FormField::ContactNumber,
        FormField::Email,
        FormField::Address,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::Dob => "Date of birth",
            FormField::Age => "Age",
            FormField::Salary => "Salary",
            FormField::ContactNumber => "Contact number",
            FormField::Email => "Email",
            FormField::Address => "Address",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormValidationError {
    pub fields: Vec<FormField>,
}

impl fmt::Display for FormValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.iter().map(|field| field.label()).collect();
        write!(f, "invalid fields: {}", names.join(", "))
    }
}

impl std::error::Error for FormValidationError {}

/// Raw, unvalidated form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub age: String,
    pub salary: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
}

/// The trimmed values of a form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEmployee {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub age: u32,
    pub salary: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
}

impl EmployeeForm {
    pub fn from_record(record: &EmployeeRecord) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            first_name: text(&record.first_name),
            last_name: text(&record.last_name),
            dob: text(&record.dob),
            age: record.age.map(|a| a.to_string()).unwrap_or_default(),
            salary: text(&record.salary),
            contact_number: text(&record.contact_number),
            email: text(&record.email),
            address: text(&record.address),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Dob => &self.dob,
            FormField::Age => &self.age,
            FormField::Salary => &self.salary,
            FormField::ContactNumber => &self.contact_number,
            FormField::Email => &self.email,
            FormField::Address => &self.address,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Dob => &mut self.dob,
            FormField::Age => &mut self.age,
            FormField::Salary => &mut self.salary,
            FormField::ContactNumber => &mut self.contact_number,
            FormField::Email => &mut self.email,
            FormField::Address => &mut self.address,
        };
        *slot = value.into();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checks every field and reports all failing ones at once.
    pub fn validate(&self) -> Result<ValidEmployee, FormValidationError> {
        let mut invalid = Vec::new();
        let mut required = |field: FormField| {
            let value = self.get(field).trim();
            if value.is_empty() {
                invalid.push(field);
            }
            value.to_string()
        };

        let first_name = required(FormField::FirstName);
        let last_name = required(FormField::LastName);
        let dob = required(FormField::Dob);
        let salary = required(FormField::Salary);
        let contact_number = required(FormField::ContactNumber);
        let address = required(FormField::Address);

        // u32 rejects negative ages and fractions.
        let age = self.age.trim().parse::<u32>().ok();
        if age.is_none() {
            invalid.push(FormField::Age);
        }

        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            invalid.push(FormField::Email);
        }

        match age {
            Some(age) if invalid.is_empty() => Ok(ValidEmployee {
                first_name,
                last_name,
                dob,
                age,
                salary,
                contact_number,
                email,
                address,
            }),
            _ => {
                invalid.sort_by_key(|f| FormField::ALL.iter().position(|a| a == f));
                Err(FormValidationError { fields: invalid })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> EmployeeForm {
        EmployeeForm {
            first_name: " Bob ".into(),
            last_name: "Builder".into(),
            dob: "1990-01-01".into(),
            age: "34".into(),
            salary: "50000".into(),
            contact_number: "555-0100".into(),
            email: "bob@example.com".into(),
            address: "1 Main St".into(),
        }
    }

    #[test]
    fn valid_form_is_trimmed() {
        let valid = filled().validate().unwrap();
        assert_eq!(valid.first_name, "Bob");
        assert_eq!(valid.age, 34);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let err = EmployeeForm::default().validate().unwrap_err();
        assert_eq!(err.fields, FormField::ALL.to_vec());
    }

    #[test]
    fn negative_or_non_numeric_age_is_rejected() {
        for age in ["-1", "abc", "3.5"] {
            let mut form = filled();
            form.age = age.into();
            assert_eq!(form.validate().unwrap_err().fields, vec![FormField::Age]);
        }
        let mut form = filled();
        form.age = "0".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(".lead@example.com"));
        assert!(!is_valid_email("double..dot@example.com"));
        assert!(!is_valid_email("user@-host.com"));
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut form = filled();
        form.address = "   ".into();
        assert_eq!(form.validate().unwrap_err().fields, vec![FormField::Address]);
    }

    #[test]
    fn round_trips_through_record() {
        let record = EmployeeRecord {
            first_name: Some("Ann".into()),
            age: Some(41),
            ..Default::default()
        };
        let form = EmployeeForm::from_record(&record);
        assert_eq!(form.get(FormField::FirstName), "Ann");
        assert_eq!(form.get(FormField::Age), "41");
        assert_eq!(form.get(FormField::Email), "");
    }
}
