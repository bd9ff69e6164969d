use crate::employee::EmployeeRecord;

/// Per column substring patterns. An empty pattern matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub name: String,
    pub age: String,
    pub dob: String,
    pub salary: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
}

impl FilterCriteria {
    pub const LABELS: [&'static str; 7] = [
        "Name",
        "Age",
        "Date of birth",
        "Salary",
        "Contact number",
        "Email",
        "Address",
    ];

    /// Patterns in `LABELS` order.
    pub fn patterns(&self) -> [String; 7] {
        [
            self.name.clone(),
            self.age.clone(),
            self.dob.clone(),
            self.salary.clone(),
            self.contact_number.clone(),
            self.email.clone(),
            self.address.clone(),
        ]
    }

    pub fn from_patterns(patterns: &[String]) -> Self {
        let at = |idx: usize| patterns.get(idx).cloned().unwrap_or_default();
        Self {
            name: at(0),
            age: at(1),
            dob: at(2),
            salary: at(3),
            contact_number: at(4),
            email: at(5),
            address: at(6),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, employee: &EmployeeRecord) -> bool {
        contains_ignore_case(Some(&employee.full_name()), &self.name)
            && contains(employee.age.map(|a| a.to_string()).as_ref(), &self.age)
            && contains_ignore_case(employee.dob.as_ref(), &self.dob)
            && contains(employee.salary.as_ref(), &self.salary)
            && contains(employee.contact_number.as_ref(), &self.contact_number)
            && contains_ignore_case(employee.email.as_ref(), &self.email)
            && contains_ignore_case(employee.address.as_ref(), &self.address)
    }

    /// Short human readable summary of the active patterns, e.g. `name~bo age~3`.
    pub fn describe(&self) -> String {
        [
            ("name", &self.name),
            ("age", &self.age),
            ("dob", &self.dob),
            ("salary", &self.salary),
            ("contact", &self.contact_number),
            ("email", &self.email),
            ("address", &self.address),
        ]
        .iter()
        .filter(|(_, pattern)| !pattern.is_empty())
        .map(|(key, pattern)| format!("{key}~{pattern}"))
        .collect::<Vec<String>>()
        .join(" ")
    }
}

// A missing value can only satisfy an empty pattern.
fn contains(value: Option<&String>, pattern: &str) -> bool {
    match value {
        Some(v) => v.contains(pattern),
        None => pattern.is_empty(),
    }
}

fn contains_ignore_case(value: Option<&String>, pattern: &str) -> bool {
    match value {
        Some(v) => v.to_lowercase().contains(&pattern.to_lowercase()),
        None => pattern.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> EmployeeRecord {
        EmployeeRecord {
            first_name: Some("Bob".into()),
            last_name: Some("Stone".into()),
            age: Some(30),
            email: Some("Bob@Example.com".into()),
            contact_number: Some("555-0100".into()),
            ..Default::default()
        }
    }

    #[test]
    fn default_matches_everything() {
        assert!(FilterCriteria::default().matches(&bob()));
        assert!(FilterCriteria::default().matches(&EmployeeRecord::default()));
        assert!(FilterCriteria::default().is_empty());
    }

    #[test]
    fn name_spans_first_and_last_name() {
        let criteria = FilterCriteria {
            name: "b st".into(),
            ..Default::default()
        };
        assert!(criteria.matches(&bob()));
    }

    #[test]
    fn text_fields_ignore_case() {
        let criteria = FilterCriteria {
            email: "EXAMPLE".into(),
            ..Default::default()
        };
        assert!(criteria.matches(&bob()));
    }

    #[test]
    fn numeric_fields_match_on_string_form() {
        let hit = FilterCriteria {
            age: "3".into(),
            contact_number: "01".into(),
            ..Default::default()
        };
        let miss = FilterCriteria {
            age: "4".into(),
            ..Default::default()
        };
        assert!(hit.matches(&bob()));
        assert!(!miss.matches(&bob()));
    }

    #[test]
    fn missing_value_fails_non_empty_pattern() {
        let criteria = FilterCriteria {
            address: "main".into(),
            ..Default::default()
        };
        assert!(!criteria.matches(&bob()));
    }

    #[test]
    fn patterns_keep_label_order() {
        let criteria = FilterCriteria {
            age: "3".into(),
            address: "main".into(),
            ..Default::default()
        };
        let patterns = criteria.patterns();
        assert_eq!(patterns[1], "3");
        assert_eq!(patterns[6], "main");
        assert_eq!(FilterCriteria::from_patterns(&patterns), criteria);
        assert_eq!(FilterCriteria::from_patterns(&[]), FilterCriteria::default());
    }

    #[test]
    fn describe_lists_active_patterns() {
        let criteria = FilterCriteria {
            name: "bo".into(),
            email: "ex".into(),
            ..Default::default()
        };
        assert_eq!(criteria.describe(), "name~bo email~ex");
    }
}
