use std::collections::HashSet;
use tracing::{debug, error, info, trace};

use crate::domain::RosterError;
use crate::employee::{EmployeeId, EmployeeRecord, SortColumn, SortDirection};
use crate::filter::FilterCriteria;
use crate::form::EmployeeForm;
use crate::source::{EmployeeSource, FetchResult};

#[derive(Debug)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(RosterError),
}

/// Owns the record store and the derived filtered, sorted and paginated view.
#[derive(Debug)]
pub struct RosterController {
    records: Vec<EmployeeRecord>,
    rows: Vec<usize>, // Store positions of the records in the view, in view order
    criteria: FilterCriteria,
    sort: Option<(SortColumn, SortDirection)>,
    page_size: usize,
    page: usize,
    next_id: u64,
    load_state: LoadState,
}

impl RosterController {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            rows: Vec::new(),
            criteria: FilterCriteria::default(),
            sort: None,
            page_size: page_size.max(1),
            page: 1,
            next_id: 1,
            load_state: LoadState::Idle,
        }
    }

    /// Blocking variant of `begin_load` + `complete_load`.
    pub fn initialize(&mut self, source: &dyn EmployeeSource) {
        self.begin_load();
        let result = source.fetch_employees();
        self.complete_load(result);
    }

    pub fn begin_load(&mut self) {
        self.load_state = LoadState::Loading;
    }

    pub fn complete_load(&mut self, result: FetchResult) {
        match result {
            Ok(employees) => {
                info!("Roster received {} employees", employees.len());
                // Records added while the fetch ran stay, after the loaded ones.
                let pending = std::mem::replace(&mut self.records, employees);
                if !pending.is_empty() {
                    debug!("Keeping {} employees added during the load", pending.len());
                }
                self.records.extend(pending);
                self.assign_ids();
                self.load_state = LoadState::Ready;
            }
            Err(e) => {
                error!("Fetching employees failed: {e}");
                self.records.clear();
                self.load_state = LoadState::Failed(e);
            }
        }
        self.apply_filter(self.criteria.clone());
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn load_error(&self) -> Option<&RosterError> {
        match &self.load_state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    fn assign_ids(&mut self) {
        self.next_id = self
            .records
            .iter()
            .filter_map(|r| r.id)
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(self.next_id);

        let mut seen = HashSet::with_capacity(self.records.len());
        for record in self.records.iter_mut() {
            match record.id {
                Some(id) if seen.insert(id) => {}
                _ => {
                    let id = EmployeeId(self.next_id);
                    self.next_id += 1;
                    seen.insert(id);
                    trace!("Assigned {id} to {}", record.full_name());
                    record.id = Some(id);
                }
            }
        }
    }

    fn fresh_id(&mut self) -> EmployeeId {
        let id = EmployeeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn position_of(&self, id: EmployeeId) -> Option<usize> {
        self.records.iter().position(|r| r.id == Some(id))
    }

    /// Validates the form and appends a new employee. The form is emptied on
    /// success and left untouched on failure.
    pub fn submit_form(&mut self, form: &mut EmployeeForm) -> Result<EmployeeId, RosterError> {
        let valid = form.validate()?;
        let id = self.fresh_id();
        self.records.push(EmployeeRecord {
            id: Some(id),
            first_name: Some(valid.first_name),
            last_name: Some(valid.last_name),
            dob: Some(valid.dob),
            age: Some(valid.age),
            salary: Some(valid.salary),
            contact_number: Some(valid.contact_number),
            email: Some(valid.email),
            address: Some(valid.address),
            image_url: None,
        });
        form.reset();
        debug!("Added employee {id}, store has {} records", self.records.len());
        self.apply_filter(self.criteria.clone());
        Ok(id)
    }

    /// Replaces the fields of an existing employee, keeping id and image.
    pub fn update_record(
        &mut self,
        id: EmployeeId,
        form: &mut EmployeeForm,
    ) -> Result<(), RosterError> {
        let pos = self
            .position_of(id)
            .ok_or(RosterError::UnknownEmployee(id))?;
        let valid = form.validate()?;
        let record = &mut self.records[pos];
        record.first_name = Some(valid.first_name);
        record.last_name = Some(valid.last_name);
        record.dob = Some(valid.dob);
        record.age = Some(valid.age);
        record.salary = Some(valid.salary);
        record.contact_number = Some(valid.contact_number);
        record.email = Some(valid.email);
        record.address = Some(valid.address);
        form.reset();
        debug!("Updated employee {id}");
        self.apply_filter(self.criteria.clone());
        Ok(())
    }

    /// Removes the record at a position of the filtered view. Out of range
    /// positions leave the store untouched.
    pub fn delete_record(&mut self, view_index: usize) -> Option<EmployeeRecord> {
        let id = self.record_at(view_index)?.id?;
        self.delete_by_id(id)
    }

    pub fn delete_by_id(&mut self, id: EmployeeId) -> Option<EmployeeRecord> {
        let pos = self.position_of(id)?;
        let removed = self.records.remove(pos);
        debug!("Deleted employee {id}, store has {} records", self.records.len());
        self.apply_filter(self.criteria.clone());
        Some(removed)
    }

    /// Sorts the view by `column`, reversing the direction when the column
    /// is already the active one.
    pub fn sort_by(&mut self, column: SortColumn) {
        let direction = match self.sort {
            Some((active, direction)) if active == column => direction.reversed(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some((column, direction));
        trace!("Sorting by {column:?} {direction:?}");
        self.resort();
    }

    /// Re-applies the active sort without touching its direction.
    pub fn resort(&mut self) {
        let Some((column, direction)) = self.sort else {
            return;
        };
        let records = &self.records;
        self.rows.sort_by(|&a, &b| {
            let ordering = match column {
                SortColumn::Index => a.cmp(&b),
                _ => records[a].value(column).compare(&records[b].value(column)),
            };
            direction.apply(ordering)
        });
    }

    pub fn sort(&self) -> Option<(SortColumn, SortDirection)> {
        self.sort
    }

    pub fn sort_indicator(&self, column: SortColumn) -> Option<SortDirection> {
        match self.sort {
            Some((active, direction)) if active == column => Some(direction),
            _ => None,
        }
    }

    /// Rebuilds the view from the store, keeps the active sort and jumps
    /// back to the first page.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.rows = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.criteria.matches(record))
            .map(|(idx, _)| idx)
            .collect();
        self.resort();
        self.page = 1;
        self.clamp_page();
        trace!(
            "Filter [{}] keeps {}/{} records",
            self.criteria.describe(),
            self.rows.len(),
            self.records.len()
        );
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn paginate(&self, page_size: usize, page_index: usize) -> Vec<&EmployeeRecord> {
        if page_size == 0 || page_index == 0 {
            return Vec::new();
        }
        let start = (page_index - 1).saturating_mul(page_size);
        self.rows
            .iter()
            .skip(start)
            .take(page_size)
            .map(|&idx| &self.records[idx])
            .collect()
    }

    pub fn current_page(&self) -> Vec<&EmployeeRecord> {
        self.paginate(self.page_size, self.page)
    }

    pub fn total_pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size)
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
        self.clamp_page();
    }

    // An empty view still sits on page 1.
    fn clamp_page(&mut self) {
        self.page = self.page.min(self.total_pages()).max(1);
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// View index of the first record on the current page.
    pub fn page_offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn record_at(&self, view_index: usize) -> Option<&EmployeeRecord> {
        self.rows.get(view_index).map(|&idx| &self.records[idx])
    }

    pub fn get(&self, id: EmployeeId) -> Option<&EmployeeRecord> {
        self.position_of(id).map(|pos| &self.records[pos])
    }

    pub fn filtered(&self) -> Vec<&EmployeeRecord> {
        self.rows.iter().map(|&idx| &self.records[idx]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }
}
