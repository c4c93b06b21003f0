//! Ordering and filtering of connection records.

use serde::{Deserialize, Serialize};

use super::record::{ConnectionRecord, Field};

// ============================================================================
// FilterSpec
// ============================================================================

/// A case-insensitive substring match against one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Column the query is matched against.
    #[serde(default)]
    pub field: Field,
    /// Substring to look for. Empty matches everything.
    #[serde(default)]
    pub query: String,
}

impl FilterSpec {
    /// Create a filter from a column index (0..=6) and a query.
    pub fn new(field_index: usize, query: impl Into<String>) -> Option<Self> {
        Field::from_index(field_index).map(|field| Self::on(field, query))
    }

    /// Create a filter on the given column.
    pub fn on(field: Field, query: impl Into<String>) -> Self {
        Self {
            field,
            query: query.into(),
        }
    }

    /// Check if the filter has a query.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Check if a record matches this filter.
    pub fn matches(&self, record: &ConnectionRecord) -> bool {
        if self.query.is_empty() {
            return true;
        }
        record
            .field(self.field)
            .to_lowercase()
            .contains(&self.query.to_lowercase())
    }

    /// Set the query text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Reset the query, keeping the selected column.
    pub fn clear(&mut self) {
        self.query.clear();
    }
}

// ============================================================================
// Ordering / filtering
// ============================================================================

/// Move unowned sockets after owned ones, keeping scan order inside each group.
pub fn order_records(mut records: Vec<ConnectionRecord>) -> Vec<ConnectionRecord> {
    // `sort_by_key` is stable
    records.sort_by_key(|record| !record.is_owned());
    records
}

/// Apply a filter to a list of records.
pub fn filter_records(records: &[ConnectionRecord], filter: &FilterSpec) -> Vec<ConnectionRecord> {
    if !filter.is_active() {
        return records.to_vec();
    }
    let query = filter.query.to_lowercase();
    records
        .iter()
        .filter(|record| record.field(filter.field).to_lowercase().contains(&query))
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
