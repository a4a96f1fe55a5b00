/// Materialized query results
///
/// The client's row set is drained once, when the result is built. After
/// that every operation works on the in-memory rows:
/// - single-row fetches advance a forward-only read cursor
/// - `fetch_all_*` methods return the rows the cursor has not passed yet and
///   move it to the end, so a second bulk fetch returns nothing
/// - `row_count()` and `column_count()` never depend on the cursor
use crate::error::{DriverError, Result};
use crate::models::ConnectionMode;
use crate::utils::{value_key, CollectedRows};
use libsql::Value;
use std::collections::HashMap;

/// A row as `(column name, value)` pairs in column order
pub type AssociativeRow = Vec<(String, Value)>;

#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    position: usize,
    rows_affected: u64,
    mode: ConnectionMode,
    freed: bool,
}

impl QueryResult {
    /// Result of a statement that produced rows
    pub(crate) fn from_rows(collected: CollectedRows, mode: ConnectionMode) -> Self {
        QueryResult {
            columns: collected.columns,
            rows: collected.rows,
            position: 0,
            rows_affected: 0,
            mode,
            freed: false,
        }
    }

    /// Result of a write: no rows, only an affected-row count
    pub(crate) fn from_affected(rows_affected: u64, mode: ConnectionMode) -> Self {
        QueryResult {
            columns: Vec::new(),
            rows: Vec::new(),
            position: 0,
            rows_affected,
            mode,
            freed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>, mode: ConnectionMode) -> Self {
        Self::from_rows(CollectedRows { columns, rows }, mode)
    }

    /// Mode of the connection that produced this result
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<&Vec<Value>> {
        let row = self.rows.get(self.position)?;
        self.position += 1;
        Some(row)
    }

    /// Move the cursor to the end, returning where it was
    fn skip_remaining(&mut self) -> usize {
        let start = self.position.min(self.rows.len());
        self.position = self.rows.len();
        start
    }

    fn associate(columns: &[String], row: &[Value]) -> AssociativeRow {
        columns.iter().cloned().zip(row.iter().cloned()).collect()
    }

    /// Next row as values in column order, `None` once exhausted.
    pub fn fetch_numeric(&mut self) -> Option<Vec<Value>> {
        self.next_row().cloned()
    }

    /// Next row keyed by column name, `None` once exhausted.
    pub fn fetch_associative(&mut self) -> Option<AssociativeRow> {
        let row = self.next_row()?.clone();
        Some(Self::associate(&self.columns, &row))
    }

    /// First column of the next row, `None` once exhausted.
    pub fn fetch_one(&mut self) -> Option<Value> {
        self.next_row().and_then(|row| row.first().cloned())
    }

    pub fn fetch_all_numeric(&mut self) -> Vec<Vec<Value>> {
        let start = self.skip_remaining();
        self.rows[start..].to_vec()
    }

    pub fn fetch_all_associative(&mut self) -> Vec<AssociativeRow> {
        let start = self.skip_remaining();
        self.rows[start..]
            .iter()
            .map(|row| Self::associate(&self.columns, row))
            .collect()
    }

    /// Map the first column to the second across the remaining rows.
    ///
    /// Fails with `NoKeyValue` when the result has fewer than two columns.
    /// Keys use the textual form of the value; later duplicates win.
    pub fn fetch_all_key_value(&mut self) -> Result<HashMap<String, Value>> {
        let column_count = self.column_count();
        if column_count < 2 {
            return Err(DriverError::NoKeyValue { column_count });
        }

        let start = self.skip_remaining();
        Ok(self.rows[start..]
            .iter()
            .filter_map(|row| match (row.first(), row.get(1)) {
                (Some(key), Some(value)) => Some((value_key(key), value.clone())),
                _ => None,
            })
            .collect())
    }

    /// Key the remaining rows by their first column.
    ///
    /// Each value holds the other columns in associative form.
    pub fn fetch_all_associative_indexed(&mut self) -> HashMap<String, AssociativeRow> {
        let mut indexed = HashMap::new();
        for mut row in self.fetch_all_associative() {
            if row.is_empty() {
                continue;
            }
            let (_, key) = row.remove(0);
            indexed.insert(value_key(&key), row);
        }
        indexed
    }

    /// First column of every remaining row.
    pub fn fetch_first_column(&mut self) -> Vec<Value> {
        let start = self.skip_remaining();
        self.rows[start..]
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect()
    }

    /// Rows in the result, or rows affected for a write.
    ///
    /// Independent of how many rows have been fetched.
    pub fn row_count(&self) -> u64 {
        if self.columns.is_empty() && self.rows.is_empty() {
            self.rows_affected
        } else {
            self.rows.len() as u64
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Release the rows; later fetches behave as if exhausted.
    pub fn free(&mut self) {
        self.rows = Vec::new();
        self.position = 0;
        self.rows_affected = 0;
        self.freed = true;
    }

    #[cfg(test)]
    pub(crate) fn is_freed(&self) -> bool {
        self.freed
    }
}
