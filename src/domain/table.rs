// ============================================================
// Layer 3 — Table Domain Type
// ============================================================
// A row-oriented table of optional string cells.
//
//   columns: ["id", "f0", "class"]
//   rows:    [[Some("0"), Some("5.1"), Some("setosa")],
//             [Some("1"), None,        Some("virginica")]]
//
// `None` is the one true missing marker. Every transformation
// takes the table by value and hands back a new one, so pipeline
// stages chain as `let t = step(t);`.
//
// Reference: Rust Book §8 (Vectors), §13 (Iterators and Closures)

use serde::{Deserialize, Serialize};

use crate::domain::error::PrepError;

/// A single cell. `None` means missing.
pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows:    Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, PrepError> {
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
            .map(|(i, r)| (i, r.len()))
        {
            return Err(PrepError::RaggedRow { row, expected: columns.len(), found });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize, PrepError> {
        self.column_index(name)
            .ok_or_else(|| PrepError::MissingColumn(name.to_string()))
    }

    /// Iterate the cells of column `idx` in row order.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |r| r[idx].as_deref())
    }

    /// Cells of the named column in row order.
    pub fn column_by_name(&self, name: &str) -> Result<Vec<Option<&str>>, PrepError> {
        let idx = self.require_column(name)?;
        Ok(self.column(idx).collect())
    }

    /// Rename every column label through `f`.
    pub fn rename_columns<F: FnMut(&str) -> String>(mut self, mut f: F) -> Self {
        self.columns = self.columns.iter().map(|c| f(c)).collect();
        self
    }

    /// Apply `f` to every present cell. Missing cells stay missing;
    /// `f` may turn a present cell into a missing one.
    pub fn map_cells<F: FnMut(&str) -> Cell>(mut self, mut f: F) -> Self {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if let Some(value) = cell.as_deref() {
                    *cell = f(value);
                }
            }
        }
        self
    }

    /// Insert a column at `pos`, filling each row from `value_for_row(row_index)`.
    pub fn insert_column<F: FnMut(usize) -> Cell>(
        mut self,
        pos: usize,
        name: impl Into<String>,
        mut value_for_row: F,
    ) -> Self {
        let pos = pos.min(self.columns.len());
        self.columns.insert(pos, name.into());
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.insert(pos, value_for_row(i));
        }
        self
    }

    /// Keep only the columns for which `keep(index)` returns true.
    pub fn retain_columns<F: FnMut(usize) -> bool>(self, mut keep: F) -> Self {
        let kept: Vec<usize> = (0..self.columns.len()).filter(|&i| keep(i)).collect();
        self.project(&kept)
    }

    /// A new table with the given rows, in the order given.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows:    indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// A new table holding only the named columns, in the order named.
    pub fn select_columns(&self, names: &[&str]) -> Result<Table, PrepError> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.clone().project(&indices))
    }

    /// A new table without the named column.
    pub fn drop_column(&self, name: &str) -> Result<Table, PrepError> {
        let dropped = self.require_column(name)?;
        Ok(self.clone().retain_columns(|i| i != dropped))
    }

    fn project(self, indices: &[usize]) -> Table {
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table { columns, rows }
    }
}

// ─── Test helpers ─────────────────────────────────────────────────────────────
/// Build a table from string literals; `""` becomes a missing cell.
#[cfg(test)]
pub fn table_of(columns: &[&str], rows: &[&[&str]]) -> Table {
    let rows = rows
        .iter()
        .map(|r| {
            r.iter()
                .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                .collect()
        })
        .collect();
    Table::new(columns.iter().map(|c| c.to_string()).collect(), rows)
        .expect("test table rows must match header width")
}
