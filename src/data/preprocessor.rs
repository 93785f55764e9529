// ============================================================
// Layer 4 — Raw Data Normalizer
// ============================================================
// Cleans one raw table before schemas and folds are derived.
//
// Cleaning steps (applied in order, each a pure Table → Table):
//   1. Trim leading/trailing whitespace; blank cells become missing
//   2. Rename purely numeric column labels: "3" → "f3"
//   3. Insert the id column (0, 1, 2, ...) when it is absent
//   4. Decode byte-string literals such as b'abc' → abc
//   5. Drop columns holding a single distinct value
//   6. Replace the sentinel token (default "?") with a missing cell
//
// Step 5 treats sentinel cells as missing when counting distinct
// values, so that no column is left with one distinct value once
// step 6 has run and a second pass changes nothing.
//
// What do raw benchmark files look like?
//   Many of them were exported from ARFF or from Python scripts:
//   - "?" written where a value is unknown
//   - b'tested_positive' written where bytes were printed as text
//   - headers that are just column numbers: 0, 1, 2, ...
//   - padding spaces around values, or cells that hold only spaces
//
// After cleaning, every missing value is a real `None` and every
// column label is a name, so the schema generator and the splitter
// never see these artifacts.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use std::collections::HashSet;

use crate::domain::table::Table;

/// Default placeholder that stands for a missing value in raw files.
pub const DEFAULT_NAN_TOKEN: &str = "?";

pub struct Normalizer {
    nan_token: String,
}

impl Normalizer {
    /// Create a Normalizer that treats `nan_token` as a missing value
    pub fn new(nan_token: impl Into<String>) -> Self {
        Self { nan_token: nan_token.into() }
    }

    /// Run every cleaning step over `table`.
    pub fn normalize(&self, table: Table, id_field: &str) -> Table {
        let (rows, cols) = (table.n_rows(), table.n_cols());

        let table = strip_whitespace(table);
        let table = rename_numeric_columns(table);
        let table = insert_id_column_if_missing(table, id_field);
        let table = decode_byte_strings(table);
        let table = drop_constant_columns(table, &self.nan_token);
        let table = replace_nan_token(table, &self.nan_token);

        tracing::debug!(
            "Normalized {} rows: {} raw columns → {} columns",
            rows,
            cols,
            table.n_cols()
        );
        table
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_NAN_TOKEN)
    }
}

// ─── Step 1 ───────────────────────────────────────────────────────────────────
/// Trim every cell. A cell that held only whitespace becomes missing;
/// written out it would be an empty field, which reads back as missing.
pub fn strip_whitespace(table: Table) -> Table {
    table.map_cells(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

// ─── Step 2 ───────────────────────────────────────────────────────────────────
/// Labels made only of ASCII digits get an `f` prefix.
///
/// Headerless exports number their columns, and a bare number is a
/// poor field name in a schema document.
pub fn rename_numeric_columns(table: Table) -> Table {
    table.rename_columns(|label| {
        if !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()) {
            format!("f{label}")
        } else {
            label.to_string()
        }
    })
}

// ─── Step 3 ───────────────────────────────────────────────────────────────────
// The test-key file joins test rows back to their labels by id, so
// every dataset needs one. Row numbers serve when the raw file has none.
pub fn insert_id_column_if_missing(table: Table, id_field: &str) -> Table {
    if table.column_index(id_field).is_some() {
        return table;
    }
    tracing::debug!("Inserting id column '{}'", id_field);
    table.insert_column(0, id_field, |row| Some(row.to_string()))
}

// ─── Step 4 ───────────────────────────────────────────────────────────────────
/// Replace every cell that is a byte-string literal with its decoded
/// text. Cells that do not decode cleanly are kept as they are.
/// An empty literal such as `b''` becomes a missing cell.
pub fn decode_byte_strings(table: Table) -> Table {
    table.map_cells(|v| match decode_byte_literal(v) {
        Some(decoded) if decoded.is_empty() => None,
        Some(decoded)                       => Some(decoded),
        None                                => Some(v.to_string()),
    })
}

/// Decode a textual byte-string literal (`b'...'` or `b"..."`) to UTF-8.
///
/// Returns `None` when `value` is not such a literal, when an escape is
/// malformed, when the body holds a non-ASCII character or an unescaped
/// delimiter, or when the decoded bytes are not valid UTF-8.
pub fn decode_byte_literal(value: &str) -> Option<String> {
    let (body, quote) = value
        .strip_prefix("b'")
        .and_then(|rest| rest.strip_suffix('\''))
        .map(|body| (body, '\''))
        .or_else(|| {
            value
                .strip_prefix("b\"")
                .and_then(|rest| rest.strip_suffix('"'))
                .map(|body| (body, '"'))
        })?;

    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                '\\' => bytes.push(b'\\'),
                '\'' => bytes.push(b'\''),
                '"'  => bytes.push(b'"'),
                'n'  => bytes.push(b'\n'),
                'r'  => bytes.push(b'\r'),
                't'  => bytes.push(b'\t'),
                'a'  => bytes.push(0x07),
                'b'  => bytes.push(0x08),
                'f'  => bytes.push(0x0c),
                'v'  => bytes.push(0x0b),
                // escaped newline is a line continuation
                '\n' => {}
                'x' => {
                    let hi = chars.next()?.to_digit(16)?;
                    let lo = chars.next()?.to_digit(16)?;
                    bytes.push((hi * 16 + lo) as u8);
                }
                d @ '0'..='7' => {
                    let mut code = d.to_digit(8)?;
                    for _ in 0..2 {
                        match chars.peek().and_then(|c| c.to_digit(8)) {
                            Some(next) => {
                                code = code * 8 + next;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    bytes.push(u8::try_from(code).ok()?);
                }
                // unknown escapes keep their backslash
                other if other.is_ascii() => {
                    bytes.push(b'\\');
                    bytes.push(other as u8);
                }
                _ => return None,
            },
            c if c == quote => return None,
            c if c.is_ascii() => bytes.push(c as u8),
            _ => return None,
        }
    }

    String::from_utf8(bytes).ok()
}

// ─── Step 5 ───────────────────────────────────────────────────────────────────
/// Drop every column with exactly one distinct value, ignoring
/// missing cells and cells equal to `nan_token`.
pub fn drop_constant_columns(table: Table, nan_token: &str) -> Table {
    let constant: Vec<bool> = (0..table.n_cols())
        .map(|i| distinct_values(&table, i, nan_token, 2) == 1)
        .collect();

    let dropped: Vec<&str> = table
        .columns()
        .iter()
        .zip(&constant)
        .filter(|(_, c)| **c)
        .map(|(name, _)| name.as_str())
        .collect();
    if !dropped.is_empty() {
        tracing::debug!("Dropping constant columns: {:?}", dropped);
    }

    table.retain_columns(|i| !constant[i])
}

/// Count distinct values in column `idx`, stopping once `limit` is reached.
fn distinct_values(table: &Table, idx: usize, nan_token: &str, limit: usize) -> usize {
    let mut seen = HashSet::new();
    for value in table.column(idx).flatten() {
        if value != nan_token {
            seen.insert(value);
            if seen.len() >= limit {
                break;
            }
        }
    }
    seen.len()
}

// ─── Step 6 ───────────────────────────────────────────────────────────────────
pub fn replace_nan_token(table: Table, nan_token: &str) -> Table {
    table.map_cells(|v| if v == nan_token { None } else { Some(v.to_string()) })
}
