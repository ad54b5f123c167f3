//! Record normalizer
//!
//! Converts raw header-keyed rows into [`CanonicalRecord`]s. The conversion
//! is lazy and pure: it consumes the row iterator once and performs no I/O.
//!
//! Recognised headers (case-insensitive, first match wins):
//!
//! | Field | Headers |
//! |---|---|
//! | category | `category`, `procedure category`, `value set`, `valueset` |
//! | code | `code`, `concept code`, `snomed code` |
//! | display name | `display`, `display name`, `displayname`, `name` |
//! | parent grouping | `parent`, `parent grouping`, `parentgrouping` (optional) |

use crate::domain::{CanonicalRecord, MalformedRecordError, RawRow};

const CATEGORY_HEADERS: &[&str] = &["category", "procedure category", "value set", "valueset"];
const CODE_HEADERS: &[&str] = &["code", "concept code", "snomed code"];
const DISPLAY_HEADERS: &[&str] = &["display", "display name", "displayname", "name"];
const PARENT_HEADERS: &[&str] = &["parent", "parent grouping", "parentgrouping"];

/// A row handed to the normalizer
///
/// File sources hand over `Result`s so that a row they could not decode still
/// occupies its position and surfaces as that row's error.
pub trait SourceRow {
    fn into_row(self) -> Result<RawRow, MalformedRecordError>;
}

impl SourceRow for RawRow {
    fn into_row(self) -> Result<RawRow, MalformedRecordError> {
        Ok(self)
    }
}

impl SourceRow for Result<RawRow, MalformedRecordError> {
    fn into_row(self) -> Result<RawRow, MalformedRecordError> {
        self
    }
}

/// Lazy normalizing iterator over raw rows
pub struct Normalizer<I> {
    rows: I,
    row_number: usize,
}

impl<I> Iterator for Normalizer<I>
where
    I: Iterator,
    I::Item: SourceRow,
{
    type Item = Result<CanonicalRecord, MalformedRecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.row_number += 1;
        Some(
            row.into_row()
                .and_then(|row| normalize_row(&row, self.row_number)),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Wraps a row source in a [`Normalizer`]
///
/// # Examples
///
/// ```
/// use procedures_sync::core::normalize::normalize;
/// use procedures_sync::domain::RawRow;
///
/// let rows = vec![RawRow::new()
///     .with_field("Category", "Body Site")
///     .with_field("Code", " 61685007 ")
///     .with_field("Display", "Lower limb structure")];
///
/// let records: Vec<_> = normalize(rows).collect::<Result<_, _>>().unwrap();
/// assert_eq!(records[0].code, "61685007");
/// ```
pub fn normalize<R>(rows: R) -> Normalizer<R::IntoIter>
where
    R: IntoIterator,
    R::Item: SourceRow,
{
    Normalizer {
        rows: rows.into_iter(),
        row_number: 0,
    }
}

/// Normalizes a single row
///
/// `row_number` is only used for error reporting.
///
/// # Errors
///
/// Returns [`MalformedRecordError::MissingColumn`] when category, code or
/// display is absent, and [`MalformedRecordError::EmptyCode`] when the code
/// is blank after trimming.
pub fn normalize_row(
    row: &RawRow,
    row_number: usize,
) -> Result<CanonicalRecord, MalformedRecordError> {
    let category = required(row, row_number, CATEGORY_HEADERS)?;
    let code = required(row, row_number, CODE_HEADERS)?;
    let display = required(row, row_number, DISPLAY_HEADERS)?;
    let parent = lookup(row, PARENT_HEADERS).unwrap_or_default();

    if code.trim().is_empty() {
        return Err(MalformedRecordError::EmptyCode { row: row_number });
    }

    Ok(CanonicalRecord::new(category, code, display, parent))
}

fn lookup<'a>(row: &'a RawRow, headers: &[&str]) -> Option<&'a str> {
    headers.iter().find_map(|h| row.get(h))
}

fn required<'a>(
    row: &'a RawRow,
    row_number: usize,
    headers: &[&str],
) -> Result<&'a str, MalformedRecordError> {
    lookup(row, headers).ok_or_else(|| MalformedRecordError::MissingColumn {
        row: row_number,
        column: headers[0].to_string(),
    })
}
