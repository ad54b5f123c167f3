//! CSV file source provider
//!
//! Discovers the `*.csv` files of the source directory and reads each into
//! header-keyed [`RawRow`]s for the normalizer. A row that cannot be decoded
//! is handed over as [`MalformedRecordError::Unreadable`] in its place; only
//! failures affecting the whole file are errors.

use crate::domain::{MalformedRecordError, RawRow, Result, SyncError};
use std::io::Read;
use std::path::{Path, PathBuf};

/// One data row of a source file, or the reason it could not be read
pub type SourceRowResult = std::result::Result<RawRow, MalformedRecordError>;

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path of the file
    pub path: PathBuf,

    /// File name without the `.csv` extension
    pub stem: String,
}

/// Lists the CSV files of `dir`, sorted by file name
///
/// A missing directory yields an empty list. Only regular files whose
/// extension is `csv` (any case) are returned.
pub async fn discover_csv_files(dir: &Path) -> Result<Vec<SourceFile>> {
    if !tokio::fs::try_exists(dir).await? {
        tracing::warn!(dir = %dir.display(), "Source directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv || !tokio::fs::metadata(&path).await?.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        files.push(SourceFile {
            stem: stem.to_string(),
            path,
        });
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

/// Reads every data row of a CSV file
///
/// # Errors
///
/// Returns [`SyncError::Csv`] naming the file when it cannot be opened or its
/// header cannot be read.
pub async fn read_rows(path: &Path) -> Result<Vec<SourceRowResult>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SyncError::Csv(format!("{}: {e}", path.display())))?;
    read_rows_from(bytes.as_slice())
        .map_err(|e| SyncError::Csv(format!("{}: {e}", path.display())))
}

/// Reads rows from any CSV reader
///
/// Rows may be shorter or longer than the header; blank lines are skipped and
/// do not count towards row numbers.
pub fn read_rows_from<R: Read>(
    reader: R,
) -> std::result::Result<Vec<SourceRowResult>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if record.iter().all(|field| field.iter().all(u8::is_ascii_whitespace)) {
                    continue;
                }
                let row = rows.len() + 1;
                rows.push(decode_row(&headers, &record, row));
            }
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => rows.push(Err(MalformedRecordError::Unreadable {
                row: rows.len() + 1,
                message: e.to_string(),
            })),
        }
    }
    Ok(rows)
}

fn decode_row(headers: &[String], record: &csv::ByteRecord, row: usize) -> SourceRowResult {
    let mut values = Vec::with_capacity(record.len());
    for (index, field) in record.iter().enumerate() {
        let value = std::str::from_utf8(field).map_err(|_| MalformedRecordError::Unreadable {
            row,
            message: format!("field {} is not valid UTF-8", index + 1),
        })?;
        values.push(value);
    }
    Ok(RawRow::from_parts(headers, &values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn readable(rows: Vec<SourceRowResult>) -> Vec<RawRow> {
        rows.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_read_rows_from_str() {
        let data = "Category,Code,Display\nBody Site,61685007,Lower limb\n\nBody Site,53120007,\"Upper limb, left\"\n";
        let rows = readable(read_rows_from(data.as_bytes()).unwrap());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("code"), Some("61685007"));
        assert_eq!(rows[1].get("Display"), Some("Upper limb, left"));
    }

    #[test]
    fn test_short_row_reports_missing_field() {
        let data = "Category,Code,Display\nBody Site,61685007\n";
        let rows = readable(read_rows_from(data.as_bytes()).unwrap());
        assert_eq!(rows[0].get("display"), None);
    }

    #[test]
    fn test_invalid_utf8_row_is_rejected_alone() {
        let mut data = b"Category,Code,Display\nBody Site,C1,Arm\nBody Site,C2,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\nBody Site,C3,Head\n");

        let rows = read_rows_from(data.as_slice()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_ref().unwrap().get("code"), Some("C1"));
        assert_eq!(
            rows[1].as_ref().unwrap_err(),
            &MalformedRecordError::Unreadable {
                row: 2,
                message: "field 3 is not valid UTF-8".to_string(),
            }
        );
        assert_eq!(rows[2].as_ref().unwrap().get("code"), Some("C3"));
    }

    #[test]
    fn test_invalid_utf8_header_fails_file() {
        let data = [b'C', 0xff, b'\n', b'x', b'\n'];
        assert!(read_rows_from(&data[..]).is_err());
    }

    #[tokio::test]
    async fn test_discover_csv_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("procedures.csv"), "Code\n").unwrap();
        fs::write(dir.path().join("body_sites.CSV"), "Code\n").unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = discover_csv_files(dir.path()).await.unwrap();
        let stems: Vec<&str> = files.iter().map(|f| f.stem.as_str()).collect();
        assert_eq!(stems, vec!["body_sites", "procedures"]);
    }

    #[tokio::test]
    async fn test_discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = discover_csv_files(&dir.path().join("absent")).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_read_rows_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_rows(&dir.path().join("absent.csv")).await.unwrap_err();
        assert!(matches!(err, SyncError::Csv(_)));
    }
}
