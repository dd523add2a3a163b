//! Parsers and writers for ratings files.
//!
//! Two layouts are understood:
//! - MovieLens `.dat`: `userId::movieId::rating::timestamp`, Latin-1, no header
//! - delimited text with a header row (CSV, TSV, ...), one column per field,
//!   read and written with the `csv` crate
//!
//! Delimited files get their column dtypes inferred: a column whose cells all
//! parse as integers is `Int64`, one whose cells all parse as floats is
//! `Float64`, anything else stays `Utf8`.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Helper function to read a file with ISO-8859-1 encoding (Latin-1)
///
/// The MovieLens dataset uses ISO-8859-1 encoding, not UTF-8.
/// Every byte maps directly to the Unicode code point of the same value.
fn read_latin1(path: &Path) -> Result<String> {
    let mut file = open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes.iter().map(|&b| b as char).collect())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// MovieLens format
// =============================================================================

/// Parse a MovieLens `ratings.dat` file
///
/// Format: userId::movieId::rating::timestamp
pub fn parse_movielens_ratings(path: &Path, names: &ColumnNames) -> Result<InteractionFrame> {
    let content = read_latin1(path)?;
    parse_movielens_str(&content, &file_label(path), names)
}

/// Parse MovieLens-formatted ratings from memory. `file` only labels errors.
pub fn parse_movielens_str(
    content: &str,
    file: &str,
    names: &ColumnNames,
) -> Result<InteractionFrame> {
    let mut users = Vec::new();
    let mut items = Vec::new();
    let mut ratings = Vec::new();
    let mut timestamps = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line_trimmed.split("::").collect();
        if parts.len() != 4 {
            return Err(DataLoadError::FieldCountMismatch {
                expected: 4,
                found: parts.len(),
                line: line_no,
            });
        }

        let parse_error = |what: &str, e: &dyn std::fmt::Display| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: format!("Invalid {}: {}", what, e),
        };

        users.push(parts[0].parse::<u32>().map_err(|e| parse_error("userId", &e))?);
        items.push(parts[1].parse::<u32>().map_err(|e| parse_error("movieId", &e))?);
        ratings.push(parts[2].parse::<f64>().map_err(|e| parse_error("rating", &e))?);
        timestamps.push(parts[3].parse::<i64>().map_err(|e| parse_error("timestamp", &e))?);
    }

    InteractionFrame::new()
        .with_column(names.user.as_str(), Column::UInt32(users))?
        .with_column(names.item.as_str(), Column::UInt32(items))?
        .with_column(names.rating.as_str(), Column::Float64(ratings))?
        .with_column(names.timestamp.as_str(), Column::Int64(timestamps))
}

// =============================================================================
// Delimited format with header
// =============================================================================

/// Parse a delimited file whose first record names the columns
pub fn parse_delimited(path: &Path, delimiter: u8) -> Result<InteractionFrame> {
    let file = open(path)?;
    read_delimited(file, delimiter, &file_label(path))
}

/// Parse delimited text with a header row from memory
pub fn parse_delimited_str(content: &str, delimiter: u8, file: &str) -> Result<InteractionFrame> {
    read_delimited(content.as_bytes(), delimiter, file)
}

/// Read delimited records from any reader. Quoted fields follow RFC 4180.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8, file: &str) -> Result<InteractionFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let names: Vec<String> = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();
    if names.iter().all(|name| name.is_empty()) {
        return Err(DataLoadError::EmptyData(format!("{} has no header row", file)));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        if record.len() != names.len() {
            return Err(DataLoadError::FieldCountMismatch {
                expected: names.len(),
                found: record.len(),
                line: record.position().map_or(0, |p| p.line() as usize),
            });
        }
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let mut frame = InteractionFrame::new();
    for (name, values) in names.into_iter().zip(cells) {
        let column = infer_column(values);
        frame = frame.with_column(name, column)?;
    }
    Ok(frame)
}

/// Pick the narrowest dtype every cell parses as
fn infer_column(values: Vec<String>) -> Column {
    if let Some(ints) = values
        .iter()
        .map(|v| v.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Int64(ints);
    }
    if let Some(floats) = values
        .iter()
        .map(|v| v.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Float64(floats);
    }
    Column::Utf8(values)
}

/// Write a frame as delimited text with a header row, quoting where needed
pub fn write_delimited<W: Write>(
    frame: &InteractionFrame,
    writer: &mut W,
    delimiter: u8,
) -> Result<()> {
    let names = frame.column_names();
    let columns = names
        .iter()
        .map(|name| frame.column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    writer.write_record(&names)?;
    for row in 0..frame.num_rows() {
        writer.write_record(columns.iter().map(|c| c.display_at(row).unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}
