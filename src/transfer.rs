//! Reading and writing rosters as comma separated files.
//!
//! Each line holds one student as `name,count`. Exported files start with the header
//! `"Name","Count"`; imported files may skip their first line to drop such a header.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{error::RollcallError, student::Student};

/// Reads the students from the file at `path`.
///
/// See [`read_students`] for the accepted format.
pub fn import_file(
    path: impl AsRef<Path>,
    skip_first: bool,
) -> Result<Vec<Student>, RollcallError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RollcallError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    read_students(file, skip_first).map_err(|err| match err {
        RollcallError::FileAccess { source, .. } => RollcallError::FileAccess {
            path: path.to_path_buf(),
            source,
        },
        err => err,
    })
}

/// Writes the students to the file at `path`, replacing its content.
pub fn export_file(path: impl AsRef<Path>, students: &[Student]) -> Result<(), RollcallError> {
    let path = path.as_ref();
    File::create(path)
        .and_then(|file| write_students(file, students))
        .map_err(|source| RollcallError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads students from `reader`.
///
/// - Blank lines are skipped and surrounding whitespace of the fields is trimmed.
/// - If `skip_first` is set, the first record is dropped.
/// - A missing or empty count imports as `0`.
///
/// # Errors
/// Fails with [`RollcallError::InvalidRecord`] on a record with an empty name, more than two
/// fields or a count that is not a non-negative integer.
pub fn read_students(reader: impl Read, skip_first: bool) -> Result<Vec<Student>, RollcallError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut students = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(from_csv_err)?;
        if idx == 0 && skip_first {
            debug!("skipping first record {:?}", record);
            continue;
        }
        students.push(parse_record(&record)?);
    }
    Ok(students)
}

/// Writes the header and one record per student to `writer`.
///
/// The name is always quoted, whatever it looks like, and the count is written bare.
pub fn write_students(writer: impl Write, students: &[Student]) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "\"Name\",\"Count\"")?;
    for student in students {
        writeln!(writer, "{},{}", quoted(&student.name), student.count)?;
    }
    writer.flush()
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or_default()
}

fn parse_record(record: &StringRecord) -> Result<Student, RollcallError> {
    let invalid = |reason: String| RollcallError::InvalidRecord {
        line: line_of(record),
        reason,
    };

    if record.len() > 2 {
        return Err(invalid(format!(
            "expected at most 2 fields, found {}",
            record.len()
        )));
    }

    let name = record.get(0).unwrap_or_default();
    if name.is_empty() {
        return Err(invalid("missing name".into()));
    }

    let count = match record.get(1) {
        None | Some("") => 0,
        Some(count) => count
            .parse::<u64>()
            .map_err(|_| invalid(format!("count `{}` is not a non-negative integer", count)))?,
    };

    Ok(Student::new(name, count))
}

fn from_csv_err(err: csv::Error) -> RollcallError {
    let line = err
        .position()
        .map(|pos| pos.line())
        .unwrap_or_default();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => RollcallError::FileAccess {
            path: Default::default(),
            source,
        },
        kind => RollcallError::InvalidRecord {
            line,
            reason: format!("{:?}", kind),
        },
    }
}
