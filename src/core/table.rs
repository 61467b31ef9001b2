// Delimited text tables with `#`-prefixed remark and header lines.
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::value::Value;

#[derive(Clone, Debug)]
pub struct TableWriteOptions {
    pub delimiter: char,
    pub append: bool,
    /// Free-form remark lines written (each prefixed `# `) before the header.
    pub remark: Option<String>,
}

impl TableWriteOptions {
    pub fn new() -> Self {
        Self {
            delimiter: '\t',
            append: false,
            remark: None,
        }
    }
}

impl Default for TableWriteOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Write rows to a delimited text file.
///
/// In truncate mode, or whenever the target is missing or empty, the remark
/// and header are written first. Appending to an existing non-empty file
/// writes only the rows, so the header is never duplicated. Partial writes
/// before a failure are not rolled back, and concurrent writers to one path
/// are the caller's responsibility.
pub fn save_table(
    path: impl AsRef<Path>,
    rows: &[Vec<Value>],
    header: Option<&[&str]>,
    options: &TableWriteOptions,
) -> Result<(), Error> {
    let path = path.as_ref();
    check_widths(rows, header)?;

    let mut open = OpenOptions::new();
    if options.append {
        open.create(true).append(true);
    } else {
        open.create(true).write(true).truncate(true);
    }
    let file = open
        .open(path)
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))?;

    let preexisting = options.append
        && file
            .metadata()
            .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?
            .len()
            > 0;

    let mut writer = BufWriter::new(file);
    let io_failed =
        |err: std::io::Error| Error::new(ErrorKind::Io).with_path(path).with_source(err);

    if !preexisting {
        if let Some(remark) = &options.remark {
            for line in remark.lines() {
                writeln!(writer, "# {line}").map_err(io_failed)?;
            }
        }
        if let Some(columns) = header {
            writeln!(writer, "#{}", join(columns.iter(), options.delimiter)).map_err(io_failed)?;
        }
    }

    for row in rows {
        writeln!(writer, "{}", join(row.iter(), options.delimiter)).map_err(io_failed)?;
    }

    writer.flush().map_err(io_failed)
}

fn check_widths(rows: &[Vec<Value>], header: Option<&[&str]>) -> Result<(), Error> {
    let expected = match (header, rows.first()) {
        (Some(columns), _) => columns.len(),
        (None, Some(first)) => first.len(),
        (None, None) => return Ok(()),
    };
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(Error::new(ErrorKind::Usage).with_message(format!(
                "row {idx} has {} cells, expected {expected}",
                row.len()
            )));
        }
        if let Some(cell) = row.iter().find(|cell| !cell.is_scalar()) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("row {idx} holds a non-scalar cell: {cell}")));
        }
    }
    Ok(())
}

fn join<T: std::fmt::Display>(cells: impl Iterator<Item = T>, delimiter: char) -> String {
    let mut out = String::new();
    for (idx, cell) in cells.enumerate() {
        if idx > 0 {
            out.push(delimiter);
        }
        out.push_str(&cell.to_string());
    }
    out
}

#[derive(Clone, Debug)]
pub struct TableReadOptions {
    /// `None` splits on any whitespace; a delimiter also enables empty cells.
    pub delimiter: Option<char>,
    /// Substituted for empty delimited cells.
    pub default_value: Value,
}

impl TableReadOptions {
    pub fn new() -> Self {
        Self {
            delimiter: None,
            default_value: Value::Number(0.0),
        }
    }
}

impl Default for TableReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a delimited table, skipping `#` comments (and therefore anything
/// `save_table` wrote as remark or header) and blank lines. Cells coerce
/// like config tokens.
pub fn read_table(
    path: impl AsRef<Path>,
    options: &TableReadOptions,
) -> Result<Vec<Vec<Value>>, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))?;

    let mut rows = Vec::new();
    for raw in text.lines() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = match options.delimiter {
            Some(delimiter) => line
                .split(delimiter)
                .map(|cell| {
                    let cell = cell.trim();
                    if cell.is_empty() {
                        options.default_value.clone()
                    } else {
                        Value::coerce(cell)
                    }
                })
                .collect(),
            None => line.split_whitespace().map(Value::coerce).collect(),
        };
        rows.push(row);
    }
    Ok(rows)
}

/// Gather the given column indices column-major. Rows too short to hold a
/// cell are skipped for that column; ragged tables are the caller's problem.
pub fn select_columns(rows: &[Vec<Value>], indices: &[usize]) -> Vec<Vec<Value>> {
    indices
        .iter()
        .map(|&index| {
            rows.iter()
                .filter_map(|row| row.get(index).cloned())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        TableReadOptions, TableWriteOptions, read_table, save_table, select_columns,
    };
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;

    fn row(cells: &[f64]) -> Vec<Value> {
        cells.iter().map(|&cell| Value::Number(cell)).collect()
    }

    #[test]
    fn empty_rows_with_header_writes_only_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        save_table(&path, &[], Some(&["t", "v"]), &TableWriteOptions::new()).expect("save");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "#t\tv\n");
    }

    #[test]
    fn append_does_not_duplicate_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let header = ["t", "v"];

        save_table(
            &path,
            &[row(&[0.0, 1.0])],
            Some(&header),
            &TableWriteOptions::new(),
        )
        .expect("save");

        let mut options = TableWriteOptions::new();
        options.append = true;
        save_table(&path, &[row(&[1.0, 2.0])], Some(&header), &options).expect("append");

        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "#t\tv\n0\t1\n1\t2\n");
    }

    #[test]
    fn append_to_fresh_path_still_writes_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let mut options = TableWriteOptions::new();
        options.append = true;
        save_table(&path, &[row(&[1.0])], Some(&["v"]), &options).expect("append");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "#v\n1\n");
    }

    #[test]
    fn remark_lines_are_comment_prefixed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let mut options = TableWriteOptions::new();
        options.remark = Some("fit of run 12".to_string());
        save_table(&path, &[row(&[1.0])], Some(&["v"]), &options).expect("save");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "# fit of run 12\n#v\n1\n");
    }

    #[test]
    fn ragged_rows_are_a_usage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let rows = vec![row(&[1.0, 2.0]), row(&[3.0])];
        let err = save_table(&path, &rows, None, &TableWriteOptions::new())
            .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn saved_tables_reload_without_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        let rows = vec![row(&[0.0, 1.5]), row(&[1.0, 2.5])];
        let mut options = TableWriteOptions::new();
        options.remark = Some("reload check".to_string());
        save_table(&path, &rows, Some(&["t", "v"]), &options).expect("save");

        let loaded = read_table(&path, &TableReadOptions::new()).expect("read");
        assert_eq!(loaded, rows);
    }

    #[test]
    fn delimited_read_fills_empty_cells() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sparse.txt");
        std::fs::write(&path, "1,,3\n4,5,n/a\n").expect("write");

        let mut options = TableReadOptions::new();
        options.delimiter = Some(',');
        let rows = read_table(&path, &options).expect("read");
        assert_eq!(
            rows,
            vec![
                vec![Value::Number(1.0), Value::Number(0.0), Value::Number(3.0)],
                vec![
                    Value::Number(4.0),
                    Value::Number(5.0),
                    Value::Text("n/a".to_string())
                ],
            ]
        );
    }

    #[test]
    fn select_columns_skips_short_rows() {
        let rows = vec![row(&[1.0, 2.0]), row(&[3.0])];
        let columns = select_columns(&rows, &[1]);
        assert_eq!(columns, vec![vec![Value::Number(2.0)]]);
    }

    #[test]
    fn missing_table_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_table(dir.path().join("nope.txt"), &TableReadOptions::new())
            .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
