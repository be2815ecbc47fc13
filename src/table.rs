//! Generic delimited-table reading.
//!
//! Both simulator families are parsed into the same shape: named columns over
//! rows of string cells, with numeric access on demand. Cells stay as strings
//! because the DRT stats files mix numeric and non-numeric columns.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::schema;

/// A rectangular table of string cells with named columns.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a delimited file whose first row is the header.
    pub fn from_path_with_headers(path: &Path, delimiter: u8) -> AnalysisResult<Self> {
        let file = open(path)?;
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(file);

        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        let rows = read_rows(&mut rdr)?;

        debug!(path = %path.display(), columns = columns.len(), rows = rows.len(), "Read table");
        Ok(Self { columns, rows })
    }

    /// Reads a headerless delimited file.
    ///
    /// When `names` is given its length must match the data width; when it is
    /// absent the caller assigns names later via [`Table::set_columns`].
    pub fn from_path_headerless(
        path: &Path,
        delimiter: u8,
        names: Option<Vec<String>>,
    ) -> AnalysisResult<Self> {
        let file = open(path)?;
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_reader(file);

        let rows = read_rows(&mut rdr)?;
        let width = rows.first().map_or(0, Vec::len);

        let mut table = Self {
            columns: vec![String::new(); width],
            rows,
        };
        if let Some(names) = names {
            table.set_columns(names)?;
        }

        debug!(path = %path.display(), width, rows = table.rows.len(), "Read headerless table");
        Ok(table)
    }

    /// Assigns column names; the count must match the data width.
    pub fn set_columns(&mut self, names: Vec<String>) -> AnalysisResult<()> {
        if names.len() != self.width() {
            return Err(AnalysisError::Schema(format!(
                "{} column names supplied for a {}-column table",
                names.len(),
                self.width()
            )));
        }
        self.columns = names;
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a column parsed as `f64`.
    pub fn numeric_column(&self, name: &str) -> AnalysisResult<Vec<f64>> {
        let idx = self.require_column(name)?;
        self.rows
            .iter()
            .map(|row| parse_cell(&row[idx], name))
            .collect()
    }

    /// The last row's value in a column, parsed as `f64`.
    pub fn last_row_numeric(&self, name: &str) -> AnalysisResult<f64> {
        let idx = self.require_column(name)?;
        let row = self
            .rows
            .last()
            .ok_or_else(|| AnalysisError::Parse(format!("no rows to read column '{name}' from")))?;
        parse_cell(&row[idx], name)
    }

    /// Sum of a column parsed as `f64`.
    pub fn numeric_sum(&self, name: &str) -> AnalysisResult<f64> {
        Ok(self.numeric_column(name)?.iter().sum())
    }

    fn require_column(&self, name: &str) -> AnalysisResult<usize> {
        self.column_index(name).ok_or_else(|| {
            AnalysisError::Schema(format!(
                "column '{name}' not present; available: {:?}",
                self.columns
            ))
        })
    }
}

fn open(path: &Path) -> AnalysisResult<File> {
    File::open(path).map_err(|_| AnalysisError::NotFound(path.to_path_buf()))
}

fn read_rows(rdr: &mut csv::Reader<File>) -> AnalysisResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.trim().to_owned()).collect());
    }
    Ok(rows)
}

fn parse_cell(cell: &str, column: &str) -> AnalysisResult<f64> {
    cell.parse::<f64>()
        .map_err(|_| AnalysisError::Parse(format!("non-numeric value '{cell}' in column '{column}'")))
}

/// Resolves an AMOD data path to its actual CSV file and containing directory.
///
/// AMoDeus sometimes nests a data file inside a directory of the same name;
/// in that case the file is `<dir>/<basename>.csv`.
pub(crate) fn amod_data_file(path: &Path) -> (PathBuf, PathBuf) {
    if path.is_dir() {
        let base = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let file = match base {
            Some(base) => path.join(format!("{base}.csv")),
            None => path.to_path_buf(),
        };
        (file, path.to_path_buf())
    } else {
        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        (path.to_path_buf(), dir)
    }
}

/// Reads an AMOD-style headerless CSV, taking column names from the
/// `description.csv` sidecar next to the data file when one exists.
pub fn read_amod_csv(path: &Path) -> AnalysisResult<Table> {
    let (file, dir) = amod_data_file(path);
    let names = schema::read_column_names(&dir)?;
    Table::from_path_headerless(&file, b',', names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("fleet_stats_table_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_semicolon_table_with_headers() {
        let dir = temp_dir("semicolon");
        let path = dir.join("stats.csv");
        fs::write(&path, "iteration;wait_average;wait_p95\n0;120.5;300.0\n1;110.0;280.5\n").unwrap();

        let table = Table::from_path_with_headers(&path, b';').unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.last_row_numeric("wait_average").unwrap(), 110.0);
        assert_eq!(table.last_row_numeric("wait_p95").unwrap(), 280.5);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_non_numeric_cell_is_parse_error() {
        let dir = temp_dir("non_numeric");
        let path = dir.join("stats.csv");
        fs::write(&path, "a;b\n1;oops\n").unwrap();

        let table = Table::from_path_with_headers(&path, b';').unwrap();
        assert!(matches!(
            table.numeric_column("b"),
            Err(AnalysisError::Parse(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let dir = temp_dir("missing_col");
        let path = dir.join("stats.csv");
        fs::write(&path, "a;b\n1;2\n").unwrap();

        let table = Table::from_path_with_headers(&path, b';').unwrap();
        assert!(matches!(
            table.numeric_column("c"),
            Err(AnalysisError::Schema(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = temp_dir("missing_file");
        assert!(matches!(
            Table::from_path_with_headers(&dir.join("nope.csv"), b','),
            Err(AnalysisError::NotFound(_))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_amod_csv_uses_sidecar_names() {
        let dir = temp_dir("amod_sidecar");
        fs::write(dir.join("description.csv"), "\"pickup time, submission time\"\n").unwrap();
        fs::write(dir.join("RequestTravelTimes"), "10.0,4.0\n20.0,6.0\n").unwrap();

        let table = read_amod_csv(&dir.join("RequestTravelTimes")).unwrap();
        assert_eq!(table.numeric_column("pickup time").unwrap(), vec![10.0, 20.0]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_amod_csv_directory_form() {
        let dir = temp_dir("amod_dirform");
        let data_dir = dir.join("DistancesOverDay");
        fs::create_dir(&data_dir).unwrap();
        fs::write(data_dir.join("DistancesOverDay.csv"), "1.0,2.0\n").unwrap();

        let table = read_amod_csv(&data_dir).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.width(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sidecar_name_count_mismatch_is_schema_error() {
        let dir = temp_dir("amod_mismatch");
        fs::write(dir.join("description.csv"), "\"a, b, c\"\n").unwrap();
        fs::write(dir.join("data"), "1.0,2.0\n").unwrap();

        assert!(matches!(
            read_amod_csv(&dir.join("data")),
            Err(AnalysisError::Schema(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
