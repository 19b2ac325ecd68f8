//! Reference simulator output: the DSSAT `PlantGro.OUT` growth table.
//!
//! The table starts at the header line beginning with `@YEAR` and runs
//! until the next `*`, `@` or `$` line. Cells are whitespace separated and
//! read as numbers; `-99` and anything unparsable become missing values.

use std::path::Path;

use tracing::debug;

/// Errors that can occur while reading a reference table.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// Failed to read the reference file from disk.
    #[error("failed to read reference file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// No `@YEAR` header line was found.
    #[error("no `@YEAR` header line in reference output")]
    MissingHeader,

    /// A data row has a different number of cells than the header.
    #[error("line {line}: expected {expected} cells, found {found}")]
    RaggedRow {
        /// 1-based line number in the file.
        line: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of cells on the line.
        found: usize,
    },

    /// A column needed for comparison is absent.
    #[error("reference output has no `{column}` column")]
    MissingColumn {
        /// Name of the required column.
        column: String,
    },
}

/// A parsed `PlantGro.OUT` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

fn parse_cell(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && (value + 99.0).abs() > 1e-6)
}

impl ReferenceTable {
    /// Parse the growth table from the text of a `PlantGro.OUT` file.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::MissingHeader`] if there is no `@YEAR`
    /// line, or [`ReferenceError::RaggedRow`] for a malformed data row.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let mut lines = text.lines().enumerate();
        let header = lines
            .by_ref()
            .find(|(_, line)| line.trim_start().starts_with("@YEAR"))
            .map(|(_, line)| line)
            .ok_or(ReferenceError::MissingHeader)?;
        let columns: Vec<String> = header
            .split_whitespace()
            .map(|name| name.trim_start_matches('@').to_owned())
            .collect();

        let mut rows = Vec::new();
        for (index, line) in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('!') {
                continue;
            }
            if trimmed.starts_with(['*', '@', '$']) {
                break;
            }
            let cells: Vec<Option<f64>> = trimmed.split_whitespace().map(parse_cell).collect();
            if cells.len() != columns.len() {
                return Err(ReferenceError::RaggedRow {
                    line: index + 1,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            rows.push(cells);
        }

        debug!(
            columns = columns.len(),
            rows = rows.len(),
            "Parsed reference growth table"
        );
        Ok(Self { columns, rows })
    }

    /// Read and parse a `PlantGro.OUT` file.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Io`] if the file cannot be read, or any
    /// error of [`ReferenceTable::parse`].
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Column names in file order, without the leading `@`.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the table has a column named `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of column `name` in row `row`, or `None` if the row or column
    /// does not exist or the cell is missing.
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col).copied().flatten()
    }

    /// Every value of column `name`, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::MissingColumn`] if there is no such column.
    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>, ReferenceError> {
        let col = self
            .column_index(name)
            .ok_or_else(|| ReferenceError::MissingColumn {
                column: name.to_owned(),
            })?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(col).copied().flatten())
            .collect())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const SAMPLE: &str = "\
$GROWTH ASPECTS OUTPUT FILE

*DSSAT Cropping System Model

*RUN   1        : STRAWBERRY
!IDSSAT output
@YEAR DOY   DAS   DAP   LAID   LWAD   SWAD   GWAD   RWAD   VWAD   G#AD   RDPD   WSPD
 2023 121     0     0  0.10      0      0      0      0      0      0   0.05  0.000
 2023 123     2     2  0.10     12      6      0     12     30      0   0.06  0.000
 2023 125     4     4  0.11     20    -99      0     20     50      0   0.07  0.100

*RUN   2        : STRAWBERRY
@YEAR DOY   DAS   DAP   LAID
 2023 121     0     0  0.20
";

    #[test]
    fn parses_first_table_only() {
        let table = ReferenceTable::parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().first().map(String::as_str), Some("YEAR"));
        assert!(table.has_column("G#AD"));
        assert!(!table.has_column("HWAD"));
    }

    #[test]
    fn missing_marker_becomes_none() {
        let table = ReferenceTable::parse(SAMPLE).unwrap();
        assert_eq!(table.value(2, "SWAD"), None);
        assert_relative_eq!(table.value(2, "LWAD").unwrap(), 20.0);
        assert_relative_eq!(table.value(1, "RDPD").unwrap(), 0.06);
    }

    #[test]
    fn column_extracts_in_row_order() {
        let table = ReferenceTable::parse(SAMPLE).unwrap();
        let dap = table.column("DAP").unwrap();
        assert_eq!(dap, vec![Some(0.0), Some(2.0), Some(4.0)]);
        assert!(matches!(
            table.column("NOPE"),
            Err(ReferenceError::MissingColumn { .. })
        ));
    }

    #[test]
    fn missing_header_is_an_error() {
        assert!(matches!(
            ReferenceTable::parse("*RUN 1\n 2023 121 0 0\n"),
            Err(ReferenceError::MissingHeader)
        ));
    }

    #[test]
    fn ragged_row_is_an_error() {
        let text = "@YEAR DOY DAP\n 2023 121\n";
        assert!(matches!(
            ReferenceTable::parse(text),
            Err(ReferenceError::RaggedRow { line: 2, expected: 3, found: 2 })
        ));
    }
}
