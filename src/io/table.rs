use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::core::sequence::SequenceStore;
use crate::error::{DxcError, Result};
use crate::io::Separator;

/// Column-major numeric table with optional header labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub labels: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl Table {
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

/// Parses a row-major table; each column becomes one sequence.
///
/// Blank lines and lines starting with `#` are skipped. A first row made only
/// of non-numeric cells is taken as column labels.
pub fn parse_table<R: BufRead>(reader: R, sep: Separator, source_name: &str) -> Result<Table> {
    let mut table = Table::default();
    let mut width: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| DxcError::Read {
            source_name: source_name.to_string(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let cells = sep.split(trimmed);

        match width {
            Some(expected) if cells.len() != expected => {
                return Err(DxcError::RaggedTable {
                    line: line_no,
                    expected,
                    found: cells.len(),
                });
            }
            Some(_) => {}
            None => {
                width = Some(cells.len());
                table.columns = vec![Vec::new(); cells.len()];
                if cells.iter().all(|c| c.parse::<f64>().is_err()) {
                    table.labels = cells.iter().map(|c| c.to_string()).collect();
                    continue;
                }
            }
        }

        for (col, (cell, column)) in cells.iter().zip(table.columns.iter_mut()).enumerate() {
            let value = cell.parse::<f64>().map_err(|_| DxcError::Parse {
                line: line_no,
                column: col + 1,
                cell: cell.to_string(),
            })?;
            if !value.is_finite() {
                return Err(DxcError::NonFiniteCell {
                    line: line_no,
                    column: col + 1,
                    cell: cell.to_string(),
                });
            }
            column.push(value);
        }
    }

    debug!(
        source = source_name,
        columns = table.columns.len(),
        rows = table.rows(),
        "table parsed"
    );
    Ok(table)
}

/// Loads a table from `path`, or from standard input when `path` is `None`.
pub fn load(path: Option<&Path>, sep: Separator) -> Result<SequenceStore> {
    let table = match path {
        Some(path) => {
            let name = path.display().to_string();
            let file = File::open(path).map_err(|source| DxcError::Read {
                source_name: name.clone(),
                source,
            })?;
            parse_table(BufReader::new(file), sep, &name)?
        }
        None => parse_table(std::io::stdin().lock(), sep, "standard input")?,
    };
    into_store(table)
}

pub fn into_store(table: Table) -> Result<SequenceStore> {
    let rows = table.rows();
    let store = SequenceStore::from_columns(table.columns)?.with_labels(table.labels);
    info!(sequences = store.len(), length = rows, "sequences loaded");
    Ok(store)
}
