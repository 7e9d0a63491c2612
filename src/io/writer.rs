use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::diagram::Diagram;
use crate::error::{DxcError, Result};
use crate::io::Separator;

/// One line per window-width level, cells joined by `sep`.
pub fn write_diagram<W: Write>(out: &mut W, diagram: &Diagram, sep: Separator) -> std::io::Result<()> {
    let sep = sep.as_char();
    for row in diagram.rows() {
        let mut cells = row.iter();
        if let Some(first) = cells.next() {
            write!(out, "{first}")?;
            for v in cells {
                write!(out, "{sep}{v}")?;
            }
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Writes `diagram` to `path` (created or truncated), or to standard output.
pub fn save(diagram: &Diagram, path: Option<&Path>, sep: Separator) -> Result<()> {
    match path {
        Some(path) => {
            let target = path.display().to_string();
            let to_err = |source: std::io::Error| DxcError::Write {
                target: target.clone(),
                source,
            };
            let file = File::create(path).map_err(to_err)?;
            let mut out = BufWriter::new(file);
            write_diagram(&mut out, diagram, sep).map_err(to_err)
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write_diagram(&mut out, diagram, sep).map_err(|source| DxcError::Write {
                target: "standard output".to_string(),
                source,
            })
        }
    }
}
