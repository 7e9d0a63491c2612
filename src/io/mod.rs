//! Tabular input and diagram output.

pub mod table;
pub mod writer;

use clap::ValueEnum;

/// Column separator for both input tables and written diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Separator {
    /// TAB
    #[default]
    #[value(name = "t", alias = "tab")]
    Tab,
    /// Single space; runs of blanks are collapsed when reading
    #[value(name = "s", alias = "space")]
    Space,
    /// Comma
    #[value(name = "c", alias = "comma")]
    Comma,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Tab => '\t',
            Separator::Space => ' ',
            Separator::Comma => ',',
        }
    }

    /// Splits one line into trimmed cells, ignoring a trailing separator.
    pub fn split<'a>(self, line: &'a str) -> Vec<&'a str> {
        let mut cells: Vec<&str> = match self {
            Separator::Space => line.split_whitespace().collect(),
            other => line.split(other.as_char()).map(str::trim).collect(),
        };
        if cells.len() > 1 && cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        cells
    }
}
