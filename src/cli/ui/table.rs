use std::fmt::{self, Display, Formatter};

use tabled::{builder::Builder, settings::Style as TableStyle};

use super::painter::Painter;

/// Rows of pre-painted cells rendered as a rounded table.
#[derive(Debug, Default)]
pub(crate) struct Table {
    records: Vec<Vec<String>>,
}

impl Table {
    /// Starts a table whose first row is the given header.
    pub(crate) fn with_header<'a>(header: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            records: vec![header.into_iter().map(str::to_string).collect()],
        }
    }

    /// Builds a two-column table of muted field names and their values.
    pub(crate) fn fields(painter: &Painter, fields: Vec<(&str, String)>) -> Self {
        let mut table = Self::with_header(["field", "value"]);
        for (field, value) in fields {
            table.push(vec![painter.muted(field), value]);
        }
        table
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.records.push(row);
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        for record in &self.records {
            builder.push_record(record);
        }
        let mut table = builder.build();
        table.with(TableStyle::rounded());
        write!(f, "{table}")
    }
}
