use std::fmt::{self, Display, Formatter};

use crate::cli::encode::EncodedRecords;

use super::painter::Painter;
use super::table::Table;

/// Renders encoded records as uppercase hexadecimal.
pub(crate) struct EncodedRecordsView<'a> {
    records: &'a EncodedRecords,
    painter: &'a Painter,
}

impl<'a> EncodedRecordsView<'a> {
    pub(crate) fn new(records: &'a EncodedRecords, painter: &'a Painter) -> Self {
        Self { records, painter }
    }
}

impl Display for EncodedRecordsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let painter = self.painter;
        write!(
            f,
            "{} {}",
            painter.heading("Service state record:"),
            painter.value(hex::encode_upper(self.records.service_state()))
        )?;

        let mut table = Table::with_header(["id", "snapshot record"]);
        let mut any = false;
        for (id, record) in self.records.glasses() {
            table.push(vec![painter.value(id), hex::encode_upper(record)]);
            any = true;
        }
        if any {
            write!(f, "\n{table}")?;
        }
        Ok(())
    }
}
