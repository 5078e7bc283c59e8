// Tabular outputs of the readers.

use crate::reports::*;

/// A row type with a fixed, ordered list of columns.
///
/// The column names are the names of the serialized fields, in the same order.
pub trait Record: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Rows of one record type. The schema is known even when there are no rows.
#[derive(PartialEq, Debug, Clone)]
pub struct Table<R> {
    pub rows: Vec<R>,
}

impl<R: Record> Table<R> {
    pub fn new(rows: Vec<R>) -> Table<R> {
        Table { rows }
    }

    pub fn empty() -> Table<R> {
        Table { rows: Vec::new() }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn to_json(&self) -> ReportResult<JSValue> {
        serde_json::to_value(&self.rows).context(SerializingJsonSnafu {})
    }

    /// Writes the table as a CSV file, with a header line even when the table is empty.
    pub fn write_csv(&self, path: &Path) -> ReportResult<()> {
        let p = path.display().to_string();
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .context(WritingCsvSnafu { path: &p })?;
        wtr.write_record(R::COLUMNS)
            .context(WritingCsvSnafu { path: &p })?;
        for row in self.rows.iter() {
            wtr.serialize(row).context(WritingCsvSnafu { path: &p })?;
        }
        wtr.flush().context(WritingFileSnafu { path: &p })?;
        debug!("write_csv: {} rows written to {}", self.rows.len(), p);
        Ok(())
    }
}
