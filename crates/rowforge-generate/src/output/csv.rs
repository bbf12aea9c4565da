use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::generators::Row;

/// Write rows as CSV with a header in the given column order.
///
/// Columns missing from a row are written as empty fields. Returns bytes written.
pub fn write_rows_csv(path: &Path, columns: &[String], rows: &[Row]) -> Result<u64, csv::Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(csv::Error::from)?;
    }
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    write_rows(writer, columns, rows)
}

pub fn write_rows<W: Write>(writer: W, columns: &[String], rows: &[Row]) -> Result<u64, csv::Error> {
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(columns)?;

    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).map(|value| value.to_csv()).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::GeneratedValue;

    #[test]
    fn writes_header_then_rows_in_column_order() {
        let mut row = Row::default();
        row.push("name", GeneratedValue::Text("Ana, Silva".to_string()));
        row.push("id", GeneratedValue::Int(1));

        let mut buffer = Vec::new();
        let columns = vec!["id".to_string(), "name".to_string()];
        let bytes = write_rows(&mut buffer, &columns, &[row]).expect("write csv");

        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text, "id,name\n1,\"Ana, Silva\"\n");
        assert_eq!(bytes, text.len() as u64);
    }
}
