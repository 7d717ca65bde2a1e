use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use catalchemy_core::TableRows;

use crate::errors::GenerationError;

/// Where exported rows ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTable {
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
}

/// Persists the flat rows of one entity kind.
pub trait CatalogExporter: Send + Sync {
    fn export_rows(&self, rows: &TableRows) -> Result<ExportedTable, GenerationError>;
}

/// Writes `<table>.csv` files into a directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl CatalogExporter for CsvExporter {
    fn export_rows(&self, rows: &TableRows) -> Result<ExportedTable, GenerationError> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{}.csv", rows.kind.table_name()));
        let bytes = write_table_csv(&path, rows)?;
        Ok(ExportedTable {
            path,
            rows: rows.rows.len() as u64,
            bytes,
        })
    }
}

/// Write a table as CSV with a header row in column order.
pub fn write_table_csv(path: &Path, rows: &TableRows) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(rows.columns)?;
    for row in &rows.rows {
        writer.write_record(row)?;
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
    use catalchemy_core::{Brand, Catalog, EntityKind};

    #[test]
    fn writes_header_and_quoted_rows() {
        let dir = std::env::temp_dir().join(format!("catalchemy_csv_{}", uuid::Uuid::new_v4()));
        let catalog = Catalog {
            brands: vec![Brand {
                id: "brand_0000000a".to_string(),
                name: "Cedar, Row".to_string(),
                description: "Layers.".to_string(),
                story: "Began in a loft.".to_string(),
                values: vec!["Repair".to_string(), "Care".to_string()],
                target_audience: "Commuters".to_string(),
            }],
            ..Catalog::default()
        };

        let exporter = CsvExporter::new(&dir);
        let exported = exporter
            .export_rows(&catalog.table_rows(EntityKind::Brand))
            .unwrap();

        assert_eq!(exported.path, dir.join("brands.csv"));
        assert_eq!(exported.rows, 1);
        let contents = std::fs::read_to_string(&exported.path).unwrap();
        assert_eq!(exported.bytes, contents.len() as u64);

        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,description,story,values,target_audience")
        );
        assert_eq!(
            lines.next(),
            Some("brand_0000000a,\"Cedar, Row\",Layers.,Began in a loft.,Repair|Care,Commuters")
        );
    }
}
