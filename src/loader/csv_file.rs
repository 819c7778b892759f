use super::TransactionSource;
use crate::error::{AnalysisError, Result};
use crate::record::{Transaction, missing_columns};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads transactions from a CSV file with a header row.
///
/// Files ending in `.gz` are decompressed on the fly.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Box<dyn Read + Send>> {
        let file = BufReader::new(File::open(&self.path)?);
        if self.path.extension().and_then(|e| e.to_str()) == Some("gz") {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }

    /// Blocking read of the whole file.
    pub fn read(&self) -> Result<Vec<Transaction>> {
        debug!(path = %self.path.display(), "Reading CSV");
        read_transactions(self.open()?)
    }
}

#[async_trait]
impl TransactionSource for CsvSource {
    async fn load(&self) -> Result<Vec<Transaction>> {
        self.read()
    }
}

/// Validates the header row and deserializes every record from `reader`.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(AnalysisError::Schema { missing });
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: Transaction = result?;
        rows.push(record);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const SAMPLE: &str = "\
timestamp,location,server_id,table_number,item_name,item_category,price,payment_type
2024-01-01 11:05:00,Downtown,S001,T4,Soda,Beverage,2.99,CASH
2024-01-01 12:30:00,Mall,,T2,Burger,Main,12.99,
";

    #[test]
    fn test_read_transactions() {
        let rows = read_transactions(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].item_name, "Soda");
        assert_eq!(rows[1].server_id, None);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = "timestamp,location,item_name,price\n2024-01-01 11:00:00,Mall,Soda,2.99\n";
        match read_transactions(data.as_bytes()) {
            Err(AnalysisError::Schema { missing }) => assert_eq!(
                missing,
                vec!["server_id", "table_number", "item_category", "payment_type"]
            ),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_padded_headers_load() {
        let data = "\
timestamp, location, server_id, table_number, item_name, item_category, price ,payment_type
2024-01-01 11:05:00,Downtown,S001,T4,Soda,Beverage,2.99,CASH
";
        let rows = read_transactions(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, 2.99);
        assert_eq!(rows[0].location, "Downtown");
    }

    #[test]
    fn test_bad_timestamp_fails() {
        let data = "\
timestamp,location,server_id,table_number,item_name,item_category,price,payment_type
not-a-time,Mall,S1,T1,Soda,Beverage,2.99,CASH
";
        assert!(read_transactions(data.as_bytes()).is_err());
    }

    #[test]
    fn test_gzip_matches_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("pos.csv");
        let gz = dir.path().join("pos.csv.gz");

        std::fs::write(&plain, SAMPLE).unwrap();
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let a = CsvSource::new(&plain).read().unwrap();
        let b = CsvSource::new(&gz).read().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = CsvSource::new("/definitely/not/here.csv").read();
        assert!(matches!(result, Err(AnalysisError::Io(_))));
    }
}
