//! CSV input source.
//!
//! Reads a price-history export (e.g. an Investing.com "Historical Data"
//! download) into an untyped [`RawTable`]. No coercion happens here; the
//! normalizer owns every type decision.

use crate::domain::errors::AnalysisError;
use crate::domain::market::raw_table::{RawCell, RawTable};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

pub struct CsvSource;

impl CsvSource {
    pub fn read_path(path: &Path) -> Result<RawTable, AnalysisError> {
        info!("Loading CSV from {}", path.display());
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    pub fn read<R: Read>(reader: R) -> Result<RawTable, AnalysisError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut table = RawTable::new(&headers.iter().collect::<Vec<_>>());
        debug!("CSV headers: {:?}", table.headers());

        for result in rdr.records() {
            let record = result?;
            table.push_row(record.iter().map(RawCell::from_text).collect());
        }

        info!("Read {} CSV rows", table.len());
        Ok(table)
    }
}
