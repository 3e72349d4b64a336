//! Flat tabular export: one row per record, every record field plus the
//! derived numeric price.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use arbscout_core::{Marketplace, ProductRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::price::parse_price;

/// One exported row. Column order follows field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub source: Marketplace,
    pub title: String,
    pub price: String,
    pub price_numeric: Option<f64>,
    pub url: Option<String>,
    pub moq: Option<String>,
    pub seller_name: Option<String>,
    pub seller_years: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl From<&ProductRecord> for CsvRow {
    fn from(record: &ProductRecord) -> Self {
        Self {
            source: record.source(),
            title: record.title().to_string(),
            price: record.price().to_string(),
            price_numeric: parse_price(record.price()),
            url: record.url().map(str::to_string),
            moq: record.moq().map(str::to_string),
            seller_name: record.seller_name().map(str::to_string),
            seller_years: record.seller_years().map(str::to_string),
            captured_at: record.captured_at(),
        }
    }
}

/// Writes a header row followed by one row per record.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if serialization or the underlying writer
/// fails.
pub fn write_csv<W: Write>(records: &[ProductRecord], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports `records` to `dir/file_name`, creating `dir` if needed.
///
/// Returns `Ok(None)` without touching the filesystem when there is nothing
/// to export.
///
/// # Errors
///
/// Returns [`ReportError::OutputDir`] if the directory cannot be created,
/// [`ReportError::Io`] if the file cannot be created, and
/// [`ReportError::Csv`] if a row cannot be written.
pub fn export_csv(
    records: &[ProductRecord],
    dir: &Path,
    file_name: &str,
) -> Result<Option<PathBuf>, ReportError> {
    if records.is_empty() {
        tracing::warn!("no records to export");
        return Ok(None);
    }

    std::fs::create_dir_all(dir).map_err(|source| ReportError::OutputDir {
        path: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(file_name);
    let file = File::create(&path)?;
    write_csv(records, file)?;

    tracing::info!(path = %path.display(), rows = records.len(), "exported records");
    Ok(Some(path))
}

/// Reads an export back into rows.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the file cannot be opened or a row does
/// not deserialize.
pub fn read_csv(path: &Path) -> Result<Vec<CsvRow>, ReportError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr.deserialize().collect::<Result<Vec<CsvRow>, _>>()?;
    Ok(rows)
}

/// `product_research_<term>_<YYYYmmdd_HHMMSS>.csv`, with the term reduced to
/// lowercase ASCII alphanumerics joined by underscores.
#[must_use]
pub fn export_file_name(search_term: &str, at: DateTime<Utc>) -> String {
    let slug = search_term
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    let slug = if slug.is_empty() { "search".to_string() } else { slug };
    format!("product_research_{slug}_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_slugs_the_term() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            export_file_name("Wireless  Earbuds (Pro)", at),
            "product_research_wireless_earbuds_pro_20260304_050607.csv"
        );
    }

    #[test]
    fn file_name_falls_back_for_symbol_only_terms() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            export_file_name("???", at),
            "product_research_search_20260101_000000.csv"
        );
    }

    #[test]
    fn write_csv_has_header_and_numeric_column() {
        let records = vec![ProductRecord::new(Marketplace::Retail, "Earbuds", "$1,024.50").unwrap()];
        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("source,title,price,price_numeric,url,moq,seller_name,seller_years,captured_at")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("retail,Earbuds,\"$1,024.50\",1024.5,,,,,"));
    }
}
