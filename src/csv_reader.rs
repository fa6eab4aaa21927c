use anyhow::{Context, Result};
use std::io::{self, Read};

/// Raw CSV contents: a header row plus string cells.
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read CSV data from stdin
pub fn read_csv_from_stdin() -> Result<CsvData> {
    read_csv(io::stdin().lock())
}

pub fn read_csv<R: Read>(reader: R) -> Result<CsvData> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("CSV input has no header row");
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV record {}", i + 1))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    Ok(CsvData { headers, rows })
}
