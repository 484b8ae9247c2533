use crate::options::ColumnNames;
use crate::types::{CertificateError, Record, Result};
use chrono::Datelike;
use std::path::Path;

/// Load certificate records from a CSV file.
///
/// `city` and `year` fill blank (or absent) year cells.
pub async fn load_records(
    path: impl AsRef<Path>,
    columns: &ColumnNames,
    city: &str,
    year: i32,
) -> Result<Vec<Record>> {
    let path = path.as_ref().to_owned();
    let columns = columns.clone();
    let city = city.to_string();

    let contents = tokio::fs::read(&path).await?;

    let records = tokio::task::spawn_blocking(move || {
        parse_records(contents.as_slice(), &columns, &city, year)
    })
    .await??;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse records from any CSV source.
///
/// Fails with [`CertificateError::MissingColumns`] before reading any row if a
/// required header is absent.
pub fn parse_records(
    source: impl std::io::Read,
    columns: &ColumnNames,
    city: &str,
    year: i32,
) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let find = |label: &str| headers.iter().position(|h| h == label);

    let missing: Vec<String> = columns
        .required()
        .iter()
        .filter(|&&label| find(label).is_none())
        .map(|label| label.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CertificateError::MissingColumns(missing));
    }

    let name_idx = find(columns.name.as_str());
    let class_idx = find(columns.class.as_str());
    let kind_idx = find(columns.kind.as_str());
    let comment_idx = find(columns.comment.as_str());
    let year_idx = find(columns.year.as_str());

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string()
        };

        records.push(Record {
            name: cell(name_idx),
            class: cell(class_idx),
            kind: cell(kind_idx),
            comment: cell(comment_idx),
            year: fill_year(&cell(year_idx), city, year),
        });
    }

    Ok(records)
}

/// Blank values become `"<city>, <year>"`; anything else passes through.
pub fn fill_year(value: &str, city: &str, year: i32) -> String {
    if value.trim().is_empty() {
        format!("{}, {}", city, year)
    } else {
        value.to_string()
    }
}

/// The calendar year of the local clock.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Write a CSV with the expected headers and one example row.
pub async fn write_sample_csv(path: impl AsRef<Path>, columns: &ColumnNames) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        &columns.name,
        &columns.class,
        &columns.kind,
        &columns.comment,
        &columns.year,
    ])?;
    writer.write_record([
        "Jonas Jonaitis",
        "4a",
        "PADĖKA",
        "Už puikų mokymąsi ir aktyvų dalyvavimą olimpiadose",
        "",
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CertificateError::Io(e.into_error()))?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
