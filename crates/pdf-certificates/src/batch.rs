//! Batch certificate generation
//!
//! Records are rendered strictly in input order. The first failing record
//! aborts the batch and nothing is returned for the records before it.

use crate::constants::{COMBINED_MARKER, TIMESTAMP_FORMAT};
use crate::fonts::FontSet;
use crate::options::LayoutOptions;
use crate::render::{CertificateDocument, Template, compose_certificate, document_bytes, render_overlay};
use crate::types::*;
use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("valid pattern"));
static REPEATED_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid pattern"));

/// A named PDF ready to be written or archived.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CertificateFile {
    /// Write into `dir`, creating it if needed. Returns the written path.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        write_artifact(dir.as_ref(), &self.file_name, &self.bytes).await
    }
}

/// The packaged result of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Number of certificates in the artifact
    pub count: usize,
    pub mode: OutputMode,
}

impl BatchOutput {
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        write_artifact(dir.as_ref(), &self.file_name, &self.bytes).await
    }
}

/// Everything needed to render one run.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub records: Vec<Record>,
    pub template: Template,
    pub layout: LayoutOptions,
    pub fonts: FontSet,
    pub mode: OutputMode,
    pub prefix: String,
    /// Stamped into the artifact name
    pub timestamp: NaiveDateTime,
}

impl BatchJob {
    /// Render one record onto the template as a standalone PDF.
    pub fn certificate(&self, record: &Record) -> Result<Vec<u8>> {
        let overlay = self.overlay(record)?;
        document_bytes(compose_certificate(&self.template, &overlay)?)
    }

    fn overlay(&self, record: &Record) -> Result<Vec<u8>> {
        render_overlay(
            record,
            &self.layout,
            &self.fonts,
            self.template.width(),
            self.template.height(),
        )
    }

    /// Per-record PDFs named `<prefix>_<name>.pdf`, in input order.
    pub fn certificates(&self) -> Result<Vec<CertificateFile>> {
        let stems: Vec<String> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                format!(
                    "{}_{}",
                    self.prefix,
                    safe_file_stem(&record.name, &format!("record_{}", i + 1))
                )
            })
            .collect();

        let mut files = Vec::with_capacity(self.records.len());
        for ((i, record), file_name) in self.records.iter().enumerate().zip(unique_pdf_names(&stems)) {
            log::debug!("Rendering record {} ({})", i + 1, file_name);
            files.push(CertificateFile {
                file_name,
                bytes: self.certificate(record)?,
            });
        }
        Ok(files)
    }

    /// Render the record at `index` as `preview_<name>.pdf`.
    pub fn preview(&self, index: usize) -> Result<CertificateFile> {
        let record = self
            .records
            .get(index)
            .ok_or(CertificateError::RowOutOfRange {
                index,
                len: self.records.len(),
            })?;
        self.layout.validate_for_page(self.template.width())?;

        Ok(CertificateFile {
            file_name: format!("preview_{}.pdf", safe_file_stem(&record.name, "preview")),
            bytes: self.certificate(record)?,
        })
    }

    /// Render every record and package the results.
    pub fn run(&self) -> Result<BatchOutput> {
        self.layout.validate_for_page(self.template.width())?;
        if self.records.is_empty() {
            return Err(CertificateError::Config("Input has no rows".to_string()));
        }

        let stamp = self.timestamp.format(TIMESTAMP_FORMAT);
        log::info!(
            "Generating {} certificates ({:?})",
            self.records.len(),
            self.mode
        );

        match self.mode {
            OutputMode::Single => {
                let mut doc = CertificateDocument::new(&self.template);
                for (i, record) in self.records.iter().enumerate() {
                    log::debug!("Rendering record {}", i + 1);
                    doc.push_page(&self.overlay(record)?)?;
                }
                let count = doc.page_count();
                Ok(BatchOutput {
                    file_name: format!("{}_{}_{}.pdf", self.prefix, COMBINED_MARKER, stamp),
                    bytes: document_bytes(doc.finish()?)?,
                    count,
                    mode: self.mode,
                })
            }
            OutputMode::Zip => {
                let files = self.certificates()?;
                Ok(BatchOutput {
                    file_name: format!("{}_{}.zip", self.prefix, stamp),
                    bytes: zip_files(&files)?,
                    count: files.len(),
                    mode: self.mode,
                })
            }
        }
    }
}

/// Run a batch off the async runtime.
pub async fn generate(job: BatchJob) -> Result<BatchOutput> {
    tokio::task::spawn_blocking(move || job.run()).await?
}

/// Render one row for inspection.
pub async fn preview(job: BatchJob, index: usize) -> Result<CertificateFile> {
    tokio::task::spawn_blocking(move || job.preview(index)).await?
}

/// Turn a recipient name into something usable as a file name.
///
/// Runs of `\ / : * ? " < > |` become `_`, repeated underscores collapse and
/// leading/trailing underscores are dropped. Falls back to `fallback` when
/// nothing is left.
pub fn safe_file_stem(value: &str, fallback: &str) -> String {
    let name = UNSAFE_CHARS.replace_all(value.trim(), "_");
    let name = REPEATED_UNDERSCORES.replace_all(&name, "_");
    let name = name.trim_matches('_');

    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// Append `.pdf`, suffixing `_2`, `_3`, ... until every name is unique.
fn unique_pdf_names(stems: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    stems
        .iter()
        .map(|stem| {
            let mut name = format!("{stem}.pdf");
            let mut n = 1;
            while !used.insert(name.clone()) {
                n += 1;
                name = format!("{stem}_{n}.pdf");
            }
            name
        })
        .collect()
}

fn zip_files(files: &[CertificateFile]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);
        zip.start_file(file.file_name.as_str(), options)?;
        zip.write_all(&file.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

async fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
