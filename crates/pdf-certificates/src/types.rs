use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Row {index} is out of range ({len} rows loaded)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("PDF has no pages")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, CertificateError>;

/// One certificate recipient, as read from a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub class: String,
    /// Award type ("TIPAS" column), printed as the headline.
    pub kind: String,
    pub comment: String,
    /// City and year line. Filled with `"<city>, <year>"` when blank.
    pub year: String,
}

/// The five text fields drawn on every certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Kind,
    Name,
    Class,
    Comment,
    Year,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Kind,
        Field::Name,
        Field::Class,
        Field::Comment,
        Field::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Kind => "type",
            Field::Name => "name",
            Field::Class => "class",
            Field::Comment => "comment",
            Field::Year => "year",
        }
    }

    /// Font weight used for this field.
    pub fn font_role(self) -> FontRole {
        match self {
            Field::Kind => FontRole::Bold,
            Field::Name | Field::Class => FontRole::Regular,
            Field::Comment | Field::Year => FontRole::Light,
        }
    }
}

impl Record {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Kind => &self.kind,
            Field::Name => &self.name,
            Field::Class => &self.class,
            Field::Comment => &self.comment,
            Field::Year => &self.year,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
    Light,
}

/// How the batch is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputMode {
    /// One multi-page PDF, pages in row order
    Single,
    /// Zip archive with one single-page PDF per record
    #[default]
    Zip,
}
