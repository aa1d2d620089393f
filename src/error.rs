use std::fmt;

/// Failures that abort a build. These only occur before the first page
/// exists (loading the hero, settings or fonts) or when writing the output.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidHero(String),
    Settings(String),
    Font(String),
    Pdf(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidHero(msg) => write!(f, "invalid hero file: {msg}"),
            Error::Settings(msg) => write!(f, "invalid settings: {msg}"),
            Error::Font(msg) => write!(f, "font error: {msg}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::InvalidHero(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Settings(e.to_string())
    }
}

/// Why a single section (or page header) was left out of the document.
/// Never fatal: the rest of the sheet keeps rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    MissingData(String),
    InvalidTable(String),
    HeaderFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingData(msg) => write!(f, "missing data: {msg}"),
            SkipReason::InvalidTable(msg) => write!(f, "invalid table: {msg}"),
            SkipReason::HeaderFailed(msg) => write!(f, "page header failed: {msg}"),
        }
    }
}
