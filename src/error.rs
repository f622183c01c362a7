use thiserror::Error;

/// Which positional argument an input error refers to.
///
/// The role is part of the user-visible message so that "file not found"
/// points at the right argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRole {
    XmlFile,
    SchemaFile,
}

impl std::fmt::Display for ArgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgRole::XmlFile => write!(f, "XML_FILE"),
            ArgRole::SchemaFile => write!(f, "SCHEMA_FILE"),
        }
    }
}

/// Main application error type covering everything that can go wrong before
/// or during a validation run.
///
/// A document that is well-formed but does not conform to the schema is NOT
/// an error; that outcome is carried by
/// [`ValidationVerdict`](crate::libxml2::ValidationVerdict).
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error(
        "content of the URL ({url}) is not in XML format (Content-Type: {content_type}); make sure the URL is correct"
    )]
    NotXml { url: String, content_type: String },

    #[error("invalid value for {role}: path {path} does not exist or is not readable")]
    InvalidArgument { role: ArgRole, path: String },

    #[error("schema parsing error: {source_name} - {details}")]
    SchemaParse {
        source_name: String,
        details: String,
    },

    #[error("document parsing error: {source_name} - {details}")]
    DocumentParse {
        source_name: String,
        details: String,
    },

    #[error("libxml2 internal error: code {code}")]
    Internal { code: i32 },
}

impl ValidationError {
    /// Whether this error means one of the two inputs was not well-formed XML
    /// (as opposed to missing, unreachable, or a libxml2 fault).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ValidationError::SchemaParse { .. } | ValidationError::DocumentParse { .. }
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;
