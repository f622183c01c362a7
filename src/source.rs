//! Classification and loading of the two positional inputs.
//!
//! Either argument may be a local filesystem path or an HTTP(S) URL. A
//! `file://` prefix is stripped and treated as a local path. FTP is not
//! supported.

use std::path::{Path, PathBuf};

use crate::error::{ArgRole, Result, ValidationError};
use crate::http_client::AsyncHttpClient;

/// Content types accepted from a remote server, besides anything
/// containing "xml" (servers commonly serve XSDs as text/plain).
const PLAIN_TEXT: &str = "text/plain";

/// One positional input: where the bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Local(PathBuf),
    Remote(String),
}

impl InputSource {
    /// Classify a raw CLI argument as a local path or remote URL.
    pub fn classify(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            InputSource::Remote(arg.to_string())
        } else if let Some(path) = arg.strip_prefix("file://") {
            InputSource::Local(PathBuf::from(path))
        } else {
            InputSource::Local(PathBuf::from(arg))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, InputSource::Remote(_))
    }

    /// The name used in messages and in libxml2 error locations.
    pub fn display_name(&self) -> String {
        match self {
            InputSource::Local(path) => path.display().to_string(),
            InputSource::Remote(url) => url.clone(),
        }
    }

    /// The short name shown in the verdict header (file name without
    /// directories for local inputs, full URL for remote ones).
    pub fn short_name(&self) -> String {
        match self {
            InputSource::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            InputSource::Remote(url) => url.clone(),
        }
    }

    /// Fail fast if a local input does not exist or is not a readable file.
    pub fn check_readable(&self, role: ArgRole) -> Result<()> {
        match self {
            InputSource::Local(path) => {
                if path.is_file() {
                    Ok(())
                } else {
                    Err(invalid_argument(role, path))
                }
            }
            // Remote reachability is only known once the request is made.
            InputSource::Remote(_) => Ok(()),
        }
    }

    /// Read the input's bytes, fetching remote inputs over HTTP.
    ///
    /// Remote responses must advertise an XML (or plain text) Content-Type;
    /// anything else is rejected as an input error rather than handed to the
    /// XML parser.
    pub async fn load(&self, role: ArgRole, http: &AsyncHttpClient) -> Result<Vec<u8>> {
        match self {
            InputSource::Local(path) => {
                tokio::fs::read(path).await.map_err(|err| match err.kind() {
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                        invalid_argument(role, path)
                    }
                    _ => ValidationError::Io(err),
                })
            }
            InputSource::Remote(url) => {
                let fetched = http.fetch(url).await?;
                if fetched.content_type.contains("xml")
                    || fetched.content_type.contains(PLAIN_TEXT)
                {
                    Ok(fetched.data)
                } else {
                    Err(ValidationError::NotXml {
                        url: url.clone(),
                        content_type: fetched.content_type,
                    })
                }
            }
        }
    }
}

fn invalid_argument(role: ArgRole, path: &Path) -> ValidationError {
    ValidationError::InvalidArgument {
        role,
        path: path.display().to_string(),
    }
}
