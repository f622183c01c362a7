//! # xml-validate Library
//!
//! Validate a single XML document against an XSD schema. Inputs may be
//! local files or HTTP(S) URLs; the XML Schema validation itself is
//! delegated to libxml2 through a safe FFI wrapper.

pub mod cli;
pub mod error;
pub mod http_client;
pub mod libxml2;
pub mod output;
pub mod source;
pub mod validator;

pub use cli::Cli;
pub use error::{ArgRole, Result, ValidationError};
pub use http_client::{AsyncHttpClient, FetchedDocument, HttpClientConfig};
pub use libxml2::{LibXml2Wrapper, ValidationVerdict, XmlSchemaPtr};
pub use output::Output;
pub use source::InputSource;
pub use validator::Validator;
