//! Validation orchestration: resolve the two inputs, compile the schema,
//! and check the document.
//!
//! The flow is deliberately a single pass with no retries: both inputs are
//! resolved up front (fail fast on a bad path), the schema is compiled once,
//! and one validation call produces the verdict.

use crate::error::{ArgRole, Result};
use crate::http_client::{AsyncHttpClient, HttpClientConfig};
use crate::libxml2::{LibXml2Wrapper, ValidationVerdict, XmlSchemaPtr};
use crate::source::InputSource;

pub struct Validator {
    libxml2: LibXml2Wrapper,
    http: AsyncHttpClient,
}

impl Validator {
    pub fn new() -> Result<Self> {
        Self::with_http_config(HttpClientConfig::default())
    }

    pub fn with_http_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self {
            libxml2: LibXml2Wrapper::new(),
            http: AsyncHttpClient::new(config)?,
        })
    }

    /// Validate `xml` against `schema`.
    ///
    /// Returns the verdict (valid or invalid with diagnostics) on a
    /// completed run; any missing file, failed download, malformed schema,
    /// or non-well-formed document surfaces as an error instead.
    pub async fn validate(
        &self,
        xml: &InputSource,
        schema: &InputSource,
    ) -> Result<ValidationVerdict> {
        xml.check_readable(ArgRole::XmlFile)?;
        schema.check_readable(ArgRole::SchemaFile)?;

        let compiled = self.load_schema(schema).await?;

        let xml_data = xml.load(ArgRole::XmlFile, &self.http).await?;
        self.libxml2
            .validate_document(&compiled, &xml_data, &xml.display_name())
    }

    /// Compile the schema from its source.
    ///
    /// Local schemas are compiled by path so relative `xs:include` and
    /// `xs:import` references resolve; remote schemas are fetched and
    /// compiled from memory.
    async fn load_schema(&self, schema: &InputSource) -> Result<XmlSchemaPtr> {
        match schema {
            InputSource::Local(_) => self
                .libxml2
                .parse_schema_from_file(&schema.display_name()),
            InputSource::Remote(url) => {
                let data = schema.load(ArgRole::SchemaFile, &self.http).await?;
                self.libxml2.parse_schema_from_memory(&data, url)
            }
        }
    }
}
