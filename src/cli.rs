use clap::Parser;

/// Validate an XML document against an XSD schema
#[derive(Parser, Debug, Clone)]
#[command(name = "xml-validate")]
#[command(about = "Validate an XML document against an XSD schema")]
#[command(version)]
pub struct Cli {
    /// Path or HTTP(S) URL of the XML document to validate
    #[arg(value_name = "XML_FILE")]
    pub xml_file: String,

    /// Path or HTTP(S) URL of the XSD schema to validate against
    #[arg(value_name = "SCHEMA_FILE")]
    pub schema_file: String,

    /// Verbose printout for XML validation errors
    #[arg(short = 'v', long = "verbose", help = "Verbose printout for XML validation errors")]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
