use std::process::ExitCode;

use anyhow::Context;

use xml_validate::{Cli, InputSource, Output, Validator};

/// Document is well-formed but does not conform to the schema.
const EXIT_INVALID: u8 = 1;
/// Input or runtime error: missing file, bad URL, malformed schema or
/// document, libxml2 fault. Matches clap's exit code for usage errors.
const EXIT_INPUT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let output = Output::new(cli.verbose);

    let validator = match Validator::new().context("failed to initialize validator") {
        Ok(validator) => validator,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::from(EXIT_INPUT_ERROR);
        }
    };

    let xml = InputSource::classify(&cli.xml_file);
    let schema = InputSource::classify(&cli.schema_file);

    match validator.validate(&xml, &schema).await {
        Ok(verdict) => {
            println!("{}", output.format_verdict(&xml, &verdict));
            if verdict.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_INVALID)
            }
        }
        Err(err) => {
            eprintln!("{}", output.format_error(&err));
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}
