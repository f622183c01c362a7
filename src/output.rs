//! Formatting of verdicts and errors for the terminal.
//!
//! Verdicts go to stdout; input and runtime errors go to stderr (the caller
//! decides, this module only formats). Colors are applied only when stdout
//! is a TTY.

use atty;

use crate::error::ValidationError;
use crate::libxml2::ValidationVerdict;
use crate::source::InputSource;

const GREEN: &str = "32";
const RED: &str = "31";
const BOLD: &str = "1";

pub struct Output {
    verbose: bool,
    show_colors: bool,
}

impl Output {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Constructor with explicit color control, for tests and piped output.
    pub fn with_colors(verbose: bool, show_colors: bool) -> Self {
        Self {
            verbose,
            show_colors,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Header naming the validated input: local files are shortened to the
    /// file name, URLs are printed in full on their own line.
    fn header(&self, source: &InputSource) -> String {
        if source.is_remote() {
            format!("The XML from the URL:\n{}", source.short_name())
        } else {
            format!("The XML file: {}", source.short_name())
        }
    }

    /// Render the verdict for a completed validation run.
    pub fn format_verdict(&self, source: &InputSource, verdict: &ValidationVerdict) -> String {
        let mut output = self.header(source);
        output.push('\n');

        match verdict {
            ValidationVerdict::Valid => {
                output.push_str(&self.colorize("is valid.", GREEN));
            }
            ValidationVerdict::Invalid { errors, .. } => {
                output.push_str(&self.colorize("is invalid.", RED));
                if self.verbose {
                    output.push('\n');
                    output.push_str(&self.colorize("Error:", BOLD));
                    for error in errors {
                        output.push_str(&format!("\n  {}", error));
                    }
                }
            }
        }

        output
    }

    /// Render an error that prevented the run from completing.
    ///
    /// Inputs that are not well-formed XML get the short "faulty file" line;
    /// libxml2 internal faults get a hint to re-run verbosely; everything
    /// else (missing files, HTTP failures) is a one-line input error.
    pub fn format_error(&self, error: &ValidationError) -> String {
        match error {
            err if err.is_parse_error() => {
                let mut output = String::from("Faulty XML or XSD file was given.");
                if self.verbose {
                    output.push_str(&format!("\nError: {}", err));
                }
                output
            }
            ValidationError::Internal { .. } => {
                if self.verbose {
                    format!("Error: {}", error)
                } else {
                    "Validation ran into an unexpected error. \
                     Run command with --verbose option for more details"
                        .to_string()
                }
            }
            _ => format!("Error: {}", error),
        }
    }
}
