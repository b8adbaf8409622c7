//! Output formatting for text vs JSON rendering
//!
//! Subcommand handlers build a payload and hand it to [`OutputWriter`];
//! format switching happens only here.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes CLI payloads to stdout in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// `Text` delegates to [`Render::render_text`]; `Json` writes pretty JSON
    /// followed by a newline.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Human-readable text rendering, implemented next to `Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Probe {
        suite: String,
        scenarios: u32,
    }

    impl Render for Probe {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "{} ({} scenarios)", self.suite, self.scenarios)
        }
    }

    fn probe() -> Probe {
        Probe {
            suite: "templates".to_owned(),
            scenarios: 11,
        }
    }

    #[test]
    fn text_format_uses_render() {
        let mut buf = Vec::new();
        OutputWriter::new(OutputFormat::Text)
            .render_to(&probe(), &mut buf)
            .expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "templates (11 scenarios)\n");
    }

    #[test]
    fn json_format_is_pretty_and_newline_terminated() {
        let mut buf = Vec::new();
        OutputWriter::new(OutputFormat::Json)
            .render_to(&probe(), &mut buf)
            .expect("render");
        let out = String::from_utf8(buf).expect("utf8");
        assert!(out.ends_with("}\n"));
        assert!(out.contains("\n  \"suite\""));

        let parsed: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(parsed["scenarios"], 11);
    }
}
