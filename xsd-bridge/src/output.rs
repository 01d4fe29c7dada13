//! Shared output formatting for validation outcomes.
//!
//! Provides JSON and plain-text formatters for `ValidationOutcome`.
//! Color/terminal formatting is intentionally excluded from this core module;
//! that concern belongs to the CLI layer.

use std::io::Write;

use crate::outcome::ValidationOutcome;

/// Format a `ValidationOutcome` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(outcome: &ValidationOutcome, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ValidationOutcome` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(
    outcome: &ValidationOutcome,
    source: &str,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  XML SCHEMA VALIDATION")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Document:      {source}")?;
    writeln!(writer, "  Status:        {}", outcome.status)?;
    writeln!(writer, "  Diagnostics:   {}", outcome.messages_count())?;
    writeln!(writer)?;

    if !outcome.messages.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  DIAGNOSTICS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for message in &outcome.messages {
            writeln!(writer, "{message}")?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if outcome.valid {
        writeln!(writer, "\u{2713} Document is valid")?;
    } else {
        writeln!(
            writer,
            "\u{2717} Document is invalid (status={})",
            outcome.status
        )?;
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_contract() {
        let outcome = ValidationOutcome::new(false, "WITH_ERRORS", vec!["[error] x".to_owned()]);
        let mut buf = Vec::new();
        write_json(&outcome, &mut buf).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["status"], "WITH_ERRORS");
        assert_eq!(json["messages"][0], "[error] x");
    }

    #[test]
    fn test_human_lists_diagnostics() {
        let outcome = ValidationOutcome::new(
            false,
            "WITH_ERRORS",
            vec!["[error] 1:5 first".to_owned(), "[error] 2:1 second".to_owned()],
        );
        let mut buf = Vec::new();
        write_human(&outcome, "<stdin>", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Document:      <stdin>"));
        assert!(text.contains("DIAGNOSTICS"));
        assert!(text.find("first").unwrap() < text.find("second").unwrap());
        assert!(text.contains("invalid (status=WITH_ERRORS)"));
    }

    #[test]
    fn test_human_valid() {
        let outcome = ValidationOutcome::new(true, "OK", vec![]);
        let mut buf = Vec::new();
        write_human(&outcome, "doc.xml", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Document is valid"));
        assert!(!text.contains("DIAGNOSTICS"));
    }
}
