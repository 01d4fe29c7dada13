//! Text protocol spoken by the validator on stdout and stderr.
//!
//! Both channels use the same line grammar:
//! - `[...]` is a diagnostic message,
//! - `result=<token>` carries the final status token,
//! - anything else is noise.

/// Prefix of the line carrying the final status token.
pub const RESULT_PREFIX: &str = "result=";

/// Prefix of diagnostic lines.
pub const DIAGNOSTIC_PREFIX: char = '[';

/// A classified validator output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A diagnostic to surface to the caller.
    Diagnostic(String),
    /// The final status token, prefix removed.
    Status(String),
    /// Anything else (JVM banners, stack traces, progress output).
    Other(String),
}

/// Remove every carriage return and line feed from a raw line.
#[must_use]
pub fn strip_line_ending(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Classify a single raw line (with or without its line ending).
#[must_use]
pub fn classify(raw: &str) -> Line {
    let line = strip_line_ending(raw);
    if line.starts_with(DIAGNOSTIC_PREFIX) {
        Line::Diagnostic(line)
    } else if let Some(token) = line.strip_prefix(RESULT_PREFIX) {
        Line::Status(token.to_owned())
    } else {
        Line::Other(line)
    }
}

/// Classify raw bytes read from a pipe. Invalid UTF-8 is replaced lossily.
#[must_use]
pub fn classify_bytes(raw: &[u8]) -> Line {
    classify(&String::from_utf8_lossy(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_diagnostic() {
        assert_eq!(
            classify("[error] 1:5 cvc-elt.1.a\r\n"),
            Line::Diagnostic("[error] 1:5 cvc-elt.1.a".to_owned())
        );
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify("result=OK\n"), Line::Status("OK".to_owned()));
        assert_eq!(
            classify("result=WITH_ERRORS"),
            Line::Status("WITH_ERRORS".to_owned())
        );
        assert_eq!(classify("result="), Line::Status(String::new()));
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify("Picked up JAVA_TOOL_OPTIONS: -Xmx64m\n"),
            Line::Other("Picked up JAVA_TOOL_OPTIONS: -Xmx64m".to_owned())
        );
        // Prefixes only count at the start of the line.
        assert!(matches!(classify(" [indented]"), Line::Other(_)));
        assert!(matches!(classify("status result=OK"), Line::Other(_)));
    }

    #[test]
    fn test_classify_bytes_lossy() {
        assert_eq!(
            classify_bytes(b"[warn] \xff bad byte\n"),
            Line::Diagnostic("[warn] \u{fffd} bad byte".to_owned())
        );
    }
}
