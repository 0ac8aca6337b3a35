//! Log redaction for patient identifiers.
//!
//! Assessments are keyed to real patients, so formatted log lines are
//! scrubbed before they reach the log sink:
//! - NHS numbers and hospital numbers (MRNs)
//! - Dates of birth written as `dd/mm/yyyy`
//! - Email addresses and UK phone numbers
//! - Report identifiers (`CVD-…`), which link a log line to an exported report
//!
//! Clinical measurements are not identifiers and are left intact.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

/// Default cap on bytes scanned per log line.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const RULES: [(&str, &str); 6] = [
    (r"\bCVD-[0-9a-f]{16}\b", "[REDACTED-REPORT-ID]"),
    (r"(?i)\b(?:MRN|hospital no\.?)[:\s#]*[A-Z]?\d{6,10}\b", "[REDACTED-MRN]"),
    (r"\b\d{3}[ -]?\d{3}[ -]?\d{4}\b", "[REDACTED-NHS]"),
    (r"\b(?:0?[1-9]|[12]\d|3[01])/(?:0?[1-9]|1[0-2])/(?:19|20)\d{2}\b", "[REDACTED-DOB]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (r"(?:\+44\s?7\d{3}|\b07\d{3})\s?\d{3}\s?\d{3}\b", "[REDACTED-PHONE]"),
];

struct Redactor {
    set: RegexSet,
    patterns: Vec<(Regex, &'static str)>,
}

static REDACTOR: OnceLock<Redactor> = OnceLock::new();

fn redactor() -> &'static Redactor {
    REDACTOR.get_or_init(|| Redactor {
        set: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set"),
        patterns: RULES
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("Valid regex"), *r))
            .collect(),
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact patient identifiers, scanning at most `max_bytes` of `input`.
#[must_use]
pub fn sanitize(input: &str, max_bytes: usize) -> String {
    let r = redactor();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut out = prefix.to_string();
    for idx in r.set.matches(prefix).into_iter() {
        let (regex, replacement) = &r.patterns[idx];
        out = regex.replace_all(&out, *replacement).into_owned();
    }
    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// Whether `input` contains anything `sanitize` would redact.
#[must_use]
pub fn contains_identifier(input: &str) -> bool {
    redactor().set.is_match(input)
}

/// A `tracing_subscriber` writer factory that redacts each log line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M, max_bytes: usize) -> Self {
        Self { inner, max_bytes }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner
            .write_all(sanitize(&text, self.max_bytes).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line longer than twice the cap is emitted truncated.
        if self.buffer.len() > self.max_bytes.saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
            max_bytes: self.max_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn scrub(input: &str) -> String {
        sanitize(input, DEFAULT_SANITIZE_MAX_BYTES)
    }

    #[test]
    fn test_nhs_number() {
        let out = scrub("Assessing NHS 943 476 5919 now");
        assert!(out.contains("[REDACTED-NHS]"));
        assert!(!out.contains("5919"));
    }

    #[test]
    fn test_mrn() {
        let out = scrub("MRN: 12345678 admitted");
        assert!(out.contains("[REDACTED-MRN]"));
    }

    #[test]
    fn test_date_of_birth() {
        let out = scrub("DOB 21/04/1962");
        assert!(out.contains("[REDACTED-DOB]"));
    }

    #[test]
    fn test_email_and_report_id() {
        let out = scrub("sent CVD-1f3a9c0e42b7d615 to gp@nhs.net");
        assert!(out.contains("[REDACTED-REPORT-ID]"));
        assert!(out.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn test_clinical_values_untouched() {
        let line = "Assessment complete: 10y=18.6%, 5y=9.8%, ldl=1.20 mmol/L, step=3";
        assert!(!contains_identifier(line));
        assert_eq!(scrub(line), line);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        let out = sanitize("ééééé", 3);
        assert_eq!(out, "é [TRUNCATED]");
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_writer_redacts_lines() {
        let capture = Capture::default();
        let make = SanitizingMakeWriter::new(capture.clone(), DEFAULT_SANITIZE_MAX_BYTES);

        let mut writer = make.make_writer();
        writer.write_all(b"patient MRN 1234567\npartial ").expect("write");
        writer.write_all(b"DOB 01/02/1950").expect("write");
        drop(writer);

        let written = String::from_utf8(capture.0.lock().expect("lock").clone()).expect("utf8");
        assert_eq!(written, "patient [REDACTED-MRN]\npartial DOB [REDACTED-DOB]");
    }
}
