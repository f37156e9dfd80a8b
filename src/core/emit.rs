use crate::domain::model::ReleaseNote;
use crate::utils::error::{Result, ScoutError};
use regex::Regex;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
}

/// Wraps every non-overlapping match in `<b>…</b>`. Uses the filter regex, so it is case-insensitive.
pub fn highlight(text: &str, regex: &Regex) -> String {
    regex.replace_all(text, "<b>${0}</b>").into_owned()
}

enum Sink<W: Write> {
    Text(W),
    Csv(csv::Writer<W>),
}

/// Writes release notes as quote blocks or CSV rows.
pub struct NoteEmitter<W: Write> {
    highlight: Option<Regex>,
    sink: Sink<W>,
}

impl<W: Write> NoteEmitter<W> {
    pub fn new(out: W, format: OutputFormat, highlight: Option<Regex>) -> Self {
        let sink = match format {
            OutputFormat::Text => Sink::Text(out),
            // 與原始輸出一致：不寫標題列
            OutputFormat::Csv => Sink::Csv(
                csv::WriterBuilder::new()
                    .has_headers(false)
                    .terminator(csv::Terminator::CRLF)
                    .from_writer(out),
            ),
        };

        Self { highlight, sink }
    }

    pub fn emit(&mut self, note: &ReleaseNote) -> Result<()> {
        let text = match &self.highlight {
            Some(regex) => highlight(&note.text, regex),
            None => note.text.clone(),
        };

        match &mut self.sink {
            Sink::Csv(writer) => {
                writer.write_record([note.version.as_str(), note.url.as_str(), text.as_str()])?;
            }
            Sink::Text(out) => {
                writeln!(out, "=== Quote from {} ===", note.url)?;
                writeln!(out, "{}", text)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        match &mut self.sink {
            Sink::Csv(writer) => writer.flush()?,
            Sink::Text(out) => out.flush()?,
        }
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        match self.sink {
            Sink::Text(mut out) => {
                out.flush()?;
                Ok(out)
            }
            Sink::Csv(writer) => writer
                .into_inner()
                .map_err(|e| ScoutError::IoError(std::io::Error::other(e.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::release_notes::build_search_regex;

    fn note(text: &str) -> ReleaseNote {
        ReleaseNote {
            version: "14.2".to_string(),
            url: "https://www.postgresql.org/docs/current/static/release-14-2.html".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_highlight_wraps_every_match() {
        let regex = build_search_regex("lock").unwrap();
        assert_eq!(
            highlight("Lock waits on a lock table", &regex),
            "<b>Lock</b> waits on a <b>lock</b> table"
        );
    }

    #[test]
    fn test_highlight_leaves_non_matching_text_alone() {
        let regex = build_search_regex("vacuum").unwrap();
        let text = "Nothing to see here";
        assert_eq!(highlight(text, &regex), text);
        assert_eq!(highlight(&highlight(text, &regex), &regex), text);
    }

    #[test]
    fn test_text_output() {
        let mut emitter = NoteEmitter::new(Vec::new(), OutputFormat::Text, None);
        emitter.emit(&note("Fix a crash")).unwrap();

        let out = String::from_utf8(emitter.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "=== Quote from https://www.postgresql.org/docs/current/static/release-14-2.html ===\nFix a crash\n"
        );
    }

    #[test]
    fn test_csv_output_has_three_fields() {
        let mut emitter = NoteEmitter::new(Vec::new(), OutputFormat::Csv, None);
        emitter.emit(&note("Fix a crash, again")).unwrap();
        emitter.emit(&note("Say \"hello\"")).unwrap();

        let out = emitter.into_inner().unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(out.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 3));
        assert_eq!(&rows[0][0], "14.2");
        assert_eq!(&rows[0][2], "Fix a crash, again");
        assert_eq!(&rows[1][2], "Say \"hello\"");
    }

    #[test]
    fn test_csv_output_with_bold() {
        let regex = build_search_regex("crash").unwrap();
        let mut emitter = NoteEmitter::new(Vec::new(), OutputFormat::Csv, Some(regex));
        emitter.emit(&note("Fix a Crash")).unwrap();

        let out = String::from_utf8(emitter.into_inner().unwrap()).unwrap();
        assert!(out.ends_with(",Fix a <b>Crash</b>\r\n"));
    }

    #[test]
    fn test_csv_rows_end_with_crlf() {
        let mut emitter = NoteEmitter::new(Vec::new(), OutputFormat::Csv, None);
        emitter.emit(&note("one")).unwrap();
        emitter.emit(&note("two")).unwrap();

        let out = String::from_utf8(emitter.into_inner().unwrap()).unwrap();
        assert_eq!(out.matches("\r\n").count(), 2);
        assert_eq!(out.matches('\n').count(), 2);
    }
}
