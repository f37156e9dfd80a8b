use crate::config::ChangelogSettings;
use crate::core::emit::NoteEmitter;
use crate::core::release_notes::{extract_matches, fetch_release_notes};
use crate::core::versions::resolve_latest_minor;
use crate::domain::model::{ReleaseNote, VersionSpec};
use crate::domain::ports::PageFetcher;
use crate::utils::error::Result;
use regex::Regex;
use std::collections::VecDeque;
use std::io::Write;

/// Scans PostgreSQL release-notes pages for paragraphs matching a pattern.
pub struct ChangelogScanner<F: PageFetcher> {
    fetcher: F,
    release_notes_url: String,
    source_url: String,
}

impl<F: PageFetcher> ChangelogScanner<F> {
    pub fn new(fetcher: F, settings: &ChangelogSettings) -> Self {
        Self {
            fetcher,
            release_notes_url: settings.release_notes_url.clone(),
            source_url: settings.source_url.clone(),
        }
    }

    /// Lazily walks the pages selected by `spec`.
    ///
    /// With an explicit minor only that page is read. Otherwise the major page
    /// comes first, then minors `1..latest` in ascending order, where `latest`
    /// is looked up only once the major page is done.
    pub fn scan(&self, spec: &VersionSpec, regex: Regex) -> ReleaseNoteStream<'_, F> {
        let mut pending = VecDeque::new();
        pending.push_back(PendingStep::Page(spec.version_string()));
        if spec.minor.is_none() {
            pending.push_back(PendingStep::ResolveMinors);
        }

        ReleaseNoteStream {
            scanner: self,
            major: spec.major.clone(),
            regex,
            pending,
            buffered: VecDeque::new(),
            pages_scanned: 0,
        }
    }

    /// Scans and writes every match; returns how many notes were emitted.
    pub async fn run<W: Write>(
        &self,
        spec: &VersionSpec,
        regex: Regex,
        emitter: &mut NoteEmitter<W>,
    ) -> Result<usize> {
        let mut stream = self.scan(spec, regex);
        let mut emitted = 0;

        while let Some(note) = stream.next().await? {
            emitter.emit(&note)?;
            emitted += 1;
        }
        emitter.flush()?;

        tracing::info!(
            "Scanned {} page(s), {} matching paragraph(s)",
            stream.pages_scanned(),
            emitted
        );
        Ok(emitted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingStep {
    Page(String),
    ResolveMinors,
}

/// Finite, single-use sequence of matches. Each page is fetched on demand.
pub struct ReleaseNoteStream<'a, F: PageFetcher> {
    scanner: &'a ChangelogScanner<F>,
    major: String,
    regex: Regex,
    pending: VecDeque<PendingStep>,
    buffered: VecDeque<ReleaseNote>,
    pages_scanned: usize,
}

impl<F: PageFetcher> ReleaseNoteStream<'_, F> {
    pub async fn next(&mut self) -> Result<Option<ReleaseNote>> {
        loop {
            if let Some(note) = self.buffered.pop_front() {
                return Ok(Some(note));
            }

            match self.pending.pop_front() {
                None => return Ok(None),
                Some(PendingStep::ResolveMinors) => {
                    let latest = resolve_latest_minor(
                        &self.scanner.fetcher,
                        &self.scanner.source_url,
                        &self.major,
                    )
                    .await?;
                    for minor in 1..latest {
                        self.pending
                            .push_back(PendingStep::Page(format!("{}.{}", self.major, minor)));
                    }
                }
                Some(PendingStep::Page(version)) => self.scan_page(version).await?,
            }
        }
    }

    pub fn pages_scanned(&self) -> usize {
        self.pages_scanned
    }

    async fn scan_page(&mut self, version: String) -> Result<()> {
        let (url, document) = fetch_release_notes(
            &self.scanner.fetcher,
            &self.scanner.release_notes_url,
            &version,
        )
        .await?;
        let matches = extract_matches(&document, &url, &self.regex);

        tracing::debug!("{} matching paragraph(s) in {}", matches.len(), url);
        self.pages_scanned += 1;
        self.buffered
            .extend(matches.into_iter().map(|(url, text)| ReleaseNote {
                version: version.clone(),
                url,
                text,
            }));
        Ok(())
    }
}
