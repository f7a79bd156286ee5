//! Per-chapter audio generation: read, extract, build SSML, synthesize, write.
//!
//! Chapters are processed one at a time. A problem with one chapter is recorded
//! as its outcome and never stops the batch.

use crate::config::{ContentPaths, RunSettings};
use crate::discovery::ChapterDescriptor;
use crate::text::{build_ssml, extract_verses, narration_text};
use indicatif::{ProgressBar, ProgressStyle};
use tts_client::SpeechSynthesizer;

/// What happened to one chapter.
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterOutcome {
    /// Audio written to the destination
    Generated { bytes: usize },
    /// Dry run: everything up to synthesis succeeded
    Previewed {
        title: String,
        verses: usize,
        narration_chars: usize,
    },
    /// No verses in the source; nothing to narrate
    NoVerses,
    ReadFailed(String),
    SynthesisFailed(String),
    WriteFailed(String),
}

impl ChapterOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ChapterOutcome::ReadFailed(_)
                | ChapterOutcome::SynthesisFailed(_)
                | ChapterOutcome::WriteFailed(_)
        )
    }
}

/// Totals for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub empty: usize,
}

impl GenerationSummary {
    fn record(&mut self, outcome: &ChapterOutcome) {
        if outcome.is_failure() {
            self.failed += 1;
        } else if *outcome == ChapterOutcome::NoVerses {
            self.empty += 1;
        } else {
            self.succeeded += 1;
        }
    }
}

enum Mode<'a> {
    DryRun,
    Synthesize(&'a dyn SpeechSynthesizer),
}

/// Drives chapters through the pipeline.
pub struct Generator<'a> {
    settings: &'a RunSettings,
    paths: &'a ContentPaths,
    mode: Mode<'a>,
}

impl<'a> Generator<'a> {
    /// Generator that synthesizes and writes audio.
    pub fn new(
        settings: &'a RunSettings,
        paths: &'a ContentPaths,
        synthesizer: &'a dyn SpeechSynthesizer,
    ) -> Self {
        Self {
            settings,
            paths,
            mode: Mode::Synthesize(synthesizer),
        }
    }

    /// Generator that stops before any external call.
    pub fn dry_run(settings: &'a RunSettings, paths: &'a ContentPaths) -> Self {
        Self {
            settings,
            paths,
            mode: Mode::DryRun,
        }
    }

    fn is_dry_run(&self) -> bool {
        matches!(self.mode, Mode::DryRun)
    }

    /// Process every chapter in order.
    pub async fn run(&self, chapters: &[&ChapterDescriptor]) -> GenerationSummary {
        let pb = self.progress_bar(chapters.len());
        let mut summary = GenerationSummary {
            total: chapters.len(),
            ..Default::default()
        };

        for chapter in chapters {
            pb.set_message(chapter.label());
            let outcome = self.process_chapter(chapter).await;
            report(&pb, chapter, &outcome);
            summary.record(&outcome);
            pb.inc(1);
        }

        pb.finish_and_clear();
        summary
    }

    /// Run one chapter through the pipeline.
    pub async fn process_chapter(&self, chapter: &ChapterDescriptor) -> ChapterOutcome {
        let content = match tokio::fs::read_to_string(&chapter.source_path).await {
            Ok(content) => content,
            Err(e) => {
                return ChapterOutcome::ReadFailed(format!(
                    "Error reading {}: {}",
                    chapter.source_path.display(),
                    e
                ));
            }
        };

        let extracted = extract_verses(&content);
        if extracted.verses.is_empty() {
            return ChapterOutcome::NoVerses;
        }

        let ssml = build_ssml(
            &extracted.title,
            &extracted.verses,
            &self.settings.voice,
            self.settings.speech_rate,
        );
        log::debug!(
            "{}: {} verses, {} bytes of SSML",
            chapter.label(),
            extracted.verses.len(),
            ssml.len()
        );

        let synthesizer = match self.mode {
            Mode::DryRun => {
                return ChapterOutcome::Previewed {
                    narration_chars: narration_text(&extracted.title, &extracted.verses)
                        .chars()
                        .count(),
                    verses: extracted.verses.len(),
                    title: extracted.title,
                };
            }
            Mode::Synthesize(synthesizer) => synthesizer,
        };

        if let Some(parent) = chapter.destination_path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return ChapterOutcome::WriteFailed(format!(
                    "Error creating {}: {}",
                    parent.display(),
                    e
                ));
            }
        }

        let audio = match synthesizer.synthesize(&ssml, &self.settings.voice).await {
            Ok(audio) => audio,
            Err(e) => return ChapterOutcome::SynthesisFailed(e.to_string()),
        };

        match tokio::fs::write(&chapter.destination_path, &audio).await {
            Ok(()) => ChapterOutcome::Generated { bytes: audio.len() },
            Err(e) => ChapterOutcome::WriteFailed(format!(
                "Error writing {}: {}",
                chapter.destination_path.display(),
                e
            )),
        }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if self.is_dry_run() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        log::debug!("Writing audio to {}", self.paths.audio_dir.display());
        pb
    }
}

fn report(pb: &ProgressBar, chapter: &ChapterDescriptor, outcome: &ChapterOutcome) {
    match outcome {
        ChapterOutcome::Generated { bytes } => {
            log::info!(
                "{} -> {} ({} bytes)",
                chapter.label(),
                chapter.destination_path.display(),
                bytes
            );
        }
        ChapterOutcome::Previewed { title, verses, .. } => {
            let name = chapter
                .destination_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  Would generate: {}", name);
            println!("  Title: {}, Verses: {}", title, verses);
        }
        ChapterOutcome::NoVerses => {
            notice(
                pb,
                format!("No verses found in {}", chapter.source_path.display()),
            );
            log::info!("{}: no verses, skipped", chapter.label());
        }
        ChapterOutcome::ReadFailed(reason)
        | ChapterOutcome::SynthesisFailed(reason)
        | ChapterOutcome::WriteFailed(reason) => {
            notice(pb, format!("{}: FAILED - {}", chapter.label(), reason));
            log::warn!("{}: {}", chapter.label(), reason);
        }
    }
}

/// Print above the progress bar, or straight to stderr when there is none.
fn notice(pb: &ProgressBar, message: String) {
    if pb.is_hidden() {
        eprintln!("{}", message);
    } else {
        pb.println(message);
    }
}
