//! Chapter discovery: mapping content paths to (book, chapter) identities.
//!
//! Chapter files live at `bibles/<translation>/BER-<Book>/<Book> <N>.md`.
//! Anything that does not fit that shape (book index pages, notes) is skipped
//! without complaint.

use crate::config::ContentPaths;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Prefix on book directory names.
const BOOK_DIR_PREFIX: &str = "BER-";

/// Manifest entries under this prefix are scripture content.
const BIBLES_PREFIX: &str = "bibles/";

const AUDIO_EXTENSION: &str = "mp3";

static CHAPTER_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+) (\d+)$").expect("valid regex"));

/// Listing of content files, relative to the content root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifest {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub generated: Option<String>,
    #[serde(default)]
    pub total_files: Option<usize>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Source and destination of one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDescriptor {
    /// Book name as written in the chapter filename
    pub book: String,
    /// Chapter number
    pub chapter: u32,
    /// Markdown source
    pub source_path: PathBuf,
    /// Audio output, derived from book and chapter alone
    pub destination_path: PathBuf,
    /// Book directory name without its prefix, for grouping in reports
    pub book_dir: String,
}

impl ChapterDescriptor {
    /// Display label, e.g. "1 Samuel 3".
    pub fn label(&self) -> String {
        format!("{} {}", self.book, self.chapter)
    }
}

/// Criteria for choosing which chapters to process.
#[derive(Debug, Clone, Default)]
pub struct ChapterFilter {
    /// Book name, compared case-insensitively
    pub book: Option<String>,
    /// Exact chapter number
    pub chapter: Option<u32>,
    /// Leave out chapters whose audio already exists
    pub skip_existing: bool,
}

/// Audio filename for a chapter: `1_Samuel_3.mp3`.
pub fn destination_file_name(book: &str, chapter: u32) -> String {
    format!("{}_{}.{}", book.replace(' ', "_"), chapter, AUDIO_EXTENSION)
}

/// Parse a content-root-relative path such as `bibles/BSB/BER-Genesis/Genesis 1.md`.
///
/// Returns `None` for anything that is not a chapter file.
pub fn parse_chapter_path(relative: &str, paths: &ContentPaths) -> Option<ChapterDescriptor> {
    let segments: Vec<&str> = relative.split('/').collect();
    if segments.len() < 4 {
        return None;
    }

    let file_name = segments[segments.len() - 1];
    let dir_name = segments[segments.len() - 2];

    let stem = file_name.strip_suffix(".md")?;
    let caps = CHAPTER_FILE_RE.captures(stem)?;
    let book = caps[1].to_string();
    let chapter = caps[2].parse::<u32>().ok().filter(|n| *n > 0)?;

    let book_dir = dir_name
        .strip_prefix(BOOK_DIR_PREFIX)
        .unwrap_or(dir_name)
        .to_string();

    Some(ChapterDescriptor {
        destination_path: paths.audio_dir.join(destination_file_name(&book, chapter)),
        source_path: paths.root.join(relative),
        book,
        chapter,
        book_dir,
    })
}

/// Read the content manifest. A missing manifest is `None`, not an error.
pub fn load_manifest(path: &Path) -> Result<Option<ContentManifest>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read content manifest {}", path.display()))?;
    let manifest: ContentManifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse content manifest {}", path.display()))?;
    Ok(Some(manifest))
}

/// All chapters, from the manifest when there is one, otherwise from a scan
/// of the bibles directory.
pub fn discover(manifest: Option<&ContentManifest>, paths: &ContentPaths) -> Vec<ChapterDescriptor> {
    match manifest {
        Some(manifest) => chapters_from_manifest(manifest, paths),
        None => {
            log::info!(
                "No content manifest at {}, scanning {}",
                paths.manifest_path.display(),
                paths.bibles_dir.display()
            );
            scan_bibles_dir(paths)
        }
    }
}

fn chapters_from_manifest(manifest: &ContentManifest, paths: &ContentPaths) -> Vec<ChapterDescriptor> {
    log::debug!(
        "Manifest version {}, generated {}: {} files listed, totalFiles {}",
        manifest.version.map_or_else(|| "?".to_string(), |v| v.to_string()),
        manifest.generated.as_deref().unwrap_or("?"),
        manifest.files.len(),
        manifest.total_files.map_or_else(|| "?".to_string(), |n| n.to_string()),
    );
    manifest
        .files
        .iter()
        .filter(|f| f.starts_with(BIBLES_PREFIX) && f.ends_with(".md"))
        .filter_map(|f| {
            let parsed = parse_chapter_path(f, paths);
            if parsed.is_none() {
                log::trace!("Not a chapter file: {}", f);
            }
            parsed
        })
        .collect()
}

/// Walk the bibles directory for `BER-*` book directories and parse the
/// markdown files directly inside each.
pub fn scan_bibles_dir(paths: &ContentPaths) -> Vec<ChapterDescriptor> {
    if !paths.bibles_dir.is_dir() {
        return Vec::new();
    }

    let book_dirs = WalkDir::new(&paths.bibles_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(BOOK_DIR_PREFIX))
        });

    let mut chapters = Vec::new();
    for book_dir in book_dirs {
        let files = WalkDir::new(book_dir.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file());

        for file in files {
            let Some(relative) = relative_content_path(file.path(), &paths.root) else {
                continue;
            };
            if let Some(chapter) = parse_chapter_path(&relative, paths) {
                chapters.push(chapter);
            }
        }
    }

    chapters
}

/// Path relative to the content root, with `/` separators.
fn relative_content_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

/// Keep the chapters matching every criterion, in their original order.
pub fn filter_chapters<'a>(
    chapters: &'a [ChapterDescriptor],
    filter: &ChapterFilter,
) -> Vec<&'a ChapterDescriptor> {
    chapters
        .iter()
        .filter(|ch| {
            filter
                .book
                .as_ref()
                .is_none_or(|book| ch.book.to_lowercase() == book.to_lowercase())
        })
        .filter(|ch| filter.chapter.is_none_or(|n| ch.chapter == n))
        .filter(|ch| !filter.skip_existing || !ch.destination_path.exists())
        .collect()
}

/// Chapter counts per book directory, in order of first appearance.
pub fn count_by_book_dir(chapters: &[&ChapterDescriptor]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for chapter in chapters {
        match counts.iter_mut().find(|(dir, _)| *dir == chapter.book_dir) {
            Some((_, count)) => *count += 1,
            None => counts.push((chapter.book_dir.clone(), 1)),
        }
    }
    counts
}
