//! Text cleaning of extracted patent text, the batch stage that feeds the
//! corpus loader.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::publish::write_file_atomic;
use crate::error::Result;

/// English stop words removed by [`CleanContext::default`]
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "few", "for", "from", "further", "had", "hadn", "has",
    "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll",
    "m", "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn", "no", "nor",
    "not", "now", "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "re", "s", "same", "shan", "she", "should", "shouldn",
    "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "we", "were", "weren", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won", "wouldn", "y", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Shared, read-only settings of every cleaning call.
///
/// Built once and passed by reference; rayon workers share it without
/// synchronization.
#[derive(Debug, Clone)]
pub struct CleanContext {
    stop_words: HashSet<String>,
    min_token_len: usize,
}

impl Default for CleanContext {
    fn default() -> Self {
        Self::new(ENGLISH_STOP_WORDS.iter().copied(), 2)
    }
}

impl CleanContext {
    pub fn new<I, S>(stop_words: I, min_token_len: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
            min_token_len,
        }
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    pub fn min_token_len(&self) -> usize {
        self.min_token_len
    }

    #[inline]
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Clean one text.
    ///
    /// Whitespace-separated tokens lose surrounding punctuation; purely
    /// alphabetic tokens of at least `min_token_len` characters are kept,
    /// lowercased, unless they are stop words. The result is space-joined.
    pub fn clean_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() / 2);
        for raw in text.split_whitespace() {
            let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if token.chars().count() < self.min_token_len || !token.chars().all(char::is_alphabetic) {
                continue;
            }
            let token = token.to_lowercase();
            if self.is_stop_word(&token) {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&token);
        }
        out
    }
}

/// Result of [`batch_clean`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub cleaned: usize,
    pub skipped: usize,
}

enum Outcome {
    Cleaned,
    Skipped,
}

fn clean_file(file: &Path, dest_dir: &Path, ctx: &CleanContext, overwrite: bool) -> Result<Outcome> {
    let Some(name) = file.file_name() else {
        return Ok(Outcome::Skipped);
    };
    let dest = dest_dir.join(name);
    if !overwrite && dest.exists() {
        debug!(file = %dest.display(), "present, skipping");
        return Ok(Outcome::Skipped);
    }
    let bytes = fs::read(file)?;
    let cleaned = ctx.clean_text(&String::from_utf8_lossy(&bytes));
    write_file_atomic(&dest, |f| {
        use std::io::Write;
        f.write_all(cleaned.as_bytes())?;
        Ok(())
    })?;
    debug!(file = %dest.display(), "cleaned");
    Ok(Outcome::Cleaned)
}

/// Clean every `*.txt` file directly inside `src_dir` into `dest_dir`,
/// keeping file names.
///
/// Files are processed in parallel. With `overwrite == false` existing
/// outputs are left untouched. The first failing file aborts the batch.
pub fn batch_clean(src_dir: &Path, dest_dir: &Path, ctx: &CleanContext, overwrite: bool) -> Result<CleanSummary> {
    let start = Instant::now();
    fs::create_dir_all(dest_dir)?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(src_dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();

    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|file| clean_file(file, dest_dir, ctx, overwrite))
        .collect::<Result<_>>()?;

    let mut summary = CleanSummary::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Cleaned => summary.cleaned += 1,
            Outcome::Skipped => summary.skipped += 1,
        }
    }
    info!(
        cleaned = summary.cleaned,
        skipped = summary.skipped,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch clean done"
    );
    Ok(summary)
}
