use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::corpus::{loader::files_with_extension, Corpus};
use crate::error::Result;

/// Time bucket used to group documents by priority date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// `YYYY`
    #[default]
    Year,
    /// `YYYY-MM`
    Month,
}

impl Granularity {
    #[inline]
    fn prefix_len(self) -> usize {
        match self {
            Granularity::Year => 4,
            Granularity::Month => 7,
        }
    }
}

/// Scraped patent metadata row; columns other than these two are ignored.
#[derive(Debug, Deserialize)]
struct MetadataRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Date_Priority", default)]
    date_priority: Option<String>,
}

/// Priority dates by document id
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    priority_dates: IndexMap<String, String>,
}

impl Metadata {
    /// Read the merged metadata csv.
    /// `Name` holds the pdf file name; its `.pdf` suffix is dropped to get the document id.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut meta = Self::default();
        meta.extend_from_reader(reader)?;
        Ok(meta)
    }

    /// Merge every `*.csv` below `dir` (the per-year scrape output), in path
    /// order. A document listed twice keeps the date of the last file.
    pub fn from_csv_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut meta = Self::default();
        let files = files_with_extension(dir.as_ref(), "csv")?;
        for path in &files {
            let before = meta.len();
            meta.extend_from_reader(std::fs::File::open(path)?)?;
            debug!(path = %path.display(), added = meta.len() - before, "metadata file merged");
        }
        info!(files = files.len(), documents = meta.len(), "metadata loaded");
        Ok(meta)
    }

    /// A merged csv file, or a directory of csv files
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_csv_dir(path)
        } else {
            Self::from_csv(path)
        }
    }

    fn extend_from_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut reader = csv::Reader::from_reader(reader);
        for row in reader.deserialize() {
            let row: MetadataRow = row?;
            let Some(date) = row.date_priority.filter(|d| !d.trim().is_empty()) else {
                continue;
            };
            let id = row.name.strip_suffix(".pdf").unwrap_or(&row.name).to_string();
            self.priority_dates.insert(id, date.trim().to_string());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.priority_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priority_dates.is_empty()
    }

    pub fn priority_date(&self, id: &str) -> Option<&str> {
        self.priority_dates.get(id).map(String::as_str)
    }

    /// Period label of a document, `None` if its date is unknown or too short
    pub fn period(&self, id: &str, granularity: Granularity) -> Option<String> {
        self.priority_date(id)
            .and_then(|date| date.get(..granularity.prefix_len()))
            .map(str::to_string)
    }

    /// Period label for every document, in corpus order
    pub fn periods(&self, corpus: &Corpus, granularity: Granularity) -> Vec<Option<String>> {
        corpus.ids().map(|id| self.period(id, granularity)).collect()
    }
}
