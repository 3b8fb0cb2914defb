use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cache::publish::write_file_atomic;
use crate::corpus::Corpus;
use crate::error::{Result, TopicError};

/// file name of the loaded-corpus cache inside the cache root
pub const DATASET_FILE: &str = "dataset.csv";

/// One row of `dataset.csv`
#[derive(Debug, Serialize, Deserialize)]
struct DatasetRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Text")]
    text: String,
}

/// Every `*.txt` file below `dir`, sorted by path
pub fn txt_files(dir: &Path) -> Result<Vec<PathBuf>> {
    files_with_extension(dir, "txt")
}

/// Every file below `dir` whose extension is `ext`, sorted by path
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

impl Corpus {
    /// Load every `*.txt` file below `dir`.
    ///
    /// The file stem is the document id and the content (invalid UTF-8 replaced)
    /// is the text. Files are read in parallel, documents are ordered by path.
    pub fn from_txt_dir(dir: impl AsRef<Path>) -> Result<Corpus> {
        let dir = dir.as_ref();
        let start = Instant::now();
        let files = txt_files(dir)?;

        let docs: Vec<(String, String)> = files
            .par_iter()
            .map(|path| -> Result<(String, String)> {
                let bytes = fs::read(path)?;
                let id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok((id, String::from_utf8_lossy(&bytes).into_owned()))
            })
            .collect::<Result<_>>()?;

        let mut corpus = Corpus::new();
        for (id, text) in docs {
            if corpus.insert(id.clone(), text).is_some() {
                warn!(id = %id, "duplicate document id, keeping the later file");
            }
        }
        info!(
            documents = corpus.len(),
            dir = %dir.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Read a corpus from a csv with `ID` and `Text` columns
    pub fn from_dataset_csv(path: impl AsRef<Path>) -> Result<Corpus> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut corpus = Corpus::new();
        for row in reader.deserialize() {
            let row: DatasetRow = row?;
            corpus.insert(row.id, row.text);
        }
        Ok(corpus)
    }

    /// Write the corpus as a csv with `ID` and `Text` columns.
    /// The file appears atomically.
    pub fn write_dataset_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file_atomic(path.as_ref(), |file| {
            let mut writer = csv::Writer::from_writer(file);
            for doc in self.iter() {
                writer.serialize(DatasetRow {
                    id: doc.id.to_string(),
                    text: doc.text.to_string(),
                })?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

/// Load the corpus from `cache_root/dataset.csv` when present, otherwise from
/// `txt_dir`, writing the csv for the next run.
///
/// An unreadable `dataset.csv` is reported as cache corruption, never silently
/// rebuilt.
pub fn load_corpus_cached(txt_dir: impl AsRef<Path>, cache_root: impl AsRef<Path>) -> Result<Corpus> {
    let csv_path = cache_root.as_ref().join(DATASET_FILE);
    if csv_path.exists() {
        info!(path = %csv_path.display(), "loading cached corpus");
        return Corpus::from_dataset_csv(&csv_path)
            .map_err(|e| TopicError::corruption(&csv_path, e));
    }
    let corpus = Corpus::from_txt_dir(txt_dir)?;
    corpus.write_dataset_csv(&csv_path)?;
    info!(path = %csv_path.display(), "corpus cached");
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &[u8]) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_txt_files_recursively_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", b"beta text");
        write(dir.path(), "a.txt", b"alpha text");
        write(dir.path(), "sub/c.txt", b"gamma text");
        write(dir.path(), "notes.md", b"ignored");

        let corpus = Corpus::from_txt_dir(dir.path()).unwrap();
        assert_eq!(corpus.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(corpus.text_of("c"), Some("gamma text"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x.txt", b"ok \xff bytes");
        let corpus = Corpus::from_txt_dir(dir.path()).unwrap();
        assert_eq!(corpus.text_of("x"), Some("ok \u{FFFD} bytes"));
    }

    #[test]
    fn missing_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::from_txt_dir(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, TopicError::Io(_)));
    }

    #[test]
    fn dataset_csv_roundtrip_with_quotes_and_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let corpus: Corpus = [("US1", "line one\nline \"two\", three"), ("US2", "")]
            .into_iter()
            .collect();
        let path = dir.path().join(DATASET_FILE);
        corpus.write_dataset_csv(&path).unwrap();

        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("ID,Text"));
        assert_eq!(Corpus::from_dataset_csv(&path).unwrap(), corpus);
    }

    #[test]
    fn cached_loader_reuses_csv() {
        let txts = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write(txts.path(), "p1.txt", b"first");

        let first = load_corpus_cached(txts.path(), cache.path()).unwrap();
        assert!(cache.path().join(DATASET_FILE).is_file());

        // new files are not seen while the cached csv exists
        write(txts.path(), "p2.txt", b"second");
        let second = load_corpus_cached(txts.path(), cache.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn broken_dataset_csv_is_corruption() {
        let txts = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fs::write(cache.path().join(DATASET_FILE), "ID,Text\nUS1,text,extra column\n").unwrap();
        let err = load_corpus_cached(txts.path(), cache.path()).unwrap_err();
        assert!(matches!(err, TopicError::CacheCorruption { .. }));
    }
}
