//! Append-only request journal
//!
//! Newline-delimited JSON, one record per line. Writes are serialized under
//! a mutex and flushed before the append returns; readers open a fresh
//! handle so they never contend with the hot path.

use rampart_core::{JournalError, RequestRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only journal of every inspected request.
pub struct Journal {
    path: PathBuf,
    writer: Mutex<File>,
}

impl Journal {
    /// Open (or create) the journal file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| JournalError::Open {
                    path: path.display().to_string(),
                    source: e,
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| JournalError::Open {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Append one record as a single line and flush before returning.
    pub fn append(&self, record: &RequestRecord) -> Result<(), JournalError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.writer.lock().map_err(|_| JournalError::LockPoisoned)?;
        file.write_all(line.as_bytes())
            .map_err(JournalError::Append)?;
        file.flush().map_err(JournalError::Append)?;
        Ok(())
    }

    /// Load every record, skipping malformed lines silently. A missing file
    /// reads as empty.
    pub fn load_all(&self) -> Result<Vec<RequestRecord>, JournalError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(JournalError::Open {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => continue,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<RequestRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed journal line");
                }
            }
        }
        Ok(records)
    }

    /// Path the journal writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::Verdict;
    use std::collections::BTreeMap;
    use std::io::Write as _;

    fn record(url: &str, verdict: Verdict, score: Option<f64>) -> RequestRecord {
        RequestRecord {
            ts: 1_700_000_000.0,
            method: "GET".into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: String::new(),
            verdict,
            reason: match score {
                Some(s) => format!("ML:{} (high)", s),
                None => "SIG:SQLI_UNION_SELECT".into(),
            },
            score,
        }
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::open(dir.path().join("requests.jsonl")).unwrap();

        let blocked = record("/search?q=x", Verdict::Blocked, None);
        let safe = record("/about", Verdict::Safe, Some(0.1));
        journal.append(&blocked).unwrap();
        journal.append(&safe).unwrap();

        let loaded = journal.load_all().unwrap();
        assert_eq!(loaded, vec![blocked, safe]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let journal = Journal::open(&path).unwrap();
        journal.append(&record("/a", Verdict::Blocked, None)).unwrap();

        {
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(f, "{{not json").unwrap();
            writeln!(f).unwrap();
        }
        journal.append(&record("/b", Verdict::Alert, Some(0.6))).unwrap();

        let loaded = journal.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].url, "/a");
        assert_eq!(loaded[1].url, "/b");
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let journal = Journal::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(journal.load_all().unwrap().is_empty());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dataset/requests.jsonl");
        let journal = Journal::open(&path).unwrap();
        journal.append(&record("/x", Verdict::Logged, Some(0.3))).unwrap();
        assert_eq!(journal.load_all().unwrap().len(), 1);
    }

    #[test]
    fn append_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let journal =
            std::sync::Arc::new(Journal::open(dir.path().join("requests.jsonl")).unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let journal = journal.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..25 {
                    let rec = record(&format!("/w{}/{}", i, j), Verdict::Alert, Some(0.6));
                    journal.append(&rec).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // Every line must parse back: interleaving never corrupts lines.
        assert_eq!(journal.load_all().unwrap().len(), 200);
    }
}
