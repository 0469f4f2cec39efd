//! Entity file access
//!
//! - Load: read every line at startup; a missing file is an empty table
//! - Append: one line per live insert, opened and closed per call
//! - Rewrite: copy through a transform into `<stem>_temp.<ext>`, then rename
//!   the temp file over the original
//!
//! No fsync is issued. The rename is as atomic as the platform makes it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::codec::LineRecord;
use super::errors::{PersistenceError, PersistenceResult};

/// One entity kind's backing file.
#[derive(Debug, Clone)]
pub struct LineFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl LineFile {
    /// Names `<dir>/<file_name>` and its `_temp` sibling.
    pub fn new(dir: &Path, file_name: &str) -> Self {
        let path = dir.join(file_name);
        let temp_name = match file_name.rsplit_once('.') {
            Some((stem, ext)) => format!("{}_temp.{}", stem, ext),
            None => format!("{}_temp", file_name),
        };
        Self {
            path,
            temp_path: dir.join(temp_name),
        }
    }

    /// Path to the entity file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path used while rewriting
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Reads every record in file order.
    ///
    /// Blank lines are skipped. A line that does not decode fails the whole
    /// load with its 1-based line number.
    pub fn load<R: LineRecord>(&self) -> PersistenceResult<Vec<R>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io("open", &self.path, e)),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| PersistenceError::io("read", &self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = R::decode(&line).map_err(|e| PersistenceError::Malformed {
                path: self.path.clone(),
                line: index + 1,
                reason: e.0,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Appends one record as a new line, creating the file if needed.
    pub fn append<R: LineRecord>(&self, record: &R) -> PersistenceResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PersistenceError::io("open for append", &self.path, e))?;

        let mut line = record.encode();
        line.push('\n');
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| PersistenceError::io("append to", &self.path, e))
    }

    /// Rewrites the file record by record.
    ///
    /// `transform` returns the record to write in place of the one read, or
    /// `None` to drop it. If the file does not exist there is nothing to
    /// rewrite and this is a no-op. On failure the temp file is removed and
    /// the original is left untouched.
    pub fn rewrite<R, F>(&self, transform: F) -> PersistenceResult<()>
    where
        R: LineRecord,
        F: FnMut(R) -> Option<R>,
    {
        if !self.path.exists() {
            return Ok(());
        }

        let result = self.write_temp(transform).and_then(|_| {
            fs::rename(&self.temp_path, &self.path)
                .map_err(|e| PersistenceError::io("replace", &self.path, e))
        });

        if result.is_err() {
            let _ = fs::remove_file(&self.temp_path);
        }
        result
    }

    fn write_temp<R, F>(&self, mut transform: F) -> PersistenceResult<()>
    where
        R: LineRecord,
        F: FnMut(R) -> Option<R>,
    {
        let source = File::open(&self.path).map_err(|e| PersistenceError::io("open", &self.path, e))?;
        let temp = File::create(&self.temp_path)
            .map_err(|e| PersistenceError::io("create", &self.temp_path, e))?;
        let mut writer = BufWriter::new(temp);

        for (index, line) in BufReader::new(source).lines().enumerate() {
            let line = line.map_err(|e| PersistenceError::io("read", &self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = R::decode(&line).map_err(|e| PersistenceError::Malformed {
                path: self.path.clone(),
                line: index + 1,
                reason: e.0,
            })?;
            if let Some(kept) = transform(record) {
                writeln!(writer, "{}", kept.encode())
                    .map_err(|e| PersistenceError::io("write", &self.temp_path, e))?;
            }
        }

        writer
            .flush()
            .map_err(|e| PersistenceError::io("write", &self.temp_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::codec::{DecodeError, Fields};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        label: String,
    }

    impl LineRecord for Row {
        fn encode(&self) -> String {
            format!("{} {}", self.id, self.label)
        }

        fn decode(line: &str) -> Result<Self, DecodeError> {
            let mut fields = Fields::new(line);
            let row = Row {
                id: fields.parse("id")?,
                label: fields.text("label")?.to_string(),
            };
            fields.finish()?;
            Ok(row)
        }
    }

    fn row(id: u32, label: &str) -> Row {
        Row {
            id,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_temp_name_uses_suffix() {
        let file = LineFile::new(Path::new("data"), "Departments.txt");
        assert_eq!(file.path(), Path::new("data/Departments.txt"));
        assert_eq!(file.temp_path(), Path::new("data/Departments_temp.txt"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(dir.path(), "Rows.txt");
        assert!(file.load::<Row>().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(dir.path(), "Rows.txt");

        file.append(&row(1, "a")).unwrap();
        file.append(&row(2, "b")).unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), "1 a\n2 b\n");
        assert_eq!(file.load::<Row>().unwrap(), vec![row(1, "a"), row(2, "b")]);
    }

    #[test]
    fn test_rewrite_updates_and_drops() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(dir.path(), "Rows.txt");
        for (id, label) in [(1, "a"), (2, "b"), (3, "c")] {
            file.append(&row(id, label)).unwrap();
        }

        file.rewrite(|r: Row| match r.id {
            2 => None,
            3 => Some(row(3, "z")),
            _ => Some(r),
        })
        .unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), "1 a\n3 z\n");
        assert!(!file.temp_path().exists());
    }

    #[test]
    fn test_rewrite_without_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(dir.path(), "Rows.txt");
        file.rewrite(|r: Row| Some(r)).unwrap();
        assert!(!file.path().exists());
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(dir.path(), "Rows.txt");
        fs::write(file.path(), "1 a\n\nnot-a-number b\n").unwrap();

        match file.load::<Row>().unwrap_err() {
            PersistenceError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_failed_rewrite_leaves_original() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(dir.path(), "Rows.txt");
        fs::write(file.path(), "1 a\nbroken\n").unwrap();

        assert!(file.rewrite(|r: Row| Some(r)).is_err());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "1 a\nbroken\n");
        assert!(!file.temp_path().exists());
    }

    #[test]
    fn test_append_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let file = LineFile::new(&dir.path().join("absent"), "Rows.txt");
        let err = file.append(&row(1, "a")).unwrap_err();
        assert_eq!(err.code(), "CAMPUS_IO_ERROR");
    }
}
