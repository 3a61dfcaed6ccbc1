use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-sentence domain labels, read-only once loaded.
///
/// File format: line N (0-based) holds the label of sentence N. Blank lines
/// leave that sentence unlabelled; surrounding whitespace is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainTable {
    labels: Vec<Option<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainTableError {
    #[error("cannot read domain file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DomainTable {
    pub fn open(path: &Path) -> Result<Self, DomainTableError> {
        let content = fs::read_to_string(path).map_err(|source| DomainTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let labels = content
            .lines()
            .map(|line| {
                let label = line.trim();
                (!label.is_empty()).then(|| label.to_string())
            })
            .collect();
        Self { labels }
    }

    pub fn label(&self, sentence_id: usize) -> Option<&str> {
        self.labels.get(sentence_id)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_labels_by_line() {
        let table = DomainTable::parse("news\n\n  web \n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.label(0), Some("news"));
        assert_eq!(table.label(1), None);
        assert_eq!(table.label(2), Some("web"));
        assert_eq!(table.label(99), None);
    }

    #[test]
    fn open_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "forum").unwrap();
        writeln!(file, "news").unwrap();
        let table = DomainTable::open(file.path()).unwrap();
        assert_eq!(table.label(1), Some("news"));
    }

    #[test]
    fn open_missing_file_reports_path() {
        let err = DomainTable::open(Path::new("/nonexistent/domains.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/domains.txt"));
    }
}
