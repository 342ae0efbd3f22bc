use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Byte appended after the content; it must not occur inside it.
pub const TERMINATOR: u8 = 0;

/// Rough per-byte footprint of the index, catalog and DP tables.
const BYTES_PER_POSITION: usize = 96;

/// An immutable input buffer, validated against the configured ceiling.
///
/// The indexed text is the content followed by a single [`TERMINATOR`], which
/// plays the role of the empty suffix.
#[derive(Debug, Clone)]
pub struct Document {
    text: Vec<u8>,
}

impl Document {
    /// Validates `content` and takes ownership of it.
    pub fn new(mut content: Vec<u8>, config: &Config) -> Result<Self> {
        check_len(content.len(), config)?;
        if let Some(offset) = content.iter().position(|&b| b == TERMINATOR) {
            return Err(Error::NullByte { offset });
        }
        content.push(TERMINATOR);
        let doc = Self { text: content };
        log::info!(
            "file_size = {}. Up to {}MB of additional memory will be used.",
            doc.len(),
            doc.estimated_memory_mib()
        );
        Ok(doc)
    }

    /// Reads a whole file, refusing oversized files before reading them.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |source: io::Error| Error::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let meta = fs::metadata(path).map_err(unreadable)?;
        check_len(usize::try_from(meta.len()).unwrap_or(usize::MAX), config)?;
        let content = fs::read(path).map_err(unreadable)?;
        Self::new(content, config)
    }

    /// Reads from a stream, buffering at most one byte past the ceiling.
    ///
    /// An oversized stream is drained without buffering so the error reports
    /// its full length.
    pub fn from_reader<R: Read>(mut reader: R, config: &Config) -> Result<Self> {
        let unreadable = |source: io::Error| Error::Unreadable {
            path: "<stdin>".into(),
            source,
        };
        let mut content = Vec::new();
        let limit = config.max_doc_len as u64 + 1;
        (&mut reader)
            .take(limit)
            .read_to_end(&mut content)
            .map_err(unreadable)?;
        if content.len() > config.max_doc_len {
            let rest = io::copy(&mut reader, &mut io::sink()).map_err(unreadable)?;
            let len = usize::try_from(content.len() as u64 + rest).unwrap_or(usize::MAX);
            return Err(Error::TooLarge {
                len,
                max: config.max_doc_len,
            });
        }
        Self::new(content, config)
    }

    /// Content length, excluding the terminator.
    pub fn len(&self) -> usize {
        self.text.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The content without the terminator.
    pub fn content(&self) -> &[u8] {
        &self.text[..self.len()]
    }

    /// The content followed by the terminator.
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Upper estimate of the working memory, in MiB.
    pub fn estimated_memory_mib(&self) -> usize {
        1 + self.text.len() * BYTES_PER_POSITION / (1 << 20)
    }
}

fn check_len(len: usize, config: &Config) -> Result<()> {
    if len > config.max_doc_len {
        return Err(Error::TooLarge {
            len,
            max: config.max_doc_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_terminator() {
        let doc = Document::new(b"abc".to_vec(), &Config::default()).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.content(), b"abc");
        assert_eq!(doc.text(), b"abc\0");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new(Vec::new(), &Config::default()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.text(), b"\0");
    }

    #[test]
    fn test_rejects_null_byte() {
        let err = Document::new(b"ab\0c".to_vec(), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::NullByte { offset: 2 }));
    }

    #[test]
    fn test_rejects_oversized() {
        let config = Config::default().with_max_doc_len(4);
        assert!(Document::new(b"abcd".to_vec(), &config).is_ok());
        let err = Document::new(b"abcde".to_vec(), &config).unwrap_err();
        assert!(matches!(err, Error::TooLarge { len: 5, max: 4 }));
    }

    #[test]
    fn test_reader_reports_full_oversized_length() {
        let config = Config::default().with_max_doc_len(3);
        let input: &[u8] = b"abcdefgh";
        let err = Document::from_reader(input, &config).unwrap_err();
        assert!(matches!(err, Error::TooLarge { len: 8, max: 3 }));
        assert!(Document::from_reader(&b"abc"[..], &config).is_ok());
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let err = Document::from_path("/definitely/not/here", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Unreadable { .. }));
    }
}
