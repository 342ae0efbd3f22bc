use crate::error::{Error, Result};

/// Default symbol alphabet, in allocation order.
pub const DEFAULT_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_";

/// Names the allocator never hands out.
pub const DEFAULT_RESERVED: &[&str] = &["or", "and", "xor"];

/// Tunable knobs of the compressor.
///
/// ```
/// use sufgram::Config;
///
/// let config = Config::default().with_max_dp_depth(8).with_max_iterations(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Largest accepted input, in bytes.
    pub max_doc_len: usize,
    /// Number of ancestor candidates examined per DP position.
    pub max_dp_depth: usize,
    /// Upper bound on fixpoint iterations.
    pub max_iterations: usize,
    /// Fixed-point scale of penalties.
    pub penalty_precision: i64,
    /// Reference count every id starts with before the first iteration.
    pub initial_refcount: u32,
    /// Names that must never be allocated.
    pub reserved: Vec<String>,
    /// Symbol alphabet.
    pub charset: Vec<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_doc_len: 1 << 20,
            max_dp_depth: 4,
            max_iterations: 10,
            penalty_precision: 1 << 20,
            initial_refcount: 16,
            reserved: DEFAULT_RESERVED.iter().map(|s| s.to_string()).collect(),
            charset: DEFAULT_CHARSET.to_vec(),
        }
    }
}

impl Config {
    pub fn with_max_doc_len(mut self, max_doc_len: usize) -> Self {
        self.max_doc_len = max_doc_len;
        self
    }

    pub fn with_max_dp_depth(mut self, depth: usize) -> Self {
        self.max_dp_depth = depth;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_penalty_precision(mut self, precision: i64) -> Self {
        self.penalty_precision = precision;
        self
    }

    pub fn with_initial_refcount(mut self, refcount: u32) -> Self {
        self.initial_refcount = refcount;
        self
    }

    pub fn with_reserved<I, S>(mut self, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved = reserved.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_charset(mut self, charset: &[u8]) -> Self {
        self.charset = charset.to_vec();
        self
    }

    /// Ancestor candidates per position; a zero depth still examines one.
    pub(crate) fn dp_depth(&self) -> usize {
        self.max_dp_depth.max(1)
    }

    /// Checks that the configuration can drive the compressor.
    pub fn validate(&self) -> Result<()> {
        if self.charset.is_empty() {
            return Err(Error::InvalidConfig("symbol charset is empty".into()));
        }
        let mut seen = [false; 256];
        for &ch in &self.charset {
            if !ch.is_ascii_graphic() || ch == b'"' {
                return Err(Error::InvalidConfig(format!(
                    "symbol charset contains unusable byte 0x{ch:02x}"
                )));
            }
            if std::mem::replace(&mut seen[ch as usize], true) {
                return Err(Error::InvalidConfig(format!(
                    "symbol charset repeats '{}'",
                    ch as char
                )));
            }
        }
        if self.penalty_precision <= 0 {
            return Err(Error::InvalidConfig("penalty precision must be positive".into()));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig("at least one iteration is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.charset.len(), 54);
        assert_eq!(config.reserved, vec!["or", "and", "xor"]);
    }

    #[test]
    fn test_rejects_bad_charset() {
        assert!(Config::default().with_charset(b"").validate().is_err());
        assert!(Config::default().with_charset(b"abca").validate().is_err());
        assert!(Config::default().with_charset(b"ab\"").validate().is_err());
        assert!(Config::default().with_charset(b"a b").validate().is_err());
    }

    #[test]
    fn test_rejects_zero_iterations_and_precision() {
        assert!(Config::default().with_max_iterations(0).validate().is_err());
        assert!(Config::default().with_penalty_precision(0).validate().is_err());
    }

    #[test]
    fn test_zero_depth_examines_one_candidate() {
        assert_eq!(Config::default().with_max_dp_depth(0).dp_depth(), 1);
        assert_eq!(Config::default().with_max_dp_depth(6).dp_depth(), 6);
    }
}
