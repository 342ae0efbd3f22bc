//! Quoted-literal encoding of raw bytes.

/// Returns the two-character escape for bytes that cannot appear raw.
#[inline]
fn escape(b: u8) -> Option<&'static [u8]> {
    match b {
        b'\n' => Some(b"\\n"),
        b'\t' => Some(b"\\t"),
        b'"' => Some(b"\\\""),
        _ => None,
    }
}

/// Length of `bytes` once quoted and escaped.
pub fn quoted_len(bytes: &[u8]) -> usize {
    bytes.len() + 2 + bytes.iter().filter(|&&b| escape(b).is_some()).count()
}

/// Appends `bytes` to `out` as a quoted, escaped literal.
pub fn write_quoted(out: &mut Vec<u8>, bytes: &[u8]) {
    out.reserve(quoted_len(bytes));
    out.push(b'"');
    for &b in bytes {
        match escape(b) {
            Some(seq) => out.extend_from_slice(seq),
            None => out.push(b),
        }
    }
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_quoted(&mut out, bytes);
        out
    }

    #[test]
    fn test_plain_bytes_pass_through() {
        assert_eq!(quote(b"abc\\x"), b"\"abc\\x\"");
        assert_eq!(quoted_len(b"abc\\x"), 7);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(quote(b"a\nb\t\""), b"\"a\\nb\\t\\\"\"");
        assert_eq!(quoted_len(b"a\nb\t\""), quote(b"a\nb\t\"").len());
    }

    #[test]
    fn test_empty() {
        assert_eq!(quote(b""), b"\"\"");
        assert_eq!(quoted_len(b""), 2);
    }
}
