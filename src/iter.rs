use crate::grammar::{Grammar, Token};

/// Iterator that reconstructs the original bytes by expanding rules.
///
/// Uses a stack of token cursors, one per rule being expanded, so nesting
/// depth never touches the call stack.
pub struct GrammarIter<'a> {
    grammar: &'a Grammar,
    stack: Vec<std::slice::Iter<'a, Token>>,
    literal: std::slice::Iter<'a, u8>,
}

impl<'a> GrammarIter<'a> {
    pub(crate) fn new(grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            stack: vec![grammar.body().iter()],
            literal: [].iter(),
        }
    }
}

impl Iterator for GrammarIter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        loop {
            if let Some(&b) = self.literal.next() {
                return Some(b);
            }
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(Token::Quoted(bytes)) => self.literal = bytes.iter(),
                Some(Token::Reference(rule)) => {
                    let value = &self.grammar.rules()[*rule].value;
                    self.stack.push(value.iter());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compressor::Compressor;
    use crate::config::Config;
    use crate::document::Document;
    use crate::emit::MacroSyntax;

    fn roundtrip(content: &[u8]) -> Vec<u8> {
        let config = Config::default();
        let doc = Document::new(content.to_vec(), &config).unwrap();
        let mut compressor = Compressor::new(doc, config).unwrap();
        compressor.run(&MacroSyntax);
        compressor.grammar().iter().collect()
    }

    #[test]
    fn test_iter_empty() {
        assert_eq!(roundtrip(b""), b"");
    }

    #[test]
    fn test_iter_single() {
        assert_eq!(roundtrip(b"a"), b"a");
    }

    #[test]
    fn test_iter_with_repetition() {
        assert_eq!(roundtrip(b"abab"), b"abab");
        assert_eq!(roundtrip(b"aaaaaaaaaaaaaaaaaaaa"), b"aaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn test_iter_escaped_bytes() {
        let text = b"line \"one\"\n\tline \"one\"\n\t";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_into_iterator() {
        let config = Config::default();
        let doc = Document::new(b"xyzxyz".to_vec(), &config).unwrap();
        let mut compressor = Compressor::new(doc, config).unwrap();
        compressor.run(&MacroSyntax);
        let grammar = compressor.grammar();
        let collected: Vec<u8> = (&grammar).into_iter().collect();
        assert_eq!(collected, b"xyzxyz");
    }
}
