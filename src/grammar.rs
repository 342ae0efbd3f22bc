use crate::catalog::{Catalog, Id, DOCUMENT_ID};
use crate::definition::DefinitionEngine;
use crate::emit::{emit, OutputSyntax};
use crate::iter::GrammarIter;
use crate::literal::write_quoted;
use crate::mode::{Boundary, BoundaryMode, Choice, Step};
use crate::symbols::SymbolTable;

/// One whitespace-separated token of a rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Raw bytes, written as an escaped quoted literal.
    Quoted(Vec<u8>),
    /// Index of a rule in [`Grammar::rules`].
    Reference(usize),
}

/// A named definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Catalog id the rule stands for
    pub id: Id,
    pub name: String,
    pub value: Vec<Token>,
}

/// Final grammar: definitions plus the document body.
///
/// Rules are ordered by id. Every rule is referenced at least once, and a
/// rule only references rules for strictly shorter substrings, so expansion
/// always terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    body: Vec<Token>,
}

impl Grammar {
    /// Renders the grammar chosen by a finished iteration.
    ///
    /// Each referenced id becomes a rule valued by its best-mode encoding; the
    /// document body likewise uses its best mode.
    pub(crate) fn build(
        text: &[u8],
        catalog: &Catalog,
        engine: &DefinitionEngine,
        symbols: &SymbolTable,
        refcounts: &[u32],
    ) -> Self {
        let mut rule_of = vec![None; catalog.len()];
        let mut ids = Vec::new();
        for (id, &count) in refcounts.iter().enumerate() {
            if count > 0 {
                rule_of[id] = Some(ids.len());
                ids.push(id);
            }
        }

        let flattener = Flattener {
            text,
            catalog,
            engine,
            rule_of: &rule_of,
        };
        let rules = ids
            .iter()
            .map(|&id| Rule {
                id,
                name: symbols.name(id).to_owned(),
                value: flattener.best_tokens(id),
            })
            .collect();
        let grammar = Self {
            rules,
            body: flattener.best_tokens(DOCUMENT_ID),
        };

        debug_assert!(grammar.rules.iter().all(|rule| {
            let expected = engine.get(rule.id).map(|d| d.best_length());
            Some(grammar.render(&rule.value).len()) == expected
        }));
        grammar
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn body(&self) -> &[Token] {
        &self.body
    }

    /// Joins `tokens` with single spaces, quoting literals.
    pub fn render(&self, tokens: &[Token]) -> Vec<u8> {
        let mut out = Vec::new();
        for (k, token) in tokens.iter().enumerate() {
            if k > 0 {
                out.push(b' ');
            }
            match token {
                Token::Quoted(bytes) => write_quoted(&mut out, bytes),
                Token::Reference(rule) => out.extend_from_slice(self.rules[*rule].name.as_bytes()),
            }
        }
        out
    }

    /// Rendered document body.
    pub fn body_text(&self) -> Vec<u8> {
        self.render(&self.body)
    }

    /// Expands the body back to the original bytes.
    pub fn iter(&self) -> GrammarIter<'_> {
        GrammarIter::new(self)
    }

    pub fn expand(&self) -> Vec<u8> {
        self.iter().collect()
    }

    /// Full output under `syntax`.
    pub fn to_bytes<S: OutputSyntax + ?Sized>(&self, syntax: &S) -> Vec<u8> {
        let mut out = Vec::new();
        emit(self, syntax, &mut out).expect("writing to a Vec cannot fail");
        out
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = u8;
    type IntoIter = GrammarIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct Frame<'a> {
    steps: std::slice::Iter<'a, Step>,
    /// Mode of the tokens rendered so far in this frame.
    mode: BoundaryMode,
}

/// Turns substitutions into token lists, splicing inlined encodings.
struct Flattener<'a> {
    text: &'a [u8],
    catalog: &'a Catalog,
    engine: &'a DefinitionEngine,
    rule_of: &'a [Option<usize>],
}

impl<'a> Flattener<'a> {
    fn best_tokens(&self, id: Id) -> Vec<Token> {
        let mode = self
            .engine
            .get(id)
            .expect("rendered ids are defined")
            .best_mode();
        self.tokens(id, mode)
    }

    fn tokens(&self, id: Id, mode: BoundaryMode) -> Vec<Token> {
        let mut out = Vec::new();
        let mut frames = Vec::new();
        self.open(id, mode, false, &mut out, &mut frames);

        while let Some(frame) = frames.last_mut() {
            let Some(&step) = frame.steps.next() else {
                frames.pop();
                continue;
            };
            match step.choice {
                Choice::Reference => {
                    frame.mode.end = Boundary::Symbol;
                    let rule = self.rule_of[step.id].expect("referenced ids have rules");
                    out.push(Token::Reference(rule));
                }
                Choice::Inline(inner) => {
                    let merge =
                        inner.start == Boundary::Quoted && frame.mode.end == Boundary::Quoted;
                    frame.mode.end = inner.end;
                    self.open(step.id, inner, merge, &mut out, &mut frames);
                }
            }
        }
        out
    }

    /// Emits the leading token of `id` under `mode` and queues the rest.
    fn open(
        &self,
        id: Id,
        mode: BoundaryMode,
        merge: bool,
        out: &mut Vec<Token>,
        frames: &mut Vec<Frame<'a>>,
    ) {
        let definition = self.engine.get(id).expect("rendered ids are defined");
        match definition.substitution(mode) {
            None => {
                debug_assert!(definition.is_literal());
                let span = self.catalog.span(id);
                push(out, &self.text[span.offset..span.end()], merge);
            }
            Some(sub) => {
                if sub.start != BoundaryMode::SYMBOL {
                    push(out, &[], merge);
                }
                frames.push(Frame {
                    steps: sub.steps.iter(),
                    mode: sub.start,
                });
            }
        }
    }
}

fn push(out: &mut Vec<Token>, bytes: &[u8], merge: bool) {
    if merge {
        if let Some(Token::Quoted(last)) = out.last_mut() {
            last.extend_from_slice(bytes);
            return;
        }
        debug_assert!(false, "merge without a preceding quoted token");
    }
    out.push(Token::Quoted(bytes.to_vec()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::Compressor;
    use crate::config::Config;
    use crate::document::Document;
    use crate::emit::MacroSyntax;

    fn grammar(content: &[u8]) -> Grammar {
        let config = Config::default();
        let doc = Document::new(content.to_vec(), &config).unwrap();
        let mut compressor = Compressor::new(doc, config).unwrap();
        compressor.run(&MacroSyntax);
        compressor.grammar()
    }

    #[test]
    fn test_render_joins_with_spaces() {
        let g = Grammar {
            rules: vec![Rule {
                id: 7,
                name: "a".into(),
                value: vec![Token::Quoted(b"x\"y".to_vec())],
            }],
            body: vec![
                Token::Quoted(Vec::new()),
                Token::Reference(0),
                Token::Reference(0),
            ],
        };
        assert_eq!(g.body_text(), b"\"\" a a");
        assert_eq!(g.render(&g.rules[0].value), b"\"x\\\"y\"");
        assert_eq!(g.expand(), b"x\"yx\"y");
    }

    #[test]
    fn test_rule_values_match_definition_lengths() {
        let config = Config::default();
        let doc = Document::new(b"abcabcabcabc xyz abcabc xyz".to_vec(), &config).unwrap();
        let mut compressor = Compressor::new(doc, config).unwrap();
        compressor.run(&MacroSyntax);
        let g = compressor.grammar();
        for rule in g.rules() {
            let def = compressor.definition(rule.id).unwrap();
            assert_eq!(g.render(&rule.value).len(), def.best_length());
            assert_eq!(rule.name, compressor.symbols().name(rule.id));
        }
        let doc_len = compressor.definition(DOCUMENT_ID).unwrap().best_length();
        assert_eq!(g.body_text().len(), doc_len);
    }

    #[test]
    fn test_rules_are_referenced_and_shorter() {
        let g = grammar(b"abababab cdcdcdcd abababab");
        let mut used = vec![false; g.rules().len()];
        for tokens in g.rules().iter().map(|r| &r.value).chain(std::iter::once(&g.body)) {
            for token in tokens {
                if let Token::Reference(r) = token {
                    used[*r] = true;
                }
            }
        }
        assert!(used.iter().all(|&u| u));
        assert_eq!(g.expand(), b"abababab cdcdcdcd abababab");
    }

    #[test]
    fn test_no_adjacent_mergeable_literals_in_unrepeated_body() {
        let g = grammar(b"abcdefg");
        assert_eq!(g.body(), &[Token::Quoted(b"abcdefg".to_vec())]);
    }
}
