use crate::catalog::{Catalog, Id, DOCUMENT_ID};
use crate::config::Config;
use crate::definition::{Definition, DefinitionEngine, Inputs};
use crate::document::Document;
use crate::emit::OutputSyntax;
use crate::error::{Error, Result};
use crate::grammar::Grammar;
use crate::mode::{BoundaryMode, Choice};
use crate::parents::ParentLinks;
use crate::suffix_array::SuffixIndex;
use crate::symbols::{SymbolAllocator, SymbolTable};

/// Fixpoint driver of the grammar compressor.
///
/// The suffix index, catalog and parent links are built once. Each iteration
/// then reallocates symbols from the current reference counts, recomputes the
/// document's definition (and, transitively, everything it consults) and
/// recounts references in the chosen grammar.
///
/// The loop is a heuristic search: projected lengths are not guaranteed to
/// decrease and can oscillate, so it is bounded by
/// [`Config::max_iterations`]. It stops early only at a true fixed point,
/// where the projected length repeats and the recounted references equal the
/// ones the iteration started from.
///
/// ```
/// use sufgram::{Compressor, Config, Document, MacroSyntax};
///
/// let config = Config::default();
/// let doc = Document::new(b"abcabcabcabc".to_vec(), &config).unwrap();
/// let mut compressor = Compressor::new(doc, config).unwrap();
/// let stats = compressor.run(&MacroSyntax);
///
/// let grammar = compressor.grammar();
/// assert_eq!(grammar.expand(), b"abcabcabcabc");
/// assert_eq!(grammar.to_bytes(&MacroSyntax).len(), stats.output_len);
/// ```
pub struct Compressor {
    config: Config,
    document: Document,
    index: SuffixIndex,
    catalog: Catalog,
    links: ParentLinks,
    allocator: SymbolAllocator,
    symbols: SymbolTable,
    engine: DefinitionEngine,
    refcounts: Vec<u32>,
    projected_len: Option<usize>,
    stable: bool,
    iterations: usize,
    converged: bool,
}

impl Compressor {
    /// Indexes `document`; no iteration runs yet.
    pub fn new(document: Document, config: Config) -> Result<Self> {
        config.validate()?;
        if document.len() > config.max_doc_len {
            return Err(Error::TooLarge {
                len: document.len(),
                max: config.max_doc_len,
            });
        }

        let index = SuffixIndex::build(document.text());
        log::debug!("suffix index built over {} positions", index.len());
        let catalog = Catalog::build(document.text(), &index);
        let links = ParentLinks::build(&catalog, &index);
        let ids = catalog.len();

        Ok(Self {
            allocator: SymbolAllocator::new(&config.charset, config.reserved.iter().cloned()),
            symbols: SymbolTable::default(),
            engine: DefinitionEngine::new(ids, &config),
            refcounts: vec![config.initial_refcount; ids],
            projected_len: None,
            stable: false,
            iterations: 0,
            converged: false,
            config,
            document,
            index,
            catalog,
            links,
        })
    }

    /// Iterates until a fixed point or the iteration budget runs out.
    pub fn run<S: OutputSyntax + ?Sized>(&mut self, syntax: &S) -> CompressionStats {
        let mut last = self.projected_len;
        while self.iterations < self.config.max_iterations {
            let total = self.step(syntax);
            if last == Some(total) && self.stable {
                self.converged = true;
                break;
            }
            last = Some(total);
        }
        if !self.converged {
            log::warn!(
                "no fixed point after {} iterations, keeping the last grammar",
                self.iterations
            );
        }
        self.stats()
    }

    /// Runs one iteration and returns the projected output length.
    pub fn step<S: OutputSyntax + ?Sized>(&mut self, syntax: &S) -> usize {
        self.symbols = self.allocator.assign(&self.refcounts);
        self.engine.clear();

        let inputs = Inputs {
            text: self.document.text(),
            catalog: &self.catalog,
            links: &self.links,
            symbols: &self.symbols,
            refcounts: &self.refcounts,
        };
        self.engine.define(DOCUMENT_ID, &inputs);

        let counts = self.count_references();
        let total = self.projected(&counts, syntax);
        self.stable = counts == self.refcounts;
        self.refcounts = counts;
        self.projected_len = Some(total);
        self.iterations += 1;

        let counters = self.engine.counters();
        log::debug!(
            "iter({}): doc_len = {}, definitions = {}",
            self.iterations,
            total,
            self.definition_count()
        );
        log::debug!(
            "retry_cnt = {}, dp_cnt = {}, backtrace_cnt = {}",
            counters.retries,
            counters.transitions,
            counters.backtrace_steps
        );
        log::debug!(
            "symbols issued = {}, reserved skipped = {}",
            self.allocator.issued(),
            self.allocator.skipped()
        );
        total
    }

    /// Counts symbol references in the grammar chosen by the last iteration.
    ///
    /// References are followed into each referenced definition once; inlined
    /// encodings are walked every time they are spliced in.
    fn count_references(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.catalog.len()];
        let mut visited = vec![false; self.catalog.len()];
        let mut stack = vec![(DOCUMENT_ID, self.defined(DOCUMENT_ID).best_mode())];

        while let Some((id, mode)) = stack.pop() {
            let Some(sub) = self.defined(id).substitution(mode) else {
                continue;
            };
            for step in &sub.steps {
                match step.choice {
                    Choice::Reference => {
                        counts[step.id] += 1;
                        if !std::mem::replace(&mut visited[step.id], true) {
                            stack.push((step.id, self.defined(step.id).best_mode()));
                        }
                    }
                    Choice::Inline(inner) => stack.push((step.id, inner)),
                }
            }
        }
        counts
    }

    fn projected<S: OutputSyntax + ?Sized>(&self, counts: &[u32], syntax: &S) -> usize {
        let definitions: usize = counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(id, _)| {
                syntax.definition_len(self.symbols.name_len(id), self.defined(id).best_length())
            })
            .sum();
        definitions + syntax.body_len(self.defined(DOCUMENT_ID).best_length())
    }

    fn defined(&self, id: Id) -> &Definition {
        self.engine
            .get(id)
            .expect("ids in the chosen grammar are defined")
    }

    /// Materialises the grammar chosen by the last iteration.
    pub fn grammar(&self) -> Grammar {
        assert!(self.iterations > 0, "no iteration has run yet");
        Grammar::build(
            self.document.text(),
            &self.catalog,
            &self.engine,
            &self.symbols,
            &self.refcounts,
        )
    }

    pub fn stats(&self) -> CompressionStats {
        CompressionStats {
            input_len: self.document.len(),
            ids: self.catalog.len(),
            definitions: self.definition_count(),
            iterations: self.iterations,
            converged: self.converged,
            output_len: self.projected_len.unwrap_or(0),
        }
    }

    fn definition_count(&self) -> usize {
        self.refcounts.iter().filter(|&&c| c > 0).count()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> &SuffixIndex {
        &self.index
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn links(&self) -> &ParentLinks {
        &self.links
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Definition of `id` from the last iteration, if the grammar consulted it.
    pub fn definition(&self, id: Id) -> Option<&Definition> {
        self.engine.get(id)
    }

    pub fn refcount(&self, id: Id) -> u32 {
        self.refcounts[id]
    }

    /// Projected output length of the last iteration.
    pub fn projected_len(&self) -> Option<usize> {
        self.projected_len
    }

    /// Whether the last iteration reproduced the reference counts it started from.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Bytes `id` stands for.
    pub fn bytes_of(&self, id: Id) -> &[u8] {
        let span = self.catalog.span(id);
        &self.document.text()[span.offset..span.end()]
    }

    /// Best mode of the document in the last iteration.
    pub fn document_mode(&self) -> BoundaryMode {
        self.defined(DOCUMENT_ID).best_mode()
    }
}

/// Statistics about one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Input length in bytes
    pub input_len: usize,
    /// Distinct substrings catalogued
    pub ids: usize,
    /// Definitions emitted
    pub definitions: usize,
    /// Fixpoint iterations run
    pub iterations: usize,
    /// Whether the loop stopped at a fixed point
    pub converged: bool,
    /// Projected output length in bytes
    pub output_len: usize,
}

impl CompressionStats {
    /// Output size as a percentage of the input size.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_len == 0 {
            0.0
        } else {
            (self.output_len as f64 / self.input_len as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{MacroSyntax, RuleSyntax};

    fn compressor(content: &[u8]) -> Compressor {
        let config = Config::default();
        let doc = Document::new(content.to_vec(), &config).unwrap();
        Compressor::new(doc, config).unwrap()
    }

    #[test]
    fn test_repeated_byte_body_beats_literal() {
        let mut c = compressor(b"aaaaaaaaaa");
        c.run(&MacroSyntax);
        let grammar = c.grammar();
        assert!(grammar.body_text().len() < 12);
        assert_eq!(grammar.expand(), b"aaaaaaaaaa");
    }

    #[test]
    fn test_unrepeated_input_has_no_definitions() {
        let mut c = compressor(b"abcdefg");
        let stats = c.run(&MacroSyntax);
        assert_eq!(stats.definitions, 0);
        assert!(stats.converged);
        let grammar = c.grammar();
        assert!(grammar.rules().is_empty());
        assert_eq!(grammar.body_text(), b"\"abcdefg\"");
    }

    #[test]
    fn test_empty_document() {
        let mut c = compressor(b"");
        let stats = c.run(&MacroSyntax);
        assert_eq!(stats.definitions, 0);
        let grammar = c.grammar();
        assert_eq!(grammar.body_text(), b"\"\"");
        assert_eq!(grammar.to_bytes(&RuleSyntax), b"\"\"\n");
    }

    #[test]
    fn test_projected_length_matches_output() {
        for input in [
            &b"abcabcabcabc"[..],
            b"the quick brown fox jumps over the lazy dog, the quick brown cat",
            b"say \"hi\"\n say \"hi\"\n\t",
        ] {
            let mut c = compressor(input);
            let stats = c.run(&MacroSyntax);
            assert_eq!(c.grammar().to_bytes(&MacroSyntax).len(), stats.output_len);
        }
    }

    #[test]
    fn test_extra_iteration_after_convergence_is_noop() {
        let mut c = compressor(b"abcabcabcabc xyz abcabc xyz");
        let stats = c.run(&MacroSyntax);
        assert!(stats.converged);
        let before = c.projected_len();
        c.step(&MacroSyntax);
        assert_eq!(c.projected_len(), before);
    }

    #[test]
    fn test_iteration_budget_is_respected() {
        let config = Config::default().with_max_iterations(1);
        let doc = Document::new(b"abababababab".to_vec(), &config).unwrap();
        let mut c = Compressor::new(doc, config).unwrap();
        let stats = c.run(&MacroSyntax);
        assert_eq!(stats.iterations, 1);
        assert!(!stats.converged);
        assert_eq!(c.grammar().expand(), b"abababababab");
    }

    #[test]
    fn test_allocator_names_every_id() {
        let mut c = compressor(b"abcabcabcabc");
        c.step(&MacroSyntax);
        assert_eq!(c.allocator.issued(), c.catalog().len());
        assert_eq!(c.symbols().len(), c.catalog().len());
        assert_eq!(c.allocator.skipped(), 0);
    }

    #[test]
    fn test_rejects_document_over_own_ceiling() {
        let doc = Document::new(b"abcdef".to_vec(), &Config::default()).unwrap();
        let err = Compressor::new(doc, Config::default().with_max_doc_len(3)).err();
        assert!(matches!(err, Some(Error::TooLarge { len: 6, max: 3 })));
    }

    #[test]
    fn test_stats_ratio() {
        let stats = CompressionStats {
            input_len: 200,
            ids: 10,
            definitions: 2,
            iterations: 3,
            converged: true,
            output_len: 50,
        };
        assert!((stats.compression_ratio() - 25.0).abs() < f64::EPSILON);
    }
}
