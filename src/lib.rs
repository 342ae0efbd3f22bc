//! # Sufgram - Suffix-Array Grammar Compression
//!
//! Compresses a byte buffer into a set of named definitions plus one final
//! expression that expands back to the exact input.
//!
//! Every repeated substring is found through a suffix array and its LCP
//! array, and deduplicated by content into a dense id. Each id then gets its
//! shortest encoding from a dynamic program that mixes quoted literals, inlined
//! sub-encodings and symbol references. Reference counts feed back into symbol
//! naming and into the per-use cost of a symbol, so the whole pass is repeated
//! until it reaches a fixed point.
//!
//! ## Example
//!
//! ```
//! use sufgram::{compress, Config, MacroSyntax, RuleSyntax};
//!
//! let (grammar, stats) = compress(b"abcabcabcabc".to_vec(), Config::default(), &MacroSyntax)?;
//!
//! // Expands back to the input
//! assert_eq!(grammar.expand(), b"abcabcabcabc");
//! assert_eq!(grammar.to_bytes(&MacroSyntax).len(), stats.output_len);
//!
//! println!("{}", String::from_utf8_lossy(&grammar.to_bytes(&RuleSyntax)));
//! # Ok::<(), sufgram::Error>(())
//! ```
//!
//! ## Performance
//!
//! - O(n log n) index construction, O(n) catalog and parent links
//! - Each iteration runs one bounded-depth program per consulted id
//! - Around a hundred bytes of tables per input byte

mod catalog;
mod compressor;
mod config;
mod definition;
mod document;
mod emit;
mod error;
mod grammar;
mod hash;
mod iter;
mod literal;
mod mode;
mod parents;
mod suffix_array;
mod symbols;


pub use catalog::{Catalog, Id, Span, DOCUMENT_ID, EMPTY_ID};
pub use compressor::{CompressionStats, Compressor};
pub use config::{Config, DEFAULT_CHARSET, DEFAULT_RESERVED};
pub use definition::{Definition, DpCounters, Substitution};
pub use document::{Document, TERMINATOR};
pub use emit::{emit, MacroSyntax, OutputSyntax, RuleSyntax};
pub use error::{Error, Result};
pub use grammar::{Grammar, Rule, Token};
pub use iter::GrammarIter;
pub use mode::{Boundary, BoundaryMode, Choice, Step};
pub use parents::ParentLinks;
pub use suffix_array::SuffixIndex;
pub use symbols::SymbolTable;

/// Compresses `content` in one call, iterating with lengths from `syntax`.
pub fn compress<S: OutputSyntax + ?Sized>(
    content: Vec<u8>,
    config: Config,
    syntax: &S,
) -> Result<(Grammar, CompressionStats)> {
    let document = Document::new(content, &config)?;
    let mut compressor = Compressor::new(document, config)?;
    let stats = compressor.run(syntax);
    Ok((compressor.grammar(), stats))
}
