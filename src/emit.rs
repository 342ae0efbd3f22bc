//! Printing of the final grammar.
//!
//! The compressor only needs lengths from an adapter while it iterates; the
//! writer methods are used once, after the loop ends. Both must agree byte for
//! byte, so the projected length equals what [`emit`] writes.

use crate::error::Result;
use crate::grammar::Grammar;
use std::io::Write;

/// Textual form of definitions and the final expression.
pub trait OutputSyntax {
    /// Bytes taken by one definition with the given name and value lengths.
    fn definition_len(&self, name_len: usize, value_len: usize) -> usize;

    /// Bytes taken by the final expression with the given value length.
    fn body_len(&self, value_len: usize) -> usize;

    fn write_definition(&self, out: &mut dyn Write, name: &str, value: &[u8])
        -> std::io::Result<()>;

    fn write_body(&self, out: &mut dyn Write, value: &[u8]) -> std::io::Result<()>;
}

/// C preprocessor output: `#define NAME VALUE` lines, then `__asm__(BODY);`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacroSyntax;

impl OutputSyntax for MacroSyntax {
    fn definition_len(&self, name_len: usize, value_len: usize) -> usize {
        b"#define ".len() + name_len + 1 + value_len + 1
    }

    fn body_len(&self, value_len: usize) -> usize {
        b"__asm__(".len() + value_len + b");\n".len()
    }

    fn write_definition(
        &self,
        out: &mut dyn Write,
        name: &str,
        value: &[u8],
    ) -> std::io::Result<()> {
        write!(out, "#define {name} ")?;
        out.write_all(value)?;
        out.write_all(b"\n")
    }

    fn write_body(&self, out: &mut dyn Write, value: &[u8]) -> std::io::Result<()> {
        out.write_all(b"__asm__(")?;
        out.write_all(value)?;
        out.write_all(b");\n")
    }
}

/// Plain rule listing: `NAME := VALUE` lines, then the body on its own line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSyntax;

impl OutputSyntax for RuleSyntax {
    fn definition_len(&self, name_len: usize, value_len: usize) -> usize {
        name_len + b" := ".len() + value_len + 1
    }

    fn body_len(&self, value_len: usize) -> usize {
        value_len + 1
    }

    fn write_definition(
        &self,
        out: &mut dyn Write,
        name: &str,
        value: &[u8],
    ) -> std::io::Result<()> {
        write!(out, "{name} := ")?;
        out.write_all(value)?;
        out.write_all(b"\n")
    }

    fn write_body(&self, out: &mut dyn Write, value: &[u8]) -> std::io::Result<()> {
        out.write_all(value)?;
        out.write_all(b"\n")
    }
}

/// Writes every rule, then the body, returning the number of bytes written.
pub fn emit<W, S>(grammar: &Grammar, syntax: &S, out: &mut W) -> Result<usize>
where
    W: Write,
    S: OutputSyntax + ?Sized,
{
    let out: &mut dyn Write = out;
    let mut written = 0;
    for rule in grammar.rules() {
        let value = grammar.render(&rule.value);
        syntax.write_definition(out, &rule.name, &value)?;
        written += syntax.definition_len(rule.name.len(), value.len());
    }
    let body = grammar.body_text();
    syntax.write_body(out, &body)?;
    written += syntax.body_len(body.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines<S: OutputSyntax>(syntax: &S) -> Vec<u8> {
        let mut out = Vec::new();
        syntax.write_definition(&mut out, "ab", b"\"x\" c").unwrap();
        syntax.write_body(&mut out, b"ab ab").unwrap();
        out
    }

    #[test]
    fn test_macro_syntax() {
        let out = lines(&MacroSyntax);
        assert_eq!(out, b"#define ab \"x\" c\n__asm__(ab ab);\n");
        assert_eq!(
            out.len(),
            MacroSyntax.definition_len(2, 5) + MacroSyntax.body_len(5)
        );
        assert_eq!(MacroSyntax.definition_len(1, 0), 11);
        assert_eq!(MacroSyntax.body_len(0), 11);
    }

    #[test]
    fn test_rule_syntax() {
        let out = lines(&RuleSyntax);
        assert_eq!(out, b"ab := \"x\" c\nab ab\n");
        assert_eq!(
            out.len(),
            RuleSyntax.definition_len(2, 5) + RuleSyntax.body_len(5)
        );
    }

    #[test]
    fn test_adapters_are_object_safe() {
        let adapters: [&dyn OutputSyntax; 2] = [&MacroSyntax, &RuleSyntax];
        for syntax in adapters {
            let mut out = Vec::new();
            syntax.write_body(&mut out, b"\"\"").unwrap();
            assert_eq!(out.len(), syntax.body_len(2));
        }
    }
}
