use std::env;
use sufgram::{Compressor, Config, Document, MacroSyntax};

/// Compresses a file and prints grammar statistics.
///
/// Usage: cargo run --example stats <filename>
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <filename>", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];
    let config = Config::default();

    let document = Document::from_path(filename, &config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    });
    let original = document.content().to_vec();

    let mut compressor = Compressor::new(document, config).expect("default config is valid");
    let stats = compressor.run(&MacroSyntax);
    let grammar = compressor.grammar();

    // Verify by expanding
    let expanded = grammar.expand();
    if let Some(pos) = original.iter().zip(&expanded).position(|(a, b)| a != b) {
        eprintln!(
            "Mismatch at position {}: file={}, grammar={}",
            pos, original[pos], expanded[pos]
        );
    } else if original.len() != expanded.len() {
        eprintln!(
            "Length mismatch: file={}, grammar={}",
            original.len(),
            expanded.len()
        );
    }

    let longest = grammar
        .rules()
        .iter()
        .map(|rule| compressor.catalog().span(rule.id).len)
        .max()
        .unwrap_or(0);

    println!("\n=== Statistics ===");
    println!("Total bytes read: {}", stats.input_len);
    println!("Distinct substrings: {}", stats.ids);
    println!("Definitions: {}", stats.definitions);
    println!("Longest defined substring: {}", longest);
    println!(
        "Iterations: {} ({})",
        stats.iterations,
        if stats.converged { "converged" } else { "capped" }
    );
    println!("Output bytes: {}", stats.output_len);
    println!("Compression ratio: {:.2}%", stats.compression_ratio());
}
