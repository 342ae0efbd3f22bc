//! sufgram CLI - compresses a file into macro definitions plus one expression.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sufgram::{Compressor, Config, Document, MacroSyntax, OutputSyntax, RuleSyntax};

/// Grammar compressor built on a suffix array.
#[derive(Parser)]
#[command(name = "sufgram")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (default: stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output syntax
    #[arg(long, value_enum, default_value_t = Syntax::Macro)]
    syntax: Syntax,

    /// Largest accepted input, in bytes
    #[arg(long, default_value_t = Config::default().max_doc_len)]
    max_doc_len: usize,

    /// Ancestor candidates examined per position
    #[arg(long, default_value_t = Config::default().max_dp_depth)]
    depth: usize,

    /// Maximum number of fixpoint iterations
    #[arg(long, default_value_t = Config::default().max_iterations)]
    iterations: usize,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Syntax {
    /// `#define NAME VALUE` lines and an `__asm__(...)` body
    Macro,
    /// `NAME := VALUE` lines and a bare body
    Rules,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("sufgram: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("Caused by: {cause}");
        }
        let code = e
            .downcast_ref::<sufgram::Error>()
            .map_or(1, sufgram::Error::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::default()
        .with_max_doc_len(cli.max_doc_len)
        .with_max_dp_depth(cli.depth)
        .with_max_iterations(cli.iterations);

    let document = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => Document::from_path(path, &config)
            .with_context(|| format!("loading {}", path.display()))?,
        _ => Document::from_reader(io::stdin().lock(), &config).context("loading stdin")?,
    };

    let syntax: &dyn OutputSyntax = match cli.syntax {
        Syntax::Macro => &MacroSyntax,
        Syntax::Rules => &RuleSyntax,
    };

    let mut compressor = Compressor::new(document, config)?;
    let stats = compressor.run(syntax);
    log::info!(
        "{} -> {} bytes ({:.1}%), {} definitions, {} iterations",
        stats.input_len,
        stats.output_len,
        stats.compression_ratio(),
        stats.definitions,
        stats.iterations
    );
    let grammar = compressor.grammar();

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            sufgram::emit(&grammar, syntax, &mut out)?;
            out.flush()
                .map_err(sufgram::Error::from)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut out = io::stdout().lock();
            sufgram::emit(&grammar, syntax, &mut out)?;
            out.flush().map_err(sufgram::Error::from)?;
        }
    }
    Ok(())
}
