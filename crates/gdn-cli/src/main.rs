use clap::{Args, Parser, Subcommand};
use gdn_gmi::{LineType, Scanner, ScannerConfig};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

#[derive(Parser)]
#[command(name = "gdn")]
#[command(about = "Scan gemtext documents into classified lines")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    buffer: BufferArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BufferArgs {
    /// Initial line buffer size in bytes
    #[arg(long, global = true, default_value_t = gdn_gmi::config::DEFAULT_INITIAL_BUFFER)]
    initial_buffer: usize,

    /// Longest accepted line in bytes, terminator included
    #[arg(long, global = true, default_value_t = gdn_gmi::config::DEFAULT_MAX_BUFFER)]
    max_line: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Print the classified lines of a .gmi file
    Tokens {
        /// Input .gmi file, or `-` for stdin
        path: String,
    },

    /// Scan a .gmi file and report errors without printing tokens
    Check {
        /// Input .gmi file, or `-` for stdin
        path: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match ScannerConfig::new(cli.buffer.initial_buffer, cli.buffer.max_line) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    match cli.command {
        Command::Tokens { path } => cmd_tokens(&path, config),
        Command::Check { path } => cmd_check(&path, config),
    }
}

/// Install a tracing subscriber when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn open_source(path: &str) -> Box<dyn Read> {
    if path == "-" {
        return Box::new(io::stdin().lock());
    }
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match File::open(p) {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tokens(path: &str, config: ScannerConfig) {
    tracing::debug!(path, max = config.max(), "printing tokens");
    let mut scanner = Scanner::with_config(open_source(path), config);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    while scanner.advance() {
        if let Err(e) = write_token(&mut out, &scanner) {
            eprintln!("Error writing output: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = out.flush() {
        eprintln!("Error writing output: {e}");
        std::process::exit(1);
    }

    if let Some(e) = scanner.err() {
        eprintln!("Scan error in {path}: {e}");
        std::process::exit(1);
    }
}

fn write_token<R, W: Write>(out: &mut W, scanner: &Scanner<R>) -> io::Result<()> {
    let token = scanner.token();
    write!(out, "{}\t{}\t", token.line(), token.kind())?;
    out.write_all(token.text_bytes())?;
    if token.kind() == LineType::Link {
        out.write_all(b"\t")?;
        out.write_all(token.url_bytes())?;
    }
    out.write_all(b"\n")
}

fn cmd_check(path: &str, config: ScannerConfig) {
    tracing::debug!(path, max = config.max(), "checking");
    let mut scanner = Scanner::with_config(open_source(path), config);
    while scanner.advance() {}

    if let Some(e) = scanner.err() {
        eprintln!("Scan error in {path}: {e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path} ({} lines)", scanner.line());
}
