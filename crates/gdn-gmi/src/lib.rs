//! Gemtext line scanner
//!
//! Reads a gemtext document one line at a time and classifies each line
//! (headings, links, list items, quotes, preformatted blocks, plain text).
//! Text and URL views borrow the scanner's line buffer and stay valid until
//! the next call to [`Scanner::advance`].
//!
//! Set `RUST_LOG=gdn_gmi=trace` in a binary that installs a subscriber to
//! follow classification line by line.
//!
//! # Example
//!
//! ```
//! use gdn_gmi::{LineType, Scanner};
//!
//! let mut s = Scanner::new("# Hello\n=> gemini://x/ home\n".as_bytes());
//! assert!(s.advance());
//! assert_eq!(s.line_type(), LineType::Head1);
//! assert_eq!(s.text(), "Hello");
//! assert!(s.advance());
//! assert_eq!(s.url(), "gemini://x/");
//! assert!(!s.advance());
//! assert!(s.err().is_none());
//! ```

pub mod config;
pub mod line_type;
pub mod scanner;

use std::io::Read;

pub use config::ScannerConfig;
pub use line_type::LineType;
pub use scanner::{Line, Lines, Scanner, ScannerMode, Token};

/// Fatal scanning error. Once reported, the scanner stays stopped.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("read error at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("token too long at line {line}: exceeds {max} bytes")]
    TooLong { line: usize, max: usize },
}

impl ScanError {
    /// Line number the failing read was for.
    pub fn line(&self) -> usize {
        match self {
            ScanError::Read { line, .. } | ScanError::TooLong { line, .. } => *line,
        }
    }

    pub fn is_too_long(&self) -> bool {
        matches!(self, ScanError::TooLong { .. })
    }
}

/// Invalid line buffer configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("buffer sizes must be positive")]
    ZeroSize,
    #[error("maximum buffer size {max} is smaller than initial size {initial}")]
    MaxBelowInitial { initial: usize, max: usize },
    #[error("buffer must be configured before the first line is scanned")]
    AlreadyStarted,
}

/// Scan a whole document into owned lines with the default configuration.
pub fn tokenize<R: Read>(reader: R) -> Result<Vec<Line>, ScanError> {
    Scanner::new(reader).into_lines().collect()
}

/// Scan an in-memory document.
pub fn tokenize_str(source: &str) -> Result<Vec<Line>, ScanError> {
    tokenize(source.as_bytes())
}
