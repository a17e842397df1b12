//! Property-based tests for the gemtext scanner.
//!
//! Random documents are built from a mix of gemtext line shapes and scanned
//! with random buffer and read-chunk sizes. The properties checked are the
//! ones every document must satisfy regardless of content:
//! 1. Line numbers count up from 1 without gaps
//! 2. One token per source line
//! 3. Preformatted bodies come back byte-for-byte
//! 4. Exhaustion is sticky

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::io::{self, Read};

use gdn_gmi::{LineType, Scanner, ScannerConfig};
use proptest::prelude::*;

/// Reader that returns at most `chunk` bytes per call.
struct Chunked {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

// -- Strategies --

/// A single line body without terminators or fences.
fn plain_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 #*>=/:.\t-]{0,40}")
        .expect("valid regex")
        .prop_filter("no fence", |s| !s.starts_with("```"))
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        plain_strategy(),
        plain_strategy().prop_map(|s| format!("# {s}")),
        plain_strategy().prop_map(|s| format!("## {s}")),
        plain_strategy().prop_map(|s| format!("### {s}")),
        plain_strategy().prop_map(|s| format!("* {s}")),
        plain_strategy().prop_map(|s| format!("> {s}")),
        "[a-z]{1,10}://[a-z]{1,10}/".prop_map(|u| format!("=> {u} description")),
        Just("```".to_string()),
    ]
}

fn document_strategy() -> impl Strategy<Value = (Vec<String>, bool)> {
    (prop::collection::vec(line_strategy(), 0..40), any::<bool>())
}

fn join((lines, crlf): &(Vec<String>, bool)) -> String {
    let sep = if *crlf { "\r\n" } else { "\n" };
    lines.iter().map(|l| format!("{l}{sep}")).collect()
}

proptest! {
    #[test]
    fn line_numbers_count_up(doc in document_strategy(), chunk in 1usize..64) {
        let reader = Chunked { data: join(&doc).into_bytes(), pos: 0, chunk };
        let mut s = Scanner::with_config(reader, ScannerConfig::new(8, 4096).unwrap());

        let mut expected = 0;
        while s.advance() {
            expected += 1;
            prop_assert_eq!(s.line(), expected);
            prop_assert_ne!(s.line_type(), LineType::Unknown);
        }

        prop_assert!(s.err().is_none());
        prop_assert_eq!(expected, doc.0.len());
    }

    #[test]
    fn exhaustion_is_sticky(doc in document_strategy()) {
        let source = join(&doc);
        let mut s = Scanner::new(source.as_bytes());
        while s.advance() {}
        let last = s.line();

        for _ in 0..3 {
            prop_assert!(!s.advance());
            prop_assert_eq!(s.line(), last);
            prop_assert!(s.err().is_none());
            prop_assert!(s.text_bytes().is_empty());
            prop_assert!(s.url_bytes().is_empty());
        }
    }

    #[test]
    fn preformatted_body_is_verbatim(body in prop::collection::vec(plain_strategy(), 0..20)) {
        let mut source = String::from("```\n");
        for line in &body {
            source.push_str(line);
            source.push('\n');
        }
        source.push_str("```\n");

        let mut s = Scanner::new(source.as_bytes());
        prop_assert!(s.advance());
        prop_assert_eq!(s.line_type(), LineType::PreStart);
        for line in &body {
            prop_assert!(s.advance());
            prop_assert_eq!(s.line_type(), LineType::PreBody);
            prop_assert_eq!(s.text_bytes(), line.as_bytes());
        }
        prop_assert!(s.advance());
        prop_assert_eq!(s.line_type(), LineType::PreEnd);
        prop_assert!(!s.advance());
    }

    #[test]
    fn oversized_line_reports_too_long(max in 8usize..64, extra in 0usize..32) {
        let line = "x".repeat(max + extra);
        let mut s = Scanner::with_config(line.as_bytes(), ScannerConfig::new(4, max).unwrap());

        prop_assert!(!s.advance());
        prop_assert!(s.err().is_some_and(|e| e.is_too_long()));
        prop_assert_eq!(s.line(), 0);
    }
}
