use std::borrow::Cow;
use std::io::{ErrorKind, Read};
use std::ops::Range;

use tracing::{debug, trace, warn};

use crate::config::ScannerConfig;
use crate::line_type::LineType;
use crate::{ConfigError, ScanError};

const FENCE: &[u8] = b"```";
const LINK: &[u8] = b"=>";

/// Scanner mode determines which rules apply to the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerMode {
    /// Full classification.
    #[default]
    Normal,
    /// Inside a fenced block: only the closing fence is recognized.
    Preformatted,
}

/// Gemtext line scanner.
///
/// Pulls bytes from `R` into a reusable buffer, splits them on `\n`
/// (dropping a preceding `\r`), and classifies one line per call to
/// [`advance`](Scanner::advance).
///
/// - Buffer grows by doubling up to the configured maximum
/// - Unread bytes are shifted to the front instead of reallocating
/// - Text and URL are byte ranges into the buffer, not copies
pub struct Scanner<R> {
    reader: R,
    config: ScannerConfig,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
    line: usize,
    kind: LineType,
    text: Range<usize>,
    url: Range<usize>,
    mode: ScannerMode,
    err: Option<ScanError>,
    started: bool,
    done: bool,
}

impl<R: Read> Scanner<R> {
    /// Create a scanner with the default buffer configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ScannerConfig::default())
    }

    /// Create a scanner with explicit buffer sizes.
    pub fn with_config(reader: R, config: ScannerConfig) -> Self {
        Self {
            reader,
            config,
            buf: Vec::new(),
            start: 0,
            end: 0,
            eof: false,
            line: 0,
            kind: LineType::Unknown,
            text: 0..0,
            url: 0..0,
            mode: ScannerMode::Normal,
            err: None,
            started: false,
            done: false,
        }
    }

    /// Resize the line buffer. Only allowed before the first `advance`.
    pub fn set_buffer(&mut self, initial: usize, max: usize) -> Result<(), ConfigError> {
        if self.started {
            return Err(ConfigError::AlreadyStarted);
        }
        self.config = ScannerConfig::new(initial, max)?;
        Ok(())
    }

    /// Read and classify the next line.
    ///
    /// Returns `false` at end of input or on a fatal error; check
    /// [`err`](Scanner::err) to tell them apart. Every call after the
    /// first `false` is a no-op that returns `false` again.
    pub fn advance(&mut self) -> bool {
        self.started = true;
        if self.done {
            self.clear();
            return false;
        }

        match self.read_line() {
            Ok(Some(range)) => {
                self.line += 1;
                self.apply(range);
                true
            }
            Ok(None) => {
                debug!(lines = self.line, "end of input");
                self.stop(None);
                false
            }
            Err(e) => {
                warn!(error = %e, "scanner stopped");
                self.stop(Some(e));
                false
            }
        }
    }

    /// Turn the scanner into an iterator of owned lines.
    pub fn into_lines(self) -> Lines<R> {
        Lines { scanner: self }
    }

    // --- Reading ---

    /// Find the next line in the buffer, reading more input as needed.
    fn read_line(&mut self) -> Result<Option<Range<usize>>, ScanError> {
        loop {
            let pending = &self.buf[self.start..self.end];
            if let Some(i) = pending.iter().position(|&b| b == b'\n') {
                let line = self.start..self.start + i;
                self.start += i + 1;
                return Ok(Some(self.drop_cr(line)));
            }

            if self.eof {
                if self.start == self.end {
                    return Ok(None);
                }
                let line = self.start..self.end;
                self.start = self.end;
                return Ok(Some(self.drop_cr(line)));
            }

            self.fill()?;
        }
    }

    /// Read more input into the buffer, shifting or growing it first.
    fn fill(&mut self) -> Result<(), ScanError> {
        if self.start > 0 && (self.end == self.buf.len() || self.start > self.buf.len() / 2) {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        if self.end == self.buf.len() {
            if self.buf.len() >= self.config.max() {
                return Err(ScanError::TooLong {
                    line: self.line + 1,
                    max: self.config.max(),
                });
            }
            let size = self.config.grow(self.buf.len());
            debug!(from = self.buf.len(), to = size, "growing line buffer");
            self.buf.resize(size, 0);
        }

        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::Read {
                        line: self.line + 1,
                        source,
                    })
                }
            }
        }
    }

    fn drop_cr(&self, line: Range<usize>) -> Range<usize> {
        if line.end > line.start && self.buf[line.end - 1] == b'\r' {
            line.start..line.end - 1
        } else {
            line
        }
    }

    // --- State ---

    fn apply(&mut self, line: Range<usize>) {
        let c = classify(self.mode, &self.buf[line.clone()]);
        self.kind = c.kind;
        self.text = line.start + c.text.start..line.start + c.text.end;
        self.url = line.start + c.url.start..line.start + c.url.end;

        match c.kind {
            LineType::PreStart => {
                debug!(line = self.line, "entering preformatted block");
                self.mode = ScannerMode::Preformatted;
            }
            LineType::PreEnd => {
                debug!(line = self.line, "leaving preformatted block");
                self.mode = ScannerMode::Normal;
            }
            _ => {}
        }

        trace!(line = self.line, kind = %self.kind, "classified line");
    }

    fn stop(&mut self, err: Option<ScanError>) {
        self.done = true;
        self.clear();
        if self.err.is_none() {
            self.err = err;
        }
    }

    fn clear(&mut self) {
        self.kind = LineType::Unknown;
        self.text = 0..0;
        self.url = 0..0;
    }
}

impl<R> Scanner<R> {
    /// Number of the current line, starting at 1. Zero before the first line.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn line_type(&self) -> LineType {
        self.kind
    }

    pub fn mode(&self) -> ScannerMode {
        self.mode
    }

    /// Text of the current line. Borrowed unless the bytes are not valid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.text_bytes())
    }

    pub fn text_bytes(&self) -> &[u8] {
        &self.buf[self.text.clone()]
    }

    /// URL of the current line. Empty unless the line is a link.
    pub fn url(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.url_bytes())
    }

    pub fn url_bytes(&self) -> &[u8] {
        &self.buf[self.url.clone()]
    }

    /// First error the scanner stopped on. `None` after a clean end of input.
    pub fn err(&self) -> Option<&ScanError> {
        self.err.as_ref()
    }

    /// Current line as a token borrowing the scanner buffer.
    pub fn token(&self) -> Token<'_> {
        Token {
            line: self.line,
            kind: self.kind,
            text: self.text_bytes(),
            url: self.url_bytes(),
        }
    }
}

// --- Classification ---

/// Result of classifying one raw line. Ranges are relative to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Classified {
    kind: LineType,
    text: Range<usize>,
    url: Range<usize>,
}

impl Classified {
    fn new(kind: LineType, text: Range<usize>) -> Self {
        Self {
            kind,
            text,
            url: 0..0,
        }
    }
}

fn classify(mode: ScannerMode, raw: &[u8]) -> Classified {
    let len = raw.len();

    if mode == ScannerMode::Preformatted {
        if raw.starts_with(FENCE) {
            return Classified::new(LineType::PreEnd, 0..0);
        }
        return Classified::new(LineType::PreBody, 0..len);
    }

    if raw.starts_with(FENCE) {
        return Classified::new(LineType::PreStart, FENCE.len()..len);
    }
    if raw.starts_with(LINK) {
        return classify_link(raw);
    }
    if raw.starts_with(b"###") {
        return Classified::new(LineType::Head3, after_marker(raw, 3));
    }
    if raw.starts_with(b"##") {
        return Classified::new(LineType::Head2, after_marker(raw, 2));
    }
    if raw.starts_with(b"#") {
        return Classified::new(LineType::Head1, after_marker(raw, 1));
    }
    if raw.starts_with(b"> ") {
        return Classified::new(LineType::Quote, after_marker(raw, 1));
    }
    if raw.starts_with(b"* ") {
        return Classified::new(LineType::List, 2..len);
    }

    Classified::new(LineType::Text, 0..len)
}

/// Skip a marker and at most one space after it.
fn after_marker(raw: &[u8], marker: usize) -> Range<usize> {
    let start = if raw.get(marker) == Some(&b' ') {
        marker + 1
    } else {
        marker
    };
    start..raw.len()
}

/// `=>[ws]URL[ws description]`. The description keeps trailing whitespace.
fn classify_link(raw: &[u8]) -> Classified {
    let url_start = skip_while(raw, LINK.len(), |b| b.is_ascii_whitespace());
    let url_end = skip_while(raw, url_start, |b| !b.is_ascii_whitespace());
    let text_start = skip_while(raw, url_end, |b| b.is_ascii_whitespace());

    Classified {
        kind: LineType::Link,
        text: text_start..raw.len(),
        url: url_start..url_end,
    }
}

fn skip_while(raw: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> usize {
    raw[from..]
        .iter()
        .position(|&b| !pred(b))
        .map_or(raw.len(), |i| from + i)
}

// --- Tokens ---

/// One classified line borrowed from a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    line: usize,
    kind: LineType,
    text: &'a [u8],
    url: &'a [u8],
}

impl<'a> Token<'a> {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn kind(&self) -> LineType {
        self.kind
    }

    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }

    pub fn text_bytes(&self) -> &'a [u8] {
        self.text
    }

    pub fn url(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.url)
    }

    pub fn url_bytes(&self) -> &'a [u8] {
        self.url
    }

    /// Copy the token out of the scanner buffer.
    pub fn to_line(&self) -> Line {
        Line {
            number: self.line,
            kind: self.kind,
            text: self.text().into_owned(),
            url: self.url().into_owned(),
        }
    }
}

/// Owned copy of a classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub kind: LineType,
    pub text: String,
    pub url: String,
}

impl Line {
    pub fn new(number: usize, kind: LineType, text: impl Into<String>) -> Self {
        Self {
            number,
            kind,
            text: text.into(),
            url: String::new(),
        }
    }

    pub fn link(number: usize, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number,
            kind: LineType::Link,
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Iterator over owned lines. Yields the scan error once, then stops.
pub struct Lines<R> {
    scanner: Scanner<R>,
}

impl<R: Read> Iterator for Lines<R> {
    type Item = Result<Line, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.scanner.advance() {
            return Some(Ok(self.scanner.token().to_line()));
        }
        self.scanner.err.take().map(Err)
    }
}
