//! CSV dialect settings: delimiter, quoting mode, line terminator.

use std::fmt;
use std::str::FromStr;

/// Quoting behaviour for written fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Quote only fields that contain the delimiter, the quote character,
    /// or a line terminator character
    #[default]
    Minimal,
    /// Quote every field
    All,
    /// Quote every field that is not a number
    NonNumeric,
    /// Never quote; special characters are escaped with the escape character
    None,
}

impl QuoteMode {
    pub(crate) fn quote_style(self) -> csv::QuoteStyle {
        match self {
            QuoteMode::Minimal => csv::QuoteStyle::Necessary,
            QuoteMode::All => csv::QuoteStyle::Always,
            QuoteMode::NonNumeric => csv::QuoteStyle::NonNumeric,
            QuoteMode::None => csv::QuoteStyle::Never,
        }
    }
}

impl FromStr for QuoteMode {
    type Err = String;

    /// Accepts `MINIMAL`, `ALL`, `NONNUMERIC`, `NONE`, case-insensitive,
    /// optionally prefixed with `QUOTE_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let name = upper.strip_prefix("QUOTE_").unwrap_or(&upper);
        match name {
            "MINIMAL" => Ok(QuoteMode::Minimal),
            "ALL" => Ok(QuoteMode::All),
            "NONNUMERIC" => Ok(QuoteMode::NonNumeric),
            "NONE" => Ok(QuoteMode::None),
            _ => Err(format!("unknown quoting mode '{s}'")),
        }
    }
}

impl fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteMode::Minimal => "MINIMAL",
            QuoteMode::All => "ALL",
            QuoteMode::NonNumeric => "NONNUMERIC",
            QuoteMode::None => "NONE",
        };
        f.write_str(name)
    }
}

/// Record terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    #[default]
    Lf,
    CrLf,
    /// Any other single byte, including `\r`
    Byte(u8),
}

impl LineTerminator {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            LineTerminator::Lf => b"\n",
            LineTerminator::CrLf => b"\r\n",
            LineTerminator::Byte(b) => std::slice::from_ref(b),
        }
    }

    pub(crate) fn terminator(self) -> csv::Terminator {
        match self {
            LineTerminator::Lf => csv::Terminator::Any(b'\n'),
            LineTerminator::CrLf => csv::Terminator::CRLF,
            LineTerminator::Byte(b) => csv::Terminator::Any(b),
        }
    }
}

impl FromStr for LineTerminator {
    type Err = String;

    /// Accepts the literal characters, their backslash escapes (`\n`,
    /// `\r\n`, `\r`), the names `LF`, `CRLF`, `CR`, or any single byte
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\n" | "\\n" => return Ok(LineTerminator::Lf),
            "\r\n" | "\\r\\n" => return Ok(LineTerminator::CrLf),
            "\r" | "\\r" => return Ok(LineTerminator::Byte(b'\r')),
            _ => {}
        }
        match s.to_uppercase().as_str() {
            "LF" => Ok(LineTerminator::Lf),
            "CRLF" => Ok(LineTerminator::CrLf),
            "CR" => Ok(LineTerminator::Byte(b'\r')),
            _ => single_byte(s)
                .map(LineTerminator::Byte)
                .ok_or_else(|| format!("unsupported line terminator {s:?}")),
        }
    }
}

/// Full dialect used to write (and read back) an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    pub delimiter: u8,
    pub quoting: QuoteMode,
    pub terminator: LineTerminator,
    /// Escape character for [`QuoteMode::None`]
    pub escape: u8,
}

pub const QUOTE: u8 = b'"';

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quoting: QuoteMode::Minimal,
            terminator: LineTerminator::Lf,
            escape: b'\\',
        }
    }
}

impl CsvFormat {
    pub fn with_quoting(mut self, quoting: QuoteMode) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_terminator(mut self, terminator: LineTerminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub(crate) fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(QUOTE)
            .quote_style(self.quoting.quote_style())
            .terminator(self.terminator.terminator())
            .has_headers(false);
        builder
    }

    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(QUOTE)
            .terminator(self.terminator.terminator())
            .has_headers(false)
            .flexible(false);
        builder
    }
}

/// Parse a setting that must be exactly one ASCII character
pub fn single_byte(s: &str) -> Option<u8> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Some(*b),
        _ => None,
    }
}

/// Parse a delimiter setting, accepting `\t` as an escaped tab
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    if s == "\\t" {
        return Ok(b'\t');
    }
    single_byte(s).ok_or_else(|| format!("delimiter must be a single ASCII character, got {s:?}"))
}
