//! CSV decoder for talent bulk upload files
//!
//! Turns raw file bytes into a header list plus a lazy sequence of rows.
//! Decoding is fail-fast: the first structural problem is yielded as an error
//! and the sequence ends, because row numbers after a misaligned line cannot
//! be trusted.

use std::io::Cursor;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{DecodeError, DecodeErrorKind};
use crate::services::profile_schema;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One data line of the upload, keyed by header
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based position among data rows (blank lines and header excluded)
    pub index: usize,
    /// Physical line the record starts on
    pub line: u64,
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl RawRow {
    pub fn new(index: usize, line: u64, headers: Arc<[String]>, values: Vec<String>) -> Self {
        Self { index, line, headers, values }
    }

    /// Value under `header`; `None` when the column is absent or the row is short
    pub fn get(&self, header: &str) -> Option<&str> {
        let pos = self.headers.iter().position(|h| h == header)?;
        self.values.get(pos).map(String::as_str)
    }

    /// Value under `header`, absent treated as empty
    pub fn value(&self, header: &str) -> &str {
        self.get(header).unwrap_or("")
    }
}

/// Decoded file: headers plus the not-yet-consumed rows
pub struct DecodedCsv {
    headers: Arc<[String]>,
    records: csv::StringRecordsIntoIter<Cursor<Arc<[u8]>>>,
    lines: LineCounter,
    next_index: usize,
    finished: bool,
}

/// Maps byte offsets of records to physical lines. The `csv` reader skips
/// empty lines without counting them, so its own line numbers drift.
struct LineCounter {
    source: Arc<[u8]>,
    pos: usize,
    line: u64,
}

impl LineCounter {
    fn new(source: Arc<[u8]>) -> Self {
        Self { source, pos: 0, line: 1 }
    }

    /// Line of the first content at or after `offset`; offsets must not go backwards
    fn line_at(&mut self, offset: u64) -> u64 {
        let len = self.source.len();
        let mut target = usize::try_from(offset).unwrap_or(len).min(len);
        // A record position can point at the empty lines skipped before it
        while target < len && matches!(self.source[target], b'\r' | b'\n') {
            target += 1;
        }
        if target > self.pos {
            self.line += self.source[self.pos..target].iter().filter(|b| **b == b'\n').count() as u64;
            self.pos = target;
        }
        self.line
    }
}

impl DecodedCsv {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Drain the remaining rows, stopping at the first decode error
    pub fn collect_rows(self) -> Result<Vec<RawRow>, DecodeError> {
        self.collect()
    }

    fn fail(&mut self, error: DecodeError) -> Option<Result<RawRow, DecodeError>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl Iterator for DecodedCsv {
    type Item = Result<RawRow, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let record = match self.records.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Err(e)) => {
                    let line = match e.position() {
                        Some(p) => self.lines.line_at(p.byte()),
                        None => self.lines.line,
                    };
                    return self.fail(DecodeError::new(line, DecodeErrorKind::Malformed(e.to_string())));
                }
                Some(Ok(record)) => record,
            };

            let line = match record.position() {
                Some(p) => self.lines.line_at(p.byte()),
                None => self.lines.line,
            };

            if record.iter().all(|field| field.is_empty()) {
                debug!("Skipping blank CSV line {}", line);
                continue;
            }

            let expected = self.headers.len();
            if record.len() > expected && record.iter().skip(expected).any(|f| !f.is_empty()) {
                return self.fail(DecodeError::new(
                    line,
                    DecodeErrorKind::TooManyFields { expected, found: record.len() },
                ));
            }

            self.next_index += 1;
            let values = record.iter().take(expected).map(str::to_string).collect();
            return Some(Ok(RawRow::new(self.next_index, line, Arc::clone(&self.headers), values)));
        }
    }
}

/// Decode raw upload bytes. Header problems, invalid UTF-8 and unterminated
/// quotes are reported here; row-level problems surface from the iterator.
pub fn decode(input: &[u8]) -> Result<DecodedCsv, DecodeError> {
    let bytes = input.strip_prefix(UTF8_BOM).unwrap_or(input);

    let text = std::str::from_utf8(bytes).map_err(|e| {
        let line = bytes[..e.valid_up_to()].iter().filter(|b| **b == b'\n').count() as u64 + 1;
        DecodeError::new(line, DecodeErrorKind::InvalidUtf8)
    })?;

    if let Some(line) = find_unterminated_quote(text) {
        return Err(DecodeError::new(line, DecodeErrorKind::UnterminatedQuote));
    }

    let source: Arc<[u8]> = Arc::from(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(Cursor::new(Arc::clone(&source)));

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DecodeError::new(1, DecodeErrorKind::Malformed(e.to_string())))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DecodeError::new(1, DecodeErrorKind::MissingHeader));
    }

    for (i, header) in headers.iter().enumerate() {
        if !header.is_empty() && headers[..i].contains(header) {
            return Err(DecodeError::new(1, DecodeErrorKind::DuplicateHeader(header.clone())));
        }
    }

    for header in headers.iter().filter(|h| !h.is_empty()) {
        if profile_schema::find_by_header(header).is_none() {
            warn!("Ignoring unrecognized CSV column \"{}\"", header);
        }
    }

    debug!("Decoded CSV header with {} columns", headers.len());

    Ok(DecodedCsv {
        headers: headers.into(),
        records: reader.into_records(),
        lines: LineCounter::new(source),
        next_index: 0,
        finished: false,
    })
}

/// Line on which a quoted field opens without ever closing, if any.
/// A quote only opens a field when it is the first character of the field.
fn find_unterminated_quote(text: &str) -> Option<u64> {
    #[derive(PartialEq)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    let mut line: u64 = 1;
    let mut opened_on: u64 = 1;

    for ch in text.chars() {
        state = match (state, ch) {
            (State::Quoted, '"') => State::QuoteInQuoted,
            (State::Quoted, '\n') => {
                line += 1;
                State::Quoted
            }
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, '"') => State::Quoted,
            (State::FieldStart, '"') => {
                opened_on = line;
                State::Quoted
            }
            (_, ',') | (_, '\r') => State::FieldStart,
            (_, '\n') => {
                line += 1;
                State::FieldStart
            }
            _ => State::Unquoted,
        };
    }

    (state == State::Quoted).then_some(opened_on)
}
