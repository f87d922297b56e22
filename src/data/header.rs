//! ENVI header parsing.
//!
//! An ENVI header is a line-oriented text file of `key = value` pairs. Values
//! are untyped in the file; this module infers a type per value by trying to
//! read it as a literal (number, quoted string, or `{...}` list) and keeps the
//! raw text when that fails. Lines without the ` = ` separator (the `ENVI`
//! magic line, comments, blank lines) are skipped.
//!
//! ```rust,ignore
//! use envi_view::data::{HeaderMapping, HeaderValue};
//!
//! let header = HeaderMapping::parse("ENVI\nbands = 3\ninterleave = bsq\n");
//! assert_eq!(header.get("bands"), Some(&HeaderValue::Integer(3)));
//! assert_eq!(header.get_str("interleave"), Some("bsq"));
//! ```

use std::fmt;

use crate::constants::HEADER_SEPARATOR;

/// A header value with its inferred type.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// Integer literal, e.g. `bands = 224`
    Integer(i64),
    /// Floating point literal, e.g. `reflectance scale factor = 10000.0`
    Float(f64),
    /// Quoted string literal, or the raw text of a value that is not a literal
    Text(String),
    /// Brace-delimited list, e.g. `wavelength = {450.0, 550.0}`
    List(Vec<HeaderValue>),
}

impl HeaderValue {
    /// Numeric value of an integer or float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(v) => Some(*v as f64),
            HeaderValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value; floats are not coerced.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[HeaderValue]> {
        match self {
            HeaderValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// All elements as numbers, if this is a list of numbers only.
    pub fn as_number_list(&self) -> Option<Vec<f64>> {
        self.as_list()?.iter().map(HeaderValue::as_f64).collect()
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Integer(v) => write!(f, "{}", v),
            HeaderValue::Float(v) => write!(f, "{:?}", v),
            HeaderValue::Text(s) => write!(f, "{}", s),
            HeaderValue::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Ordered mapping from header key to typed value.
///
/// Insertion order follows the header file. A key that appears twice keeps
/// its first position and the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMapping {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse header text. Never fails: unparseable lines are skipped and
    /// unparseable values are kept as text.
    pub fn parse(text: &str) -> Self {
        let mut mapping = Self::new();
        for (line_no, line) in text.lines().enumerate() {
            match parse_line(line) {
                Some((key, value)) => mapping.insert(key, value),
                None => log::trace!("Header line {} skipped: {:?}", line_no + 1, line),
            }
        }
        log::debug!("Parsed {} header entries", mapping.len());
        mapping
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: HeaderValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    pub fn get_number_list(&self, key: &str) -> Option<Vec<f64>> {
        self.get(key).and_then(HeaderValue::as_number_list)
    }

    /// Iterate entries in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a `key = value` line and type its value.
///
/// Returns `None` for lines without the separator.
pub fn parse_line(line: &str) -> Option<(String, HeaderValue)> {
    let (key, raw) = line.split_once(HEADER_SEPARATOR)?;
    Some((key.trim().to_string(), parse_value(raw)))
}

/// Type a raw header value.
///
/// Braces are read as list brackets before literal parsing. When the value is
/// not a literal, the raw text is returned unchanged as [`HeaderValue::Text`].
pub fn parse_value(raw: &str) -> HeaderValue {
    let bracketed = raw.replace('{', "[").replace('}', "]");
    match LiteralParser::new(&bracketed).parse() {
        Some(value) => value,
        None => {
            log::trace!("Keeping non-literal header value as text: {:?}", raw);
            HeaderValue::Text(raw.to_string())
        }
    }
}

/// Recursive descent parser for number, string and list literals.
struct LiteralParser<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            text,
            pos: 0,
        }
    }

    /// Parse the whole input; a bare comma-separated sequence becomes a list.
    fn parse(mut self) -> Option<HeaderValue> {
        self.skip_ws();
        let first = self.value()?;
        self.skip_ws();
        if self.peek().is_none() {
            return Some(first);
        }

        let mut items = vec![first];
        while self.eat(b',') {
            self.skip_ws();
            if self.peek().is_none() {
                break;
            }
            items.push(self.value()?);
            self.skip_ws();
        }
        if self.peek().is_some() {
            return None;
        }
        Some(HeaderValue::List(items))
    }

    fn value(&mut self) -> Option<HeaderValue> {
        match self.peek()? {
            b'[' => self.list(),
            b'\'' | b'"' => self.string(),
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.number(),
            _ => None,
        }
    }

    fn list(&mut self) -> Option<HeaderValue> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(b']') {
                return Some(HeaderValue::List(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(b',') {
                continue;
            }
            self.expect(b']')?;
            return Some(HeaderValue::List(items));
        }
    }

    fn string(&mut self) -> Option<HeaderValue> {
        let quote = self.bump()?;
        let mut out = String::new();
        let mut chars = self.text[self.pos..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                c if c as u32 == u32::from(quote) => {
                    self.pos += offset + 1;
                    return Some(HeaderValue::Text(out));
                }
                '\\' => {
                    let (_, escaped) = chars.next()?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
        // Unterminated string
        None
    }

    fn number(&mut self) -> Option<HeaderValue> {
        let negative = match self.peek()? {
            b'-' => {
                self.pos += 1;
                true
            }
            b'+' => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        self.skip_ws();

        let start = self.pos;
        let int_digits = self.digits();
        let mut is_float = false;
        let mut frac_digits = 0;
        if self.eat(b'.') {
            is_float = true;
            frac_digits = self.digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return None;
            }
        }

        let literal = &self.text[start..self.pos];
        if is_float {
            let value: f64 = literal.parse().ok()?;
            Some(HeaderValue::Float(if negative { -value } else { value }))
        } else {
            // Decimal integers may not carry leading zeros ("007")
            if literal.len() > 1 && literal.starts_with('0') && literal.bytes().any(|b| b != b'0') {
                return None;
            }
            let value: i64 = literal.parse().ok()?;
            Some(HeaderValue::Integer(if negative { -value } else { value }))
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: u8) -> Option<()> {
        self.eat(expected).then_some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HEADER: &str = "ENVI
description = {
  Hyperspectral capture}
samples = 5
lines = 4
bands = 3
header offset = 0
file type = ENVI Standard
data type = 12
interleave = bsq
byte order = 0
wavelength units = Nanometers
wavelength = {450.0, 550.0, 660.0}
fwhm = {10.5, 10.5, 11}
";

    #[test]
    fn test_scalar_types_inferred() {
        assert_eq!(parse_value("1"), HeaderValue::Integer(1));
        assert_eq!(parse_value("-12"), HeaderValue::Integer(-12));
        assert_eq!(parse_value("450.5"), HeaderValue::Float(450.5));
        assert_eq!(parse_value("1e3"), HeaderValue::Float(1000.0));
        assert_eq!(parse_value(".5"), HeaderValue::Float(0.5));
        assert_eq!(parse_value("'nm'"), HeaderValue::Text("nm".to_string()));
    }

    #[test]
    fn test_brace_list_parsed_in_order() {
        assert_eq!(
            parse_value("{1,2,3}"),
            HeaderValue::List(vec![
                HeaderValue::Integer(1),
                HeaderValue::Integer(2),
                HeaderValue::Integer(3),
            ])
        );
        assert_eq!(parse_value("{}"), HeaderValue::List(Vec::new()));
        assert_eq!(
            parse_value("{ 1.5 , 2 , }").as_number_list(),
            Some(vec![1.5, 2.0])
        );
    }

    #[test]
    fn test_non_literal_kept_verbatim() {
        assert_eq!(parse_value("BSQ"), HeaderValue::Text("BSQ".to_string()));
        assert_eq!(
            parse_value("ENVI Standard"),
            HeaderValue::Text("ENVI Standard".to_string())
        );
        // Braces are restored: the raw text is returned, not the bracketed form
        assert_eq!(
            parse_value("{UTM, 1.000, 1.000}"),
            HeaderValue::Text("{UTM, 1.000, 1.000}".to_string())
        );
        assert_eq!(parse_value("12abc"), HeaderValue::Text("12abc".to_string()));
        assert_eq!(parse_value("007"), HeaderValue::Text("007".to_string()));
        assert_eq!(parse_value("'open"), HeaderValue::Text("'open".to_string()));
        assert_eq!(parse_value(""), HeaderValue::Text(String::new()));
    }

    #[test]
    fn test_out_of_range_integer_degrades_to_text() {
        let raw = "99999999999999999999999";
        assert_eq!(parse_value(raw), HeaderValue::Text(raw.to_string()));
    }

    #[test]
    fn test_bare_sequence_is_list() {
        assert_eq!(
            parse_value("1, 2"),
            HeaderValue::List(vec![HeaderValue::Integer(1), HeaderValue::Integer(2)])
        );
    }

    #[test]
    fn test_one_entry_per_separator_line() {
        let header = HeaderMapping::parse(SAMPLE_HEADER);
        let separator_lines = SAMPLE_HEADER
            .lines()
            .filter(|l| l.contains(HEADER_SEPARATOR))
            .count();
        assert_eq!(header.len(), separator_lines);
        assert!(!header.contains_key("ENVI"));
        assert!(!header.contains_key("  Hyperspectral capture}"));
    }

    #[test]
    fn test_sample_header_values() {
        let header = HeaderMapping::parse(SAMPLE_HEADER);
        assert_eq!(header.get_int("samples"), Some(5));
        assert_eq!(header.get_int("data type"), Some(12));
        assert_eq!(header.get_str("interleave"), Some("bsq"));
        assert_eq!(header.get_str("wavelength units"), Some("Nanometers"));
        assert_eq!(
            header.get_number_list("wavelength"),
            Some(vec![450.0, 550.0, 660.0])
        );
        assert_eq!(header.get_number_list("fwhm"), Some(vec![10.5, 10.5, 11.0]));
        // The opening line of a multi-line value is not a literal on its own
        assert_eq!(header.get_str("description"), Some("{"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let header = HeaderMapping::parse("b = 1\na = 2\nc = 3\na = 4\n");
        let keys: Vec<&str> = header.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(header.get_int("a"), Some(4));
    }

    #[test]
    fn test_separator_requires_surrounding_spaces() {
        let header = HeaderMapping::parse("bands=3\nlines = 4\n");
        assert_eq!(header.len(), 1);
        assert_eq!(header.get_int("lines"), Some(4));
    }

    #[test]
    fn test_value_split_on_first_separator() {
        let (key, value) = parse_line("band names = a = b").expect("line has separator");
        assert_eq!(key, "band names");
        assert_eq!(value, HeaderValue::Text("a = b".to_string()));
    }

    #[test]
    fn test_display_uses_envi_list_syntax() {
        let value = parse_value("{450.0, 2}");
        assert_eq!(value.to_string(), "{450.0, 2}");
    }
}
