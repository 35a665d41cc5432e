//! Escaping for unquoted output.
//!
//! With [`QuoteMode::None`](super::QuoteMode::None) fields are never quoted,
//! so every byte that would otherwise end a field or a record is prefixed
//! with the escape character: the delimiter, the quote character, the escape
//! character itself, `\r`, `\n`, and the terminator byte.

use super::format::{CsvFormat, LineTerminator, QUOTE};
use std::borrow::Cow;

fn needs_escape(c: char, format: &CsvFormat) -> bool {
    if !c.is_ascii() {
        return false;
    }
    let b = c as u8;
    b == format.delimiter
        || b == QUOTE
        || b == format.escape
        || b == b'\r'
        || b == b'\n'
        || format.terminator.as_bytes().contains(&b)
}

/// Escape a field for unquoted output
pub fn escape_field<'a>(field: &'a str, format: &CsvFormat) -> Cow<'a, str> {
    if !field.chars().any(|c| needs_escape(c, format)) {
        return Cow::Borrowed(field);
    }

    let escape = format.escape as char;
    let mut escaped = String::with_capacity(field.len() + 8);
    for c in field.chars() {
        if needs_escape(c, format) {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Split unquoted, escaped CSV text into records of unescaped fields
///
/// Each unescaped terminator ends a record; text after the last terminator
/// forms a final record.
pub fn split_records(input: &str, format: &CsvFormat) -> Vec<Vec<String>> {
    let delimiter = format.delimiter as char;
    let escape = format.escape as char;

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut pending = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == escape {
            match chars.next() {
                Some(next) => field.push(next),
                None => field.push(c),
            }
            pending = true;
            continue;
        }

        let ends_record = match format.terminator {
            LineTerminator::Lf => c == '\n',
            LineTerminator::CrLf => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                    true
                } else {
                    c == '\n'
                }
            }
            LineTerminator::Byte(b) => c == b as char,
        };

        if ends_record {
            record.push(std::mem::take(&mut field));
            records.push(std::mem::take(&mut record));
            pending = false;
        } else if c == delimiter {
            record.push(std::mem::take(&mut field));
            pending = true;
        } else {
            field.push(c);
            pending = true;
        }
    }

    if pending {
        record.push(field);
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::QuoteMode;

    fn none_format() -> CsvFormat {
        CsvFormat::default().with_quoting(QuoteMode::None)
    }

    #[test]
    fn test_plain_field_is_borrowed() {
        let format = none_format();
        assert!(matches!(escape_field("plain text", &format), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_special_characters() {
        let format = none_format();
        assert_eq!(escape_field("a,b", &format), "a\\,b");
        assert_eq!(escape_field("say \"hi\"", &format), "say \\\"hi\\\"");
        assert_eq!(escape_field("line\nbreak", &format), "line\\\nbreak");
        assert_eq!(escape_field("back\\slash", &format), "back\\\\slash");
    }

    #[test]
    fn test_escape_custom_terminator() {
        let format = none_format().with_terminator(LineTerminator::Byte(b';'));
        assert_eq!(escape_field("a;b", &format), "a\\;b");
    }

    #[test]
    fn test_split_records_unescapes() {
        let format = none_format();
        let records = split_records("id,name\n1,a\\,b\n2,x\\\ny\n", &format);
        assert_eq!(
            records,
            vec![
                vec!["id".to_string(), "name".to_string()],
                vec!["1".to_string(), "a,b".to_string()],
                vec!["2".to_string(), "x\ny".to_string()],
            ]
        );
    }

    #[test]
    fn test_split_records_crlf() {
        let format = none_format().with_terminator(LineTerminator::CrLf);
        let records = split_records("a,b\r\n1,\\\r\\\n\r\n", &format);
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["1".to_string(), "\r\n".to_string()],
            ]
        );
    }

    #[test]
    fn test_split_records_without_trailing_terminator() {
        let format = none_format();
        let records = split_records("a,b\n1,2", &format);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_split_records_empty_fields() {
        let format = none_format();
        let records = split_records("a,b\n,\n", &format);
        assert_eq!(records[1], vec![String::new(), String::new()]);
    }
}
