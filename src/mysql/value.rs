//! Rendering MySQL values as CSV field text.

use crate::source::Field;
use base64::Engine;
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Value};

/// Character set id MySQL reports for binary data
const BINARY_CHARSET: u16 = 63;

/// How the bytes of a column should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Character data, rendered as UTF-8 text
    Text,
    /// Binary strings and blobs, rendered as base64
    Binary,
    /// BIT(n), rendered as an unsigned integer
    Bit,
}

impl ColumnKind {
    pub fn of(column: &Column) -> Self {
        use ColumnType::*;

        match column.column_type() {
            MYSQL_TYPE_BIT => ColumnKind::Bit,
            MYSQL_TYPE_TINY_BLOB
            | MYSQL_TYPE_MEDIUM_BLOB
            | MYSQL_TYPE_LONG_BLOB
            | MYSQL_TYPE_BLOB
            | MYSQL_TYPE_STRING
            | MYSQL_TYPE_VAR_STRING
            | MYSQL_TYPE_VARCHAR
            | MYSQL_TYPE_GEOMETRY
                if column.character_set() == BINARY_CHARSET =>
            {
                ColumnKind::Binary
            }
            _ => ColumnKind::Text,
        }
    }
}

/// Render one value; `NULL` becomes `None`
pub fn render_value(value: &Value, kind: ColumnKind) -> Field {
    let text = match value {
        Value::NULL => return None,
        Value::Bytes(bytes) => match kind {
            ColumnKind::Text => String::from_utf8_lossy(bytes).into_owned(),
            ColumnKind::Binary => base64::engine::general_purpose::STANDARD.encode(bytes),
            ColumnKind::Bit => bytes
                .iter()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
                .to_string(),
        },
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut s = format!("{year:04}-{month:02}-{day:02}");
            if (*hour, *minute, *second, *micros) != (0, 0, 0, 0) {
                s.push_str(&format!(" {hour:02}:{minute:02}:{second:02}"));
                if *micros > 0 {
                    s.push_str(&format!(".{micros:06}"));
                }
            }
            s
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u64::from(*days) * 24 + u64::from(*hours);
            let mut s = format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
            if *micros > 0 {
                s.push_str(&format!(".{micros:06}"));
            }
            s
        }
    };
    Some(text)
}
