//! CSV row codec for the cat table
//!
//! The table file is UTF-8 text:
//!
//! ```text
//! ID,Name,Image,Description,Gender,Observations
//! 1,Tom,tom.png,orange cat,male,none
//! 2,Felix,felix.png,"black, white","male","likes ""tuna""
//! and naps"
//! ```
//!
//! Fields containing a comma, a double quote, CR or LF are quoted and inner
//! quotes are doubled. Rows end with `\n`. A quoted field may span lines, so
//! a row is a logical record rather than a physical line.
//!
//! Every function here is pure.

use super::errors::{TableError, TableResult};
use super::record::{CatFields, CatRecord};

/// Canonical column titles, in on-disk order.
pub const HEADER: [&str; 6] = ["ID", "Name", "Image", "Description", "Gender", "Observations"];

/// Number of columns in every row, header included.
pub const COLUMN_COUNT: usize = HEADER.len();

/// One tokenized row, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line on which the row starts
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }
}

/// Returns the header row, newline included.
pub fn encode_header() -> String {
    join_row(HEADER.iter().copied())
}

/// Encodes one record as a data row, newline included.
pub fn encode_row(record: &CatRecord) -> String {
    let id = record.id.to_string();
    let fields = &record.fields;
    join_row([
        id.as_str(),
        fields.name.as_str(),
        fields.image.as_str(),
        fields.description.as_str(),
        fields.gender.as_str(),
        fields.observations.as_str(),
    ])
}

/// Encodes a whole table: the header followed by every row.
pub fn encode_table(records: &[CatRecord]) -> String {
    let mut out = encode_header();
    for record in records {
        out.push_str(&encode_row(record));
    }
    out
}

/// Decodes one data row into a record.
///
/// # Errors
///
/// `MalformedRow` if the row does not have exactly six columns or the id is
/// not a non-negative integer.
pub fn decode_row(raw: &RawRow) -> TableResult<CatRecord> {
    if raw.fields.len() != COLUMN_COUNT {
        return Err(TableError::malformed(
            raw.line,
            format!(
                "expected {} columns, found {}",
                COLUMN_COUNT,
                raw.fields.len()
            ),
        ));
    }

    let id = raw.fields[0].parse::<u64>().map_err(|_| {
        TableError::malformed(raw.line, format!("invalid id '{}'", raw.fields[0]))
    })?;

    let fields = CatFields::new(
        raw.fields[1].clone(),
        raw.fields[2].clone(),
        raw.fields[3].clone(),
        raw.fields[4].clone(),
        raw.fields[5].clone(),
    );

    Ok(CatRecord::new(id, fields))
}

/// Decodes a whole table text: a header row and zero or more data rows.
///
/// Empty text is an empty table. A leading UTF-8 BOM is ignored.
pub fn decode_table(text: &str) -> TableResult<Vec<CatRecord>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text)?.into_iter();

    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    if header.fields.len() != COLUMN_COUNT
        || header.fields.iter().zip(HEADER.iter()).any(|(a, b)| a != b)
    {
        return Err(TableError::malformed(
            header.line,
            format!("unexpected header '{}'", header.fields.join(",")),
        ));
    }

    rows.map(|raw| decode_row(&raw)).collect()
}

/// Returns whether `text` holds at least one row, the header.
///
/// Blank lines and a leading BOM do not count.
pub fn has_header(text: &str) -> TableResult<bool> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(!split_rows(text)?.is_empty())
}

/// Splits table text into raw rows, honouring quoted fields.
///
/// Blank lines are skipped. A quoted field that never closes, or text after
/// a closing quote, is a `MalformedRow`.
pub fn split_rows(text: &str) -> TableResult<Vec<RawRow>> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();

    let mut line = 1;
    let mut row_start = 1;
    let mut in_quotes = false;
    let mut after_quote = false;
    let mut has_content = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    after_quote = true;
                }
                c => {
                    if c == '\n' {
                        line += 1;
                    }
                    field.push(c);
                }
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !after_quote => {
                in_quotes = true;
                has_content = true;
            }
            '"' => {
                return Err(TableError::malformed(line, "unexpected quote in unquoted field"));
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                after_quote = false;
                has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if has_content {
                    fields.push(std::mem::take(&mut field));
                    rows.push(RawRow::new(row_start, std::mem::take(&mut fields)));
                }
                line += 1;
                row_start = line;
                after_quote = false;
                has_content = false;
            }
            _ if after_quote => {
                return Err(TableError::malformed(
                    line,
                    "unexpected character after closing quote",
                ));
            }
            c => {
                field.push(c);
                has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(TableError::malformed(row_start, "unterminated quoted field"));
    }

    if has_content {
        fields.push(field);
        rows.push(RawRow::new(row_start, fields));
    }

    Ok(rows)
}

fn join_row<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(&mut out, value);
    }
    out.push('\n');
    out
}

fn push_field(out: &mut String, value: &str) {
    if !value.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n')) {
        out.push_str(value);
        return;
    }

    out.push('"');
    for c in value.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}
