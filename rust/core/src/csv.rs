// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal RFC 4180 reading and writing for the link table exchange format.

use crate::error::{Error, Result};

/// Quotes a field when it holds a comma, quote or line break.
pub(crate) fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub(crate) fn write_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// One parsed row and the physical line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Splits CSV text into records. Blank lines are skipped; quoted fields may
/// span lines. A leading byte-order mark is ignored.
pub(crate) fn parse_records(text: &str) -> Result<Vec<Record>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut line = 1usize;
    let mut start = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            '"' => {
                return Err(Error::Csv {
                    line,
                    message: "unexpected quote inside unquoted field".to_string(),
                })
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' => {}
            '\n' => {
                finish_record(&mut records, start, &mut record, &mut field);
                field_started = false;
                line += 1;
                start = line;
            }
            _ => {
                field.push(c);
                field_started = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::Csv {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }
    finish_record(&mut records, start, &mut record, &mut field);
    Ok(records)
}

fn finish_record(
    records: &mut Vec<Record>,
    line: usize,
    record: &mut Vec<String>,
    field: &mut String,
) {
    if record.is_empty() && field.trim().is_empty() {
        field.clear();
        return;
    }
    record.push(std::mem::take(field));
    records.push(Record {
        line,
        fields: std::mem::take(record),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(escape_field("Pilar"), "Pilar");
        assert_eq!(escape_field("11,5X14X24 CM"), "\"11,5X14X24 CM\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn parses_quoted_fields_and_blank_lines() {
        let text = "a,b,c\r\n\n\"x, y\",\"He said \"\"no\"\"\",z\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].fields, ["x, y", "He said \"no\"", "z"]);
    }

    #[test]
    fn records_carry_their_starting_line() {
        let text = "h\n\n\"multi\nline\"\nlast\n";
        let lines: Vec<usize> = parse_records(text).unwrap().iter().map(|r| r.line).collect();
        assert_eq!(lines, [1, 3, 5]);
    }

    #[test]
    fn written_rows_parse_back() {
        let row = ["1", "Laje, Térreo", "multi\nline", ""];
        let records = parse_records(&write_row(&row)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, row);
    }

    #[test]
    fn reports_unterminated_quote() {
        let err = parse_records("a,\"open\nb").unwrap_err();
        assert!(matches!(err, Error::Csv { line: 2, .. }));
    }
}
