//! Shared parameter file parsing.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::document::Document;
use crate::encoding;
use crate::error::{SharedParamError, SharedParamResult};
use crate::models::{
    DataType, Entry, GroupRecord, Guid, LineEnding, MetaRecord, ParamRecord, Section, TextEncoding,
};
use crate::validator::SharedParamValidator;

/// Reader for shared parameter files.
pub struct SharedParamReader;

impl SharedParamReader {
    /// Read and parse a file, detecting its encoding from the BOM.
    pub fn read(path: impl AsRef<Path>) -> SharedParamResult<Document> {
        Self::checked(Self::read_unchecked(path)?)
    }

    /// Read a file, checking only its line structure.
    ///
    /// The document may still break reference or duplicate invariants;
    /// run [`SharedParamValidator::validate`] on it to list them all.
    pub fn read_unchecked(path: impl AsRef<Path>) -> SharedParamResult<Document> {
        let path = path.as_ref();
        debug!("Reading shared parameter file from {:?}", path);

        let bytes = fs::read(path)?;
        Self::from_bytes_unchecked(&bytes)
    }

    /// Parse raw file bytes (UTF-8, UTF-8 with BOM or UTF-16 with BOM).
    pub fn from_bytes(bytes: &[u8]) -> SharedParamResult<Document> {
        Self::checked(Self::from_bytes_unchecked(bytes)?)
    }

    pub fn from_bytes_unchecked(bytes: &[u8]) -> SharedParamResult<Document> {
        let (text, encoding) = encoding::decode(bytes)?;
        let mut doc = Self::parse_unchecked(&text)?;
        doc.set_encoding(encoding);
        Ok(doc)
    }

    /// Parse text into a document.
    ///
    /// Fails on the earliest line that breaks a format, reference or
    /// duplicate invariant.
    pub fn parse(text: &str) -> SharedParamResult<Document> {
        Self::checked(Self::parse_unchecked(text)?)
    }

    /// Parse text into a document, failing only on malformed lines
    /// (headers, row kinds, field counts and field values).
    pub fn parse_unchecked(text: &str) -> SharedParamResult<Document> {
        let (text, encoding) = match text.strip_prefix('\u{feff}') {
            Some(rest) => (rest, TextEncoding::Utf8Bom),
            None => (text, TextEncoding::Utf8),
        };

        let line_ending = match text.find('\n') {
            Some(i) if text[..i].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        };
        let trailing_newline = text.ends_with('\n');

        let body = if trailing_newline {
            &text[..text.len() - 1]
        } else {
            text
        };

        let mut parser = LineParser::default();
        let mut entries = Vec::new();
        if !text.is_empty() {
            let lines: Vec<&str> = body.split('\n').collect();
            let last = lines.len() - 1;
            for (index, raw) in lines.into_iter().enumerate() {
                let line = index + 1;
                // An unterminated last line keeps any '\r' as content.
                let raw = if index < last || trailing_newline {
                    terminated_line(line, raw, line_ending)?
                } else {
                    raw
                };
                entries.push(parser.parse_line(line, raw)?);
            }
        }

        debug!("Parsed {} lines", entries.len());
        Ok(Document::from_entries(entries, encoding, line_ending, trailing_newline))
    }

    fn checked(doc: Document) -> SharedParamResult<Document> {
        let result = SharedParamValidator::validate(&doc);
        if let Some(err) = result.first_error() {
            return Err(err);
        }

        debug!(
            "Parsed {} groups and {} parameters",
            doc.groups().count(),
            doc.params().count()
        );
        Ok(doc)
    }
}

/// Tracks the section the parser is in while walking lines.
#[derive(Default)]
struct LineParser {
    current: Option<Section>,
}

impl LineParser {
    fn parse_line(&mut self, line: usize, raw: &str) -> SharedParamResult<Entry> {
        if raw.trim().is_empty() {
            return Ok(Entry::Blank(raw.to_string()));
        }
        if raw.starts_with('#') {
            return Ok(Entry::Comment(raw.to_string()));
        }
        if raw.starts_with('*') {
            return self.parse_header(line, raw);
        }
        self.parse_row(line, raw)
    }

    fn parse_header(&mut self, line: usize, raw: &str) -> SharedParamResult<Entry> {
        let mut fields = raw.split('\t');
        let marker = fields.next().unwrap_or_default();
        let section = Section::from_marker(marker).ok_or_else(|| {
            SharedParamError::format(line, format!("unknown section header '{}'", marker))
        })?;

        let columns: Vec<&str> = fields.collect();
        if columns != section.columns() {
            return Err(SharedParamError::format(
                line,
                format!(
                    "{} header declares columns [{}], expected [{}]",
                    section,
                    columns.join(", "),
                    section.columns().join(", ")
                ),
            ));
        }

        if let Some(current) = self.current {
            if section == current {
                return Err(SharedParamError::format(
                    line,
                    format!("{} section declared twice", section),
                ));
            }
            if section < current {
                return Err(SharedParamError::format(
                    line,
                    format!("{} section must come before {}", section, current),
                ));
            }
        }

        self.current = Some(section);
        Ok(Entry::Header(section))
    }

    fn parse_row(&self, line: usize, raw: &str) -> SharedParamResult<Entry> {
        let fields: Vec<&str> = raw.split('\t').collect();
        let kind = fields[0];

        let section = Section::from_row_kind(kind)
            .ok_or_else(|| SharedParamError::format(line, format!("unknown record kind '{}'", kind)))?;
        let current = self.current.ok_or_else(|| {
            SharedParamError::format(line, format!("{} row before any section header", kind))
        })?;
        if section != current {
            return Err(SharedParamError::format(
                line,
                format!("{} row inside {} section", kind, current),
            ));
        }

        let values = &fields[1..];
        if values.len() != section.field_count() {
            return Err(SharedParamError::format(
                line,
                format!(
                    "{} row has {} fields, expected {}",
                    kind,
                    values.len(),
                    section.field_count()
                ),
            ));
        }

        let entry = match section {
            Section::Meta => Entry::Meta(MetaRecord {
                version: parse_number(line, "VERSION", values[0])?,
                min_version: parse_number(line, "MINVERSION", values[1])?,
            }),
            Section::Group => Entry::Group(GroupRecord {
                id: parse_number(line, "ID", values[0])?,
                name: values[1].to_string(),
            }),
            Section::Param => Entry::Param(ParamRecord {
                guid: parse_field::<Guid>(line, "GUID", values[0])?,
                name: values[1].to_string(),
                data_type: parse_field::<DataType>(line, "DATATYPE", values[2])?,
                data_category: Some(values[3])
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
                group: parse_number(line, "GROUP", values[4])?,
                visible: parse_flag(line, "VISIBLE", values[5])?,
                description: values[6].to_string(),
                user_modifiable: parse_flag(line, "USERMODIFIABLE", values[7])?,
                hide_when_no_value: parse_flag(line, "HIDEWHENNOVALUE", values[8])?,
            }),
        };
        Ok(entry)
    }
}

/// Strip the line terminator's '\r', requiring every line to end the same
/// way as the first so the file can be written back unchanged.
fn terminated_line(line: usize, raw: &str, line_ending: LineEnding) -> SharedParamResult<&str> {
    match (raw.strip_suffix('\r'), line_ending) {
        (Some(stripped), LineEnding::CrLf) => Ok(stripped),
        (None, LineEnding::Lf) => Ok(raw),
        (Some(_), LineEnding::Lf) => Err(SharedParamError::format(
            line,
            "line ends with CRLF but the file uses LF line endings",
        )),
        (None, LineEnding::CrLf) => Err(SharedParamError::format(
            line,
            "line ends with LF but the file uses CRLF line endings",
        )),
    }
}

/// Integers must be written in canonical decimal form (no sign on zero,
/// no '+', no leading zeros), so they are rewritten exactly as read.
fn parse_number<T>(line: usize, column: &str, value: &str) -> SharedParamResult<T>
where
    T: FromStr + std::fmt::Display,
{
    let parsed: T = value.parse().map_err(|_| {
        SharedParamError::format(line, format!("{} '{}' is not a valid integer", column, value))
    })?;
    if parsed.to_string() != value {
        return Err(SharedParamError::format(
            line,
            format!("{} '{}' is not a canonical integer", column, value),
        ));
    }
    Ok(parsed)
}

fn parse_flag(line: usize, column: &str, value: &str) -> SharedParamResult<bool> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(SharedParamError::format(
            line,
            format!("{} must be 0 or 1, found '{}'", column, value),
        )),
    }
}

fn parse_field<T>(line: usize, column: &str, value: &str) -> SharedParamResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| SharedParamError::format(line, format!("{}: {}", column, e)))
}
