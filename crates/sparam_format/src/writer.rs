//! Shared parameter file writing.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::document::Document;
use crate::encoding;
use crate::error::SharedParamResult;
use crate::models::{Entry, GroupRecord, MetaRecord, ParamRecord, Section};

/// Writer for shared parameter files.
pub struct SharedParamWriter;

impl SharedParamWriter {
    /// Render the document as text, using its line ending.
    pub fn to_string(doc: &Document) -> String {
        let newline = doc.line_ending().as_str();
        let mut out = doc
            .entries()
            .iter()
            .map(Self::render_entry)
            .collect::<Vec<_>>()
            .join(newline);
        if doc.trailing_newline() && !doc.entries().is_empty() {
            out.push_str(newline);
        }
        out
    }

    /// Render the document in the encoding it was read with.
    pub fn to_bytes(doc: &Document) -> Vec<u8> {
        encoding::encode(&Self::to_string(doc), doc.encoding())
    }

    /// Replace the file at `path` with the document.
    ///
    /// The content goes to a temporary file in the same directory that is
    /// then renamed over the target, so a failure leaves the old file intact.
    pub fn write(doc: &Document, path: impl AsRef<Path>) -> SharedParamResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        debug!("Writing shared parameter file to {:?}", path);

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&Self::to_bytes(doc))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Records of the document as JSON.
    pub fn to_json(doc: &Document, pretty: bool) -> SharedParamResult<String> {
        let export = JsonExport {
            meta: doc.meta(),
            groups: doc.groups().collect(),
            params: doc.params().collect(),
        };
        let json = if pretty {
            serde_json::to_string_pretty(&export)?
        } else {
            serde_json::to_string(&export)?
        };
        Ok(json)
    }

    fn render_entry(entry: &Entry) -> String {
        match entry {
            Entry::Blank(raw) | Entry::Comment(raw) => raw.clone(),
            Entry::Header(section) => Self::render_header(*section),
            Entry::Meta(meta) => Self::render_meta(meta),
            Entry::Group(group) => Self::render_group(group),
            Entry::Param(param) => Self::render_param(param),
        }
    }

    fn render_header(section: Section) -> String {
        std::iter::once(section.marker())
            .chain(section.columns().iter().copied())
            .collect::<Vec<_>>()
            .join("\t")
    }

    fn render_meta(meta: &MetaRecord) -> String {
        format!("META\t{}\t{}", meta.version, meta.min_version)
    }

    fn render_group(group: &GroupRecord) -> String {
        format!("GROUP\t{}\t{}", group.id, group.name)
    }

    fn render_param(param: &ParamRecord) -> String {
        format!(
            "PARAM\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            param.guid,
            param.name,
            param.data_type,
            param.data_category.as_deref().unwrap_or_default(),
            param.group,
            flag(param.visible),
            param.description,
            flag(param.user_modifiable),
            flag(param.hide_when_no_value),
        )
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    meta: Option<&'a MetaRecord>,
    groups: Vec<&'a GroupRecord>,
    params: Vec<&'a ParamRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, Guid, LineEnding};

    #[test]
    fn test_new_document_text() {
        let mut doc = Document::default();
        doc.add_group(GroupRecord::new(1, "Data")).unwrap();
        doc.set_line_ending(LineEnding::Lf);

        let text = SharedParamWriter::to_string(&doc);
        assert_eq!(
            text,
            "# This is a Revit shared parameter file.\n\
# Do not edit manually.\n\
*META\tVERSION\tMINVERSION\n\
META\t2\t1\n\
*GROUP\tID\tNAME\n\
GROUP\t1\tData\n\
*PARAM\tGUID\tNAME\tDATATYPE\tDATACATEGORY\tGROUP\tVISIBLE\tDESCRIPTION\tUSERMODIFIABLE\tHIDEWHENNOVALUE\n"
        );
    }

    #[test]
    fn test_param_column_order() {
        let guid: Guid = "8d3f0c1a-42b7-4c59-9e21-6a7b8c9d0e1f".parse().unwrap();
        let param = ParamRecord::new(guid, "Flamingo.Door.Hardware", DataType::FamilyType, 3)
            .with_data_category("-2000023")
            .with_description("Hardware set")
            .read_only()
            .hide_when_no_value();

        assert_eq!(
            SharedParamWriter::render_param(&param),
            "PARAM\t8d3f0c1a-42b7-4c59-9e21-6a7b8c9d0e1f\tFlamingo.Door.Hardware\tFAMILYTYPE\t-2000023\t3\t1\tHardware set\t0\t1"
        );
    }

    #[test]
    fn test_json_export() {
        let mut doc = Document::default();
        doc.add_group(GroupRecord::new(1, "Data")).unwrap();
        doc.add_param(ParamRecord::new(
            "8d3f0c1a-42b7-4c59-9e21-6a7b8c9d0e1f".parse().unwrap(),
            "Flamingo.Sheet.Stamp",
            DataType::Image,
            1,
        ))
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&SharedParamWriter::to_json(&doc, false).unwrap()).unwrap();
        assert_eq!(json["meta"]["version"], 2);
        assert_eq!(json["groups"][0]["name"], "Data");
        assert_eq!(json["params"][0]["guid"], "8d3f0c1a-42b7-4c59-9e21-6a7b8c9d0e1f");
        assert_eq!(json["params"][0]["data_type"], "IMAGE");
    }
}
