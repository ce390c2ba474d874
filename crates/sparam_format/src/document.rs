//! In-memory shared parameter document.

use tracing::debug;

use crate::error::{SharedParamError, SharedParamResult};
use crate::models::{
    Entry, GroupRecord, Guid, LineEnding, MetaRecord, ParamRecord, Section, TextEncoding,
};

/// A shared parameter file held as an ordered list of lines.
///
/// Comments, blank lines and section headers are kept alongside the records
/// so the file can be written back unchanged. Line `n` of a parsed file is
/// entry `n - 1`.
///
/// Mutations check GUID and group id uniqueness and group references before
/// touching the entries; a rejected change leaves the document as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    entries: Vec<Entry>,
    encoding: TextEncoding,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(MetaRecord::default())
    }
}

impl Document {
    /// Comment lines Revit writes at the top of every file.
    pub const HEADER_COMMENTS: [&'static str; 2] = [
        "# This is a Revit shared parameter file.",
        "# Do not edit manually.",
    ];

    /// Create an empty document with the standard comments, the three
    /// section headers and a META row.
    pub fn new(meta: MetaRecord) -> Self {
        let mut entries: Vec<Entry> = Self::HEADER_COMMENTS
            .iter()
            .map(|c| Entry::Comment(c.to_string()))
            .collect();
        entries.push(Entry::Header(Section::Meta));
        entries.push(Entry::Meta(meta));
        entries.push(Entry::Header(Section::Group));
        entries.push(Entry::Header(Section::Param));

        Self {
            entries,
            encoding: TextEncoding::Utf8,
            line_ending: LineEnding::CrLf,
            trailing_newline: true,
        }
    }

    pub(crate) fn from_entries(
        entries: Vec<Entry>,
        encoding: TextEncoding,
        line_ending: LineEnding,
        trailing_newline: bool,
    ) -> Self {
        Self {
            entries,
            encoding,
            line_ending,
            trailing_newline,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    pub fn trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    // ---- read accessors ----

    pub fn meta(&self) -> Option<&MetaRecord> {
        self.entries.iter().find_map(|e| match e {
            Entry::Meta(meta) => Some(meta),
            _ => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupRecord> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Group(group) => Some(group),
            _ => None,
        })
    }

    pub fn params(&self) -> impl Iterator<Item = &ParamRecord> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Param(param) => Some(param),
            _ => None,
        })
    }

    pub fn group(&self, id: u32) -> Option<&GroupRecord> {
        self.groups().find(|g| g.id == id)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&GroupRecord> {
        self.groups().find(|g| g.name == name)
    }

    pub fn param(&self, guid: &Guid) -> Option<&ParamRecord> {
        self.params().find(|p| p.guid == *guid)
    }

    pub fn param_by_name(&self, name: &str) -> Option<&ParamRecord> {
        self.params().find(|p| p.name == name)
    }

    pub fn params_in_group(&self, id: u32) -> impl Iterator<Item = &ParamRecord> {
        self.params().filter(move |p| p.group == id)
    }

    /// Smallest id greater than every declared group id.
    pub fn next_group_id(&self) -> u32 {
        self.groups().map(|g| g.id).max().map_or(1, |id| id.saturating_add(1))
    }

    /// 1-based line of the GROUP row with the given id.
    pub fn line_of_group(&self, id: u32) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Entry::Group(g) if g.id == id))
            .map(|i| i + 1)
    }

    /// 1-based line of the PARAM row with the given GUID.
    pub fn line_of_param(&self, guid: &Guid) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Entry::Param(p) if p.guid == *guid))
            .map(|i| i + 1)
    }

    // ---- mutations ----

    /// Replace the META row, adding one after the `*META` header if absent.
    pub fn set_meta(&mut self, meta: MetaRecord) {
        if let Some(existing) = self.entries.iter_mut().find_map(|e| match e {
            Entry::Meta(m) => Some(m),
            _ => None,
        }) {
            *existing = meta;
            return;
        }
        self.insert_row(Section::Meta, Entry::Meta(meta));
    }

    /// Add a group after the last GROUP row.
    pub fn add_group(&mut self, group: GroupRecord) -> SharedParamResult<()> {
        if let Some(line) = self.line_of_group(group.id) {
            return Err(SharedParamError::duplicate(
                line,
                format!("group id {} is already declared", group.id),
            ));
        }

        let line = self.next_line_for(Section::Group);
        if group.id == 0 {
            return Err(SharedParamError::format(line, "group id must be positive"));
        }
        check_field(line, "group name", &group.name)?;

        debug!("Adding group {} '{}' at line {}", group.id, group.name, line);
        self.insert_row(Section::Group, Entry::Group(group));
        Ok(())
    }

    pub fn rename_group(&mut self, id: u32, name: impl Into<String>) -> SharedParamResult<()> {
        let name = name.into();
        let line = self
            .line_of_group(id)
            .ok_or_else(|| SharedParamError::NotFound(format!("group {}", id)))?;
        check_field(line, "group name", &name)?;

        if let Entry::Group(group) = &mut self.entries[line - 1] {
            debug!("Renaming group {} from '{}' to '{}'", id, group.name, name);
            group.name = name;
        }
        Ok(())
    }

    /// Remove a group that no parameter references.
    pub fn remove_group(&mut self, id: u32) -> SharedParamResult<GroupRecord> {
        let line = self
            .line_of_group(id)
            .ok_or_else(|| SharedParamError::NotFound(format!("group {}", id)))?;

        if let Some(param) = self.params_in_group(id).next() {
            let param_line = self.line_of_param(&param.guid).unwrap_or(line);
            return Err(SharedParamError::reference(
                param_line,
                format!("parameter '{}' still references group {}", param.name, id),
            ));
        }

        match self.entries.remove(line - 1) {
            Entry::Group(group) => {
                debug!("Removed group {} '{}'", group.id, group.name);
                Ok(group)
            }
            _ => unreachable!("line_of_group points at a GROUP entry"),
        }
    }

    /// Add a parameter after the last PARAM row.
    pub fn add_param(&mut self, param: ParamRecord) -> SharedParamResult<()> {
        if let Some(line) = self.line_of_param(&param.guid) {
            return Err(SharedParamError::duplicate(
                line,
                format!("GUID {} is already used by another parameter", param.guid),
            ));
        }

        let line = self.next_line_for(Section::Param);
        self.check_param(line, &param)?;

        debug!("Adding parameter '{}' ({}) at line {}", param.name, param.guid, line);
        self.insert_row(Section::Param, Entry::Param(param));
        Ok(())
    }

    /// Replace the parameter that has the same GUID.
    pub fn update_param(&mut self, param: ParamRecord) -> SharedParamResult<ParamRecord> {
        let line = self
            .line_of_param(&param.guid)
            .ok_or_else(|| SharedParamError::NotFound(format!("parameter {}", param.guid)))?;
        self.check_param(line, &param)?;

        debug!("Updating parameter '{}' ({})", param.name, param.guid);
        match std::mem::replace(&mut self.entries[line - 1], Entry::Param(param)) {
            Entry::Param(previous) => Ok(previous),
            _ => unreachable!("line_of_param points at a PARAM entry"),
        }
    }

    pub fn remove_param(&mut self, guid: &Guid) -> SharedParamResult<ParamRecord> {
        let line = self
            .line_of_param(guid)
            .ok_or_else(|| SharedParamError::NotFound(format!("parameter {}", guid)))?;

        match self.entries.remove(line - 1) {
            Entry::Param(param) => {
                debug!("Removed parameter '{}' ({})", param.name, param.guid);
                Ok(param)
            }
            _ => unreachable!("line_of_param points at a PARAM entry"),
        }
    }

    fn check_param(&self, line: usize, param: &ParamRecord) -> SharedParamResult<()> {
        if param.name.trim().is_empty() {
            return Err(SharedParamError::format(line, "parameter name is empty"));
        }
        check_field(line, "parameter name", &param.name)?;
        check_field(line, "description", &param.description)?;
        if let Some(category) = &param.data_category {
            check_field(line, "data category", category)?;
        }

        if self.group(param.group).is_none() {
            return Err(SharedParamError::reference(
                line,
                format!(
                    "parameter '{}' references undeclared group {}",
                    param.name, param.group
                ),
            ));
        }
        Ok(())
    }

    /// Index at which a new row of `section` goes (after the last row of
    /// that kind, else right after its header) and whether the header is
    /// missing and must be inserted there first.
    fn slot_for(&self, section: Section) -> (usize, bool) {
        if let Some(last) = self.entries.iter().rposition(|e| e.section() == Some(section)) {
            return (last + 1, false);
        }
        if let Some(header) = self
            .entries
            .iter()
            .position(|e| *e == Entry::Header(section))
        {
            return (header + 1, false);
        }

        let at = self
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Header(s) if *s > section))
            .unwrap_or(self.entries.len());
        (at, true)
    }

    /// 1-based line a new row of `section` would land on.
    fn next_line_for(&self, section: Section) -> usize {
        let (index, missing_header) = self.slot_for(section);
        index + 1 + usize::from(missing_header)
    }

    fn insert_row(&mut self, section: Section, entry: Entry) {
        let (index, missing_header) = self.slot_for(section);
        if missing_header {
            self.entries.insert(index, Entry::Header(section));
            self.entries.insert(index + 1, entry);
        } else {
            self.entries.insert(index, entry);
        }
    }
}

/// Field values end up between tabs on a single line.
pub(crate) fn check_field(line: usize, what: &str, value: &str) -> SharedParamResult<()> {
    if value.contains(['\t', '\r', '\n']) {
        return Err(SharedParamError::format(
            line,
            format!("{} must not contain tab or line-break characters", what),
        ));
    }
    Ok(())
}
