//! Invariant checks over a whole document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::{check_field, Document};
use crate::error::SharedParamError;
use crate::models::{Entry, Guid, Section};

/// Which invariant a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Format,
    Reference,
    Duplicate,
}

/// A broken invariant, located by its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub line: usize,
    pub message: String,
}

impl Violation {
    /// Invariant errors map back to violations; other errors do not.
    pub fn from_error(err: SharedParamError) -> Option<Self> {
        let (kind, line, message) = match err {
            SharedParamError::Format { line, message } => (ViolationKind::Format, line, message),
            SharedParamError::Reference { line, message } => (ViolationKind::Reference, line, message),
            SharedParamError::Duplicate { line, message } => (ViolationKind::Duplicate, line, message),
            _ => return None,
        };
        Some(Self { kind, line, message })
    }

    pub fn into_error(self) -> SharedParamError {
        match self.kind {
            ViolationKind::Format => SharedParamError::format(self.line, self.message),
            ViolationKind::Reference => SharedParamError::reference(self.line, self.message),
            ViolationKind::Duplicate => SharedParamError::duplicate(self.line, self.message),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Advisory finding that does not make the file unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Validation result with details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn add_violation(&mut self, kind: ViolationKind, line: usize, message: impl Into<String>) {
        self.violations.push(Violation {
            kind,
            line,
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, line: usize, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            line,
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.violations.extend(other.violations);
        self.warnings.extend(other.warnings);
    }

    /// The violation on the earliest line, as an error.
    pub fn first_error(&self) -> Option<SharedParamError> {
        self.violations
            .iter()
            .min_by_key(|v| v.line)
            .cloned()
            .map(Violation::into_error)
    }

    fn push_error(&mut self, err: SharedParamError) {
        if let Some(violation) = Violation::from_error(err) {
            self.violations.push(violation);
        }
    }

    fn sort(&mut self) {
        self.violations.sort_by_key(|v| v.line);
        self.warnings.sort_by_key(|w| w.line);
    }
}

/// Validator for shared parameter documents.
pub struct SharedParamValidator;

impl SharedParamValidator {
    /// Check every invariant of the document. Never mutates it.
    pub fn validate(doc: &Document) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.merge(Self::validate_meta(doc));
        result.merge(Self::validate_groups(doc));
        result.merge(Self::validate_params(doc));

        result.sort();
        result
    }

    /// Exactly one META row, ahead of any other record.
    pub fn validate_meta(doc: &Document) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut seen_meta = false;
        let mut seen_other_data = false;

        for (index, entry) in doc.entries().iter().enumerate() {
            let line = index + 1;
            match entry {
                Entry::Meta(_) if seen_meta => {
                    result.add_violation(ViolationKind::Format, line, "more than one META row");
                }
                Entry::Meta(_) => {
                    seen_meta = true;
                    if seen_other_data {
                        result.add_violation(
                            ViolationKind::Format,
                            line,
                            "META row must be the first data line",
                        );
                    }
                }
                e if e.is_data() => seen_other_data = true,
                _ => {}
            }
        }

        if !seen_meta {
            let line = doc
                .entries()
                .iter()
                .position(|e| *e == Entry::Header(Section::Meta))
                .map_or(1, |i| i + 1);
            result.add_violation(ViolationKind::Format, line, "missing META row");
        }

        result
    }

    /// Group ids positive and unique, names free of separators.
    pub fn validate_groups(doc: &Document) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut declared: HashMap<u32, usize> = HashMap::new();

        for (index, entry) in doc.entries().iter().enumerate() {
            let Entry::Group(group) = entry else { continue };
            let line = index + 1;

            if group.id == 0 {
                result.add_violation(ViolationKind::Format, line, "group id must be positive");
            }
            if let Err(err) = check_field(line, "group name", &group.name) {
                result.push_error(err);
            }
            if let Some(first) = declared.get(&group.id) {
                result.add_violation(
                    ViolationKind::Duplicate,
                    line,
                    format!("group id {} already declared on line {}", group.id, first),
                );
            } else {
                declared.insert(group.id, line);
            }

            if doc.params_in_group(group.id).next().is_none() {
                result.add_warning(line, format!("group '{}' has no parameters", group.name));
            }
        }

        if declared.is_empty() {
            let line = doc
                .entries()
                .iter()
                .position(|e| *e == Entry::Header(Section::Group))
                .map_or(1, |i| i + 1);
            result.add_warning(line, "file declares no groups");
        }

        result
    }

    /// GUIDs unique, names non-empty, group references resolvable.
    pub fn validate_params(doc: &Document) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut guids: HashMap<Guid, usize> = HashMap::new();
        let mut names: HashMap<&str, usize> = HashMap::new();

        for (index, entry) in doc.entries().iter().enumerate() {
            let Entry::Param(param) = entry else { continue };
            let line = index + 1;

            if param.name.trim().is_empty() {
                result.add_violation(ViolationKind::Format, line, "parameter name is empty");
            } else if param.name.trim() != param.name {
                result.add_warning(
                    line,
                    format!("parameter name '{}' has surrounding whitespace", param.name),
                );
            }

            for (what, value) in [
                ("parameter name", param.name.as_str()),
                ("description", param.description.as_str()),
                ("data category", param.data_category.as_deref().unwrap_or_default()),
            ] {
                if let Err(err) = check_field(line, what, value) {
                    result.push_error(err);
                }
            }

            if let Some(first) = guids.get(&param.guid) {
                result.add_violation(
                    ViolationKind::Duplicate,
                    line,
                    format!("GUID {} already used on line {}", param.guid, first),
                );
            } else {
                guids.insert(param.guid, line);
            }

            if doc.group(param.group).is_none() {
                result.add_violation(
                    ViolationKind::Reference,
                    line,
                    format!(
                        "parameter '{}' references undeclared group {}",
                        param.name, param.group
                    ),
                );
            }

            if let Some(first) = names.get(param.name.as_str()) {
                result.add_warning(
                    line,
                    format!("parameter name '{}' also used on line {}", param.name, first),
                );
            } else {
                names.insert(&param.name, line);
            }

            if !param.data_type.is_known() {
                result.add_warning(
                    line,
                    format!("unrecognized data type '{}'", param.data_type),
                );
            }
            match (&param.data_category, param.data_type.takes_category()) {
                (None, true) => result.add_warning(
                    line,
                    format!("FAMILYTYPE parameter '{}' has no data category", param.name),
                ),
                (Some(_), false) => result.add_warning(
                    line,
                    format!(
                        "data category is ignored for {} parameter '{}'",
                        param.data_type, param.name
                    ),
                ),
                _ => {}
            }
        }

        result
    }
}
