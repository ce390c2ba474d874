//! # sparam_format
//!
//! Reading, validating, editing and writing Revit shared parameter files.
//!
//! A shared parameter file is tab-separated text with three sections:
//!
//! ```text
//! # This is a Revit shared parameter file.
//! # Do not edit manually.
//! *META    VERSION  MINVERSION
//! META     2        1
//! *GROUP   ID       NAME
//! GROUP    1        Data
//! *PARAM   GUID     NAME  DATATYPE  DATACATEGORY  GROUP  VISIBLE  DESCRIPTION  USERMODIFIABLE  HIDEWHENNOVALUE
//! PARAM    ...
//! ```
//!
//! ## Features
//!
//! - **Parsing**: line-numbered format, reference and duplicate errors
//! - **Round-trip**: comments, blank lines, line endings and encoding are kept,
//!   so an unmodified document is written back byte for byte
//! - **Editing**: add, update and remove groups and parameters with the file
//!   invariants re-checked before each change
//! - **Validation**: every violated invariant plus advisory warnings
//!
//! ## Example
//!
//! ```rust,no_run
//! use sparam_format::{DataType, Guid, ParamRecord};
//!
//! let mut doc = sparam_format::read("./SharedParameters.txt").unwrap();
//!
//! let group = doc.group_by_name("Data").map(|g| g.id).unwrap_or(1);
//! doc.add_param(
//!     ParamRecord::new(Guid::new_v4(), "Flamingo.Sheet.Reviewer", DataType::Text, group)
//!         .with_description("Reviewer initials"),
//! )
//! .unwrap();
//!
//! let result = sparam_format::validate(&doc);
//! assert!(result.is_valid());
//!
//! sparam_format::write(&doc, "./SharedParameters.txt").unwrap();
//! ```

pub mod document;
pub mod encoding;
pub mod error;
pub mod models;
pub mod reader;
pub mod validator;
pub mod writer;

use std::path::Path;

pub use document::Document;
pub use error::{SharedParamError, SharedParamResult};
pub use models::*;
pub use reader::SharedParamReader;
pub use validator::{SharedParamValidator, ValidationResult, ValidationWarning, Violation, ViolationKind};
pub use writer::SharedParamWriter;

/// Read a shared parameter file.
pub fn read(path: impl AsRef<Path>) -> SharedParamResult<Document> {
    SharedParamReader::read(path)
}

/// Atomically replace a shared parameter file with the document.
pub fn write(doc: &Document, path: impl AsRef<Path>) -> SharedParamResult<()> {
    SharedParamWriter::write(doc, path)
}

/// List the invariants the document violates, plus warnings.
pub fn validate(doc: &Document) -> ValidationResult {
    SharedParamValidator::validate(doc)
}
