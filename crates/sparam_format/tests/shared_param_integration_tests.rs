//! Integration tests for reading, editing and writing shared parameter files.

use std::fs;
use tempfile::tempdir;

use sparam_format::{
    encoding, DataType, Entry, GroupRecord, Guid, LineEnding, ParamRecord, SharedParamError,
    SharedParamReader, SharedParamValidator, SharedParamWriter, TextEncoding,
};

/// The Flamingo title block parameters, as Revit writes them (LF endings
/// here; CRLF variants are derived in the tests).
const FLAMINGO_SAMPLE: &str = "# This is a Revit shared parameter file.\n\
# Do not edit manually.\n\
*META\tVERSION\tMINVERSION\n\
META\t2\t1\n\
*GROUP\tID\tNAME\n\
GROUP\t1\tData\n\
*PARAM\tGUID\tNAME\tDATATYPE\tDATACATEGORY\tGROUP\tVISIBLE\tDESCRIPTION\tUSERMODIFIABLE\tHIDEWHENNOVALUE\n\
PARAM\t3c6f2e51-8a4d-4b1f-9c2e-7d5a0b6e4f13\tFlamingo.TitleBlock.Margins\tTEXT\t\t1\t1\tTitle block margins in feet: top, right, bottom, left.\\r\\nUsed by Renumber Views.\t1\t0\n\
PARAM\ta91d7e04-25b6-4f8c-b3a0-5e2c9f1d6b87\tFlamingo.TitleBlock.MaxCellSize\tTEXT\t\t1\t1\tLargest grid cell, in feet, used when numbering views.\\r\\nLeave blank for the default.\t1\t0\n";

const MARGINS_GUID: &str = "3c6f2e51-8a4d-4b1f-9c2e-7d5a0b6e4f13";

fn crlf(text: &str) -> String {
    text.replace('\n', "\r\n")
}

/// Parsing the sample and writing it back is byte-identical.
#[test]
fn test_sample_round_trip_is_byte_identical() {
    let doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    assert_eq!(SharedParamWriter::to_string(&doc), FLAMINGO_SAMPLE);

    let windows = crlf(FLAMINGO_SAMPLE);
    let doc = SharedParamReader::parse(&windows).unwrap();
    assert_eq!(doc.line_ending(), LineEnding::CrLf);
    assert_eq!(SharedParamWriter::to_string(&doc), windows);
}

/// Both sample parameters land in group 1 "Data" and validate cleanly.
#[test]
fn test_sample_scenario_validates() {
    let doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();

    let names: Vec<_> = doc.params().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Flamingo.TitleBlock.Margins", "Flamingo.TitleBlock.MaxCellSize"]
    );
    for param in doc.params() {
        let group = doc.group(param.group).unwrap();
        assert_eq!(group.id, 1);
        assert_eq!(group.name, "Data");
    }

    let result = SharedParamValidator::validate(&doc);
    assert!(result.violations.is_empty(), "Violations: {:?}", result.violations);
}

/// Validation is side-effect free and repeatable.
#[test]
fn test_validation_is_idempotent() {
    let doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    let before = doc.clone();

    let first = sparam_format::validate(&doc);
    let second = sparam_format::validate(&doc);

    assert!(first.violations.is_empty());
    assert_eq!(first, second);
    assert_eq!(doc, before);
}

/// Adding a parameter with an existing GUID is rejected.
#[test]
fn test_duplicate_guid_is_rejected() {
    let mut doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    let guid: Guid = MARGINS_GUID.parse().unwrap();

    let err = doc
        .add_param(ParamRecord::new(guid, "Flamingo.TitleBlock.Other", DataType::Text, 1))
        .unwrap_err();

    assert!(matches!(err, SharedParamError::Duplicate { line: 8, .. }), "{:?}", err);
    assert_eq!(doc.params().count(), 2);
}

/// The same GUID in upper case is still a duplicate.
#[test]
fn test_duplicate_guid_ignores_case() {
    let mut doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    let guid: Guid = MARGINS_GUID.to_uppercase().parse().unwrap();

    let err = doc
        .add_param(ParamRecord::new(guid, "Flamingo.TitleBlock.Other", DataType::Text, 1))
        .unwrap_err();
    assert!(matches!(err, SharedParamError::Duplicate { .. }));
}

/// Adding a parameter in undeclared group 2 is rejected.
#[test]
fn test_undeclared_group_is_rejected() {
    let mut doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();

    let err = doc
        .add_param(ParamRecord::new(
            Guid::new_v4(),
            "Flamingo.TitleBlock.Scale",
            DataType::Number,
            2,
        ))
        .unwrap_err();

    assert!(matches!(err, SharedParamError::Reference { .. }), "{:?}", err);
    assert_eq!(doc.params().count(), 2);
}

/// A PARAM line with 8 fields names its line number.
#[test]
fn test_short_param_row_names_line() {
    let text = FLAMINGO_SAMPLE.replace("\tLeave blank for the default.\t1\t0", "\tLeave blank for the default.\t1");
    let err = SharedParamReader::parse(&text).unwrap_err();

    match err {
        SharedParamError::Format { line, message } => {
            assert_eq!(line, 9);
            assert!(message.contains("8 fields"), "{}", message);
        }
        other => panic!("expected format error, got {:?}", other),
    }
}

/// Duplicate and dangling references inside a file are caught on read.
#[test]
fn test_file_level_invariants() {
    let duplicated = FLAMINGO_SAMPLE.replace("a91d7e04-25b6-4f8c-b3a0-5e2c9f1d6b87", MARGINS_GUID);
    let err = SharedParamReader::parse(&duplicated).unwrap_err();
    assert!(matches!(err, SharedParamError::Duplicate { line: 9, .. }));

    let dangling = FLAMINGO_SAMPLE.replace("\tTEXT\t\t1\t1\tLargest", "\tTEXT\t\t2\t1\tLargest");
    let err = SharedParamReader::parse(&dangling).unwrap_err();
    assert!(matches!(err, SharedParamError::Reference { line: 9, .. }));

    let repeated_group = FLAMINGO_SAMPLE.replace("GROUP\t1\tData\n", "GROUP\t1\tData\nGROUP\t1\tMore\n");
    let err = SharedParamReader::parse(&repeated_group).unwrap_err();
    assert!(matches!(err, SharedParamError::Duplicate { line: 7, .. }));
}

/// Encoded line breaks in descriptions are kept as written.
#[test]
fn test_description_is_opaque() {
    let doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    let margins = doc.param_by_name("Flamingo.TitleBlock.Margins").unwrap();
    assert_eq!(
        margins.description,
        "Title block margins in feet: top, right, bottom, left.\\r\\nUsed by Renumber Views."
    );
}

/// Comments and blank lines anywhere survive a rewrite.
#[test]
fn test_comments_anywhere_are_preserved() {
    let text = FLAMINGO_SAMPLE
        .replace("GROUP\t1\tData\n", "GROUP\t1\tData\n# groups end here\n\n")
        .replace("*PARAM", "#\tdisabled\n*PARAM");
    let doc = SharedParamReader::parse(&text).unwrap();

    assert!(doc
        .entries()
        .iter()
        .any(|e| *e == Entry::Comment("# groups end here".into())));
    assert_eq!(SharedParamWriter::to_string(&doc), text);
}

/// Edits keep the rest of the file untouched.
#[test]
fn test_edit_then_write() {
    let mut doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    doc.add_group(GroupRecord::new(2, "Identity")).unwrap();
    doc.add_param(
        ParamRecord::new(
            "0f9a3c2b-7d14-4e8b-a6c5-2b1e9d4f7a03".parse().unwrap(),
            "Flamingo.Sheet.Reviewer",
            DataType::Text,
            2,
        )
        .with_description("Reviewer initials"),
    )
    .unwrap();

    let text = SharedParamWriter::to_string(&doc);
    let expected = FLAMINGO_SAMPLE.replace("GROUP\t1\tData\n", "GROUP\t1\tData\nGROUP\t2\tIdentity\n")
        + "PARAM\t0f9a3c2b-7d14-4e8b-a6c5-2b1e9d4f7a03\tFlamingo.Sheet.Reviewer\tTEXT\t\t2\t1\tReviewer initials\t1\t0\n";
    assert_eq!(text, expected);

    let reparsed = SharedParamReader::parse(&text).unwrap();
    assert_eq!(reparsed, doc);
}

/// UTF-16LE files, as Revit writes them, come back in UTF-16LE.
#[test]
fn test_utf16_file_round_trip() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("SharedParameters.txt");

    let original = encoding::encode(&crlf(FLAMINGO_SAMPLE), TextEncoding::Utf16LeBom);
    fs::write(&path, &original).unwrap();

    let doc = sparam_format::read(&path).unwrap();
    assert_eq!(doc.encoding(), TextEncoding::Utf16LeBom);
    assert_eq!(doc.params().count(), 2);

    sparam_format::write(&doc, &path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), original);
}

/// A write replaces the file whole and leaves nothing else behind.
#[test]
fn test_write_is_whole_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("SharedParameters.txt");
    fs::write(&path, "stale content that is longer than nothing").unwrap();

    let mut doc = SharedParamReader::parse(FLAMINGO_SAMPLE).unwrap();
    let guid: Guid = MARGINS_GUID.parse().unwrap();
    doc.remove_param(&guid).unwrap();
    sparam_format::write(&doc, &path).unwrap();

    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let reread = sparam_format::read(&path).unwrap();
    assert_eq!(reread.params().count(), 1);
    assert!(reread.param(&guid).is_none());
}

/// A failed read leaves the file untouched.
#[test]
fn test_failed_read_leaves_file_alone() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.txt");
    let broken = FLAMINGO_SAMPLE.replace("META\t2\t1", "META\t2");
    fs::write(&path, &broken).unwrap();

    let err = sparam_format::read(&path).unwrap_err();
    assert!(matches!(err, SharedParamError::Format { line: 4, .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), broken);
}
