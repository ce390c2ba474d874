//! Data models for shared parameter files.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// The three sections of a shared parameter file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Meta,
    Group,
    Param,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Meta, Section::Group, Section::Param];

    /// Leading token of the section header line, e.g. `*PARAM`.
    pub fn marker(&self) -> &'static str {
        match self {
            Section::Meta => "*META",
            Section::Group => "*GROUP",
            Section::Param => "*PARAM",
        }
    }

    /// Leading token of the data rows in this section, e.g. `PARAM`.
    pub fn row_kind(&self) -> &'static str {
        match self {
            Section::Meta => "META",
            Section::Group => "GROUP",
            Section::Param => "PARAM",
        }
    }

    /// Column names declared by the section header.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Section::Meta => &["VERSION", "MINVERSION"],
            Section::Group => &["ID", "NAME"],
            Section::Param => &[
                "GUID",
                "NAME",
                "DATATYPE",
                "DATACATEGORY",
                "GROUP",
                "VISIBLE",
                "DESCRIPTION",
                "USERMODIFIABLE",
                "HIDEWHENNOVALUE",
            ],
        }
    }

    /// Number of fields following the row kind token.
    pub fn field_count(&self) -> usize {
        self.columns().len()
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.marker() == marker)
    }

    pub fn from_row_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.row_kind() == kind)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// File metadata row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub version: i64,
    pub min_version: i64,
}

impl Default for MetaRecord {
    fn default() -> Self {
        Self {
            version: 2,
            min_version: 1,
        }
    }
}

/// A parameter group as shown in Revit's UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: u32,
    pub name: String,
}

impl GroupRecord {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

fn canonical_guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("static GUID pattern is valid")
    })
}

/// Reason a GUID field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGuid(pub String);

impl fmt::Display for InvalidGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a canonical hyphenated GUID", self.0)
    }
}

impl std::error::Error for InvalidGuid {}

/// A parameter GUID in canonical 8-4-4-4-12 form.
///
/// Equality and hashing ignore letter case; the case seen on input is kept
/// so the value is written back exactly as it was read.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Guid {
    value: Uuid,
    uppercase: bool,
}

impl Guid {
    /// Generate a fresh random (v4) GUID, written lower-case.
    pub fn new_v4() -> Self {
        Self {
            value: Uuid::new_v4(),
            uppercase: false,
        }
    }

    pub fn is_uppercase(&self) -> bool {
        self.uppercase
    }

    pub fn with_uppercase(mut self, uppercase: bool) -> Self {
        self.uppercase = uppercase;
        self
    }
}

impl PartialEq for Guid {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for Guid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl FromStr for Guid {
    type Err = InvalidGuid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !canonical_guid_pattern().is_match(s) {
            return Err(InvalidGuid(s.to_string()));
        }

        let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
        if has_upper && has_lower {
            // Mixed case cannot be reproduced on write.
            return Err(InvalidGuid(s.to_string()));
        }

        let value = Uuid::parse_str(s).map_err(|_| InvalidGuid(s.to_string()))?;
        Ok(Self {
            value,
            uppercase: has_upper,
        })
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hyphenated = self.value.hyphenated();
        if self.uppercase {
            write!(f, "{:X}", hyphenated)
        } else {
            write!(f, "{:x}", hyphenated)
        }
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Prefixes of the discipline-specific data type tokens (HVAC_AIR_FLOW,
/// ELECTRICAL_CURRENT, ...).
const DISCIPLINE_PREFIXES: &[&str] = &["ELECTRICAL_", "HVAC_", "PIPING_", "STRUCTURAL_", "ENERGY_"];

/// Revit data type token of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Text,
    MultilineText,
    Integer,
    Number,
    Length,
    Area,
    Volume,
    Angle,
    Slope,
    Currency,
    MassDensity,
    Url,
    Material,
    Image,
    YesNo,
    FamilyType,
    LoadClassification,
    NumberOfPoles,
    /// Any other token, kept verbatim.
    Other(String),
}

impl DataType {
    const NAMED: [(DataType, &'static str); 18] = [
        (DataType::Text, "TEXT"),
        (DataType::MultilineText, "MULTILINETEXT"),
        (DataType::Integer, "INTEGER"),
        (DataType::Number, "NUMBER"),
        (DataType::Length, "LENGTH"),
        (DataType::Area, "AREA"),
        (DataType::Volume, "VOLUME"),
        (DataType::Angle, "ANGLE"),
        (DataType::Slope, "SLOPE"),
        (DataType::Currency, "CURRENCY"),
        (DataType::MassDensity, "MASS_DENSITY"),
        (DataType::Url, "URL"),
        (DataType::Material, "MATERIAL"),
        (DataType::Image, "IMAGE"),
        (DataType::YesNo, "YESNO"),
        (DataType::FamilyType, "FAMILYTYPE"),
        (DataType::LoadClassification, "LOADCLASSIFICATION"),
        (DataType::NumberOfPoles, "NUMBER_OF_POLES"),
    ];

    pub fn as_str(&self) -> &str {
        match self {
            DataType::Other(token) => token,
            named => Self::NAMED
                .iter()
                .find(|(dt, _)| dt == named)
                .map(|(_, token)| *token)
                .unwrap_or_default(),
        }
    }

    /// Whether the token is one Revit is known to write.
    pub fn is_known(&self) -> bool {
        match self {
            DataType::Other(token) => DISCIPLINE_PREFIXES.iter().any(|p| token.starts_with(p)),
            _ => true,
        }
    }

    /// FAMILYTYPE parameters carry a category in the DATACATEGORY column.
    pub fn takes_category(&self) -> bool {
        matches!(self, DataType::FamilyType)
    }
}

/// Reason a data type token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDataType(pub String);

impl fmt::Display for InvalidDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("data type is empty")
        } else {
            write!(f, "'{}' is not a valid data type token", self.0)
        }
    }
}

impl std::error::Error for InvalidDataType {}

impl FromStr for DataType {
    type Err = InvalidDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(InvalidDataType(s.to_string()));
        }
        Ok(Self::NAMED
            .iter()
            .find(|(_, token)| *token == s)
            .map(|(dt, _)| dt.clone())
            .unwrap_or_else(|| DataType::Other(s.to_string())))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A shared parameter definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRecord {
    pub guid: Guid,
    pub name: String,
    pub data_type: DataType,
    pub data_category: Option<String>,
    /// Id of the owning [`GroupRecord`].
    pub group: u32,
    pub visible: bool,
    /// Free text, kept opaque. Encoded line-break markers are not decoded.
    pub description: String,
    pub user_modifiable: bool,
    pub hide_when_no_value: bool,
}

impl ParamRecord {
    /// Create a visible, user-modifiable parameter with no description.
    pub fn new(guid: Guid, name: impl Into<String>, data_type: DataType, group: u32) -> Self {
        Self {
            guid,
            name: name.into(),
            data_type,
            data_category: None,
            group,
            visible: true,
            description: String::new(),
            user_modifiable: true,
            hide_when_no_value: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_data_category(mut self, category: impl Into<String>) -> Self {
        self.data_category = Some(category.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.user_modifiable = false;
        self
    }

    pub fn hide_when_no_value(mut self) -> Self {
        self.hide_when_no_value = true;
        self
    }

    /// Leading namespace segment of a dot-delimited name (`Flamingo` for
    /// `Flamingo.TitleBlock.Margins`).
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once('.').map(|(ns, _)| ns)
    }
}

/// One line of a shared parameter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Whitespace-only line, kept verbatim.
    Blank(String),
    /// Line starting with `#`, kept verbatim including the marker.
    Comment(String),
    Header(Section),
    Meta(MetaRecord),
    Group(GroupRecord),
    Param(ParamRecord),
}

impl Entry {
    /// Section a data entry belongs to.
    pub fn section(&self) -> Option<Section> {
        match self {
            Entry::Meta(_) => Some(Section::Meta),
            Entry::Group(_) => Some(Section::Group),
            Entry::Param(_) => Some(Section::Param),
            _ => None,
        }
    }

    pub fn is_data(&self) -> bool {
        self.section().is_some()
    }
}

/// Text encoding a file was read with, reused on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    /// What Revit itself writes.
    Utf16LeBom,
    Utf16BeBom,
}

/// Line terminator a file was read with, reused on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lookup() {
        assert_eq!(Section::from_marker("*PARAM"), Some(Section::Param));
        assert_eq!(Section::from_row_kind("GROUP"), Some(Section::Group));
        assert_eq!(Section::from_marker("PARAM"), None);
        assert_eq!(Section::Param.field_count(), 9);
        assert!(Section::Meta < Section::Group && Section::Group < Section::Param);
    }

    #[test]
    fn test_guid_keeps_case() {
        let lower: Guid = "5b9a8c1e-3f2d-4e6a-9b7c-1d2e3f4a5b6c".parse().unwrap();
        let upper: Guid = "5B9A8C1E-3F2D-4E6A-9B7C-1D2E3F4A5B6C".parse().unwrap();

        assert_eq!(lower, upper);
        assert!(!lower.is_uppercase() && upper.is_uppercase());
        assert_eq!(lower.with_uppercase(true).to_string(), upper.to_string());
        assert_eq!(lower.to_string(), "5b9a8c1e-3f2d-4e6a-9b7c-1d2e3f4a5b6c");
        assert_eq!(upper.to_string(), "5B9A8C1E-3F2D-4E6A-9B7C-1D2E3F4A5B6C");
    }

    #[test]
    fn test_guid_rejects_non_canonical_forms() {
        assert!("5b9a8c1e3f2d4e6a9b7c1d2e3f4a5b6c".parse::<Guid>().is_err());
        assert!("{5b9a8c1e-3f2d-4e6a-9b7c-1d2e3f4a5b6c}".parse::<Guid>().is_err());
        assert!("5b9a8c1e-3f2d-4e6a-9b7c-1d2e3f4a5b6".parse::<Guid>().is_err());
        assert!("5B9a8c1e-3f2d-4e6a-9b7c-1d2e3f4a5b6c".parse::<Guid>().is_err());
        assert!("zzzzzzzz-3f2d-4e6a-9b7c-1d2e3f4a5b6c".parse::<Guid>().is_err());
    }

    #[test]
    fn test_data_type_tokens() {
        assert_eq!("TEXT".parse::<DataType>().unwrap(), DataType::Text);
        assert_eq!("YESNO".parse::<DataType>().unwrap(), DataType::YesNo);
        assert_eq!(DataType::MassDensity.as_str(), "MASS_DENSITY");

        let hvac: DataType = "HVAC_AIR_FLOW".parse().unwrap();
        assert_eq!(hvac, DataType::Other("HVAC_AIR_FLOW".into()));
        assert!(hvac.is_known());
        assert!(!DataType::Other("WIDGET".into()).is_known());

        assert!("".parse::<DataType>().is_err());
        assert!("TE XT".parse::<DataType>().is_err());
    }

    #[test]
    fn test_param_builder() {
        let param = ParamRecord::new(Guid::new_v4(), "Flamingo.Sheet.Stamp", DataType::Image, 1)
            .with_description("Stamp image")
            .hidden()
            .read_only();

        assert_eq!(param.namespace(), Some("Flamingo"));
        assert!(!param.visible);
        assert!(!param.user_modifiable);
        assert!(!param.hide_when_no_value);
    }
}
