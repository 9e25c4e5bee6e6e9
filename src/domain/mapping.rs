//! Field mapping model
//!
//! The mapping file is a JSON object whose keys are output field names and
//! whose values describe where each field comes from and how it is rendered:
//!
//! ```json
//! {
//!   "id":           { "source": "ID", "xml_tag": "g:id" },
//!   "availability": { "source": "_stock_status", "xml_tag": "g:availability",
//!                     "value_map": { "instock": "in stock" } },
//!   "shipping":     { "source": "regional:shipping", "xml_tag": "g:shipping" }
//! }
//! ```
//!
//! Source tags are parsed once, at load time, into the closed [`SourceKind`]
//! set so that resolution is an exhaustive match instead of string probing.
//! Key order is significant and preserved.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Columns of the product row that can be mapped directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// `ID`
    Id,
    /// `post_title`
    Title,
    /// `post_content` (sanitized before use)
    Content,
    /// `post_parent`
    Parent,
    /// `guid`
    Guid,
}

impl RecordField {
    /// Parses a column name
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            "ID" => Some(Self::Id),
            "post_title" => Some(Self::Title),
            "post_content" => Some(Self::Content),
            "post_parent" => Some(Self::Parent),
            "guid" => Some(Self::Guid),
            _ => None,
        }
    }

    /// Column name as it appears in the mapping file
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "post_title",
            Self::Content => "post_content",
            Self::Parent => "post_parent",
            Self::Guid => "guid",
        }
    }
}

/// Where a mapped field takes its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A column of the product row
    Literal(RecordField),
    /// A meta attribute (keys conventionally start with `_`)
    Meta(String),
    /// A constant value
    Fixed(String),
    /// URL of the featured image
    Thumbnail,
    /// Primary category name
    Category,
    /// N-th gallery image (1-based)
    AdditionalImage { slot: usize },
    /// Regional shipping block
    RegionalShipping,
    /// Regional tax block
    RegionalTax,
}

impl SourceKind {
    /// Whether the field is emitted by the regional injector
    pub fn is_regional(&self) -> bool {
        matches!(self, SourceKind::RegionalShipping | SourceKind::RegionalTax)
    }
}

/// How one output field is derived and rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDescriptor {
    /// Value source
    pub source: SourceKind,

    /// Element name written to the feed (e.g. `g:price`)
    pub xml_tag: String,

    /// Exact-match value substitutions
    pub value_map: HashMap<String, String>,

    /// Suffix appended to non-empty values
    pub suffix: Option<String>,
}

/// Descriptor as written in the mapping file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptor {
    source: String,
    xml_tag: String,
    #[serde(default)]
    value_map: Option<HashMap<String, String>>,
    #[serde(default)]
    suffix: Option<String>,
    #[serde(default, alias = "fixed_value")]
    value: Option<serde_json::Value>,
}

impl MappingDescriptor {
    fn from_raw(field: &str, raw: RawDescriptor) -> Result<Self, String> {
        if !is_valid_xml_name(&raw.xml_tag) {
            return Err(format!(
                "field '{field}': xml_tag '{}' is not a valid XML element name",
                raw.xml_tag
            ));
        }

        let source = parse_source(field, &raw.source, raw.value.as_ref())?;

        Ok(Self {
            source,
            xml_tag: raw.xml_tag,
            value_map: raw.value_map.unwrap_or_default(),
            suffix: raw.suffix,
        })
    }
}

fn parse_source(
    field: &str,
    tag: &str,
    fixed_value: Option<&serde_json::Value>,
) -> Result<SourceKind, String> {
    if let Some(column) = RecordField::from_column(tag) {
        return Ok(SourceKind::Literal(column));
    }

    match tag {
        "fixed" => {
            let value = fixed_value
                .ok_or_else(|| format!("field '{field}': fixed source requires a 'value'"))?;
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(format!(
                        "field '{field}': fixed value must be a string, number or boolean, got {other}"
                    ))
                }
            };
            Ok(SourceKind::Fixed(text))
        }
        "thumbnail_url" => Ok(SourceKind::Thumbnail),
        "category_path" => Ok(SourceKind::Category),
        "regional:shipping" => Ok(SourceKind::RegionalShipping),
        "regional:tax" => Ok(SourceKind::RegionalTax),
        _ if tag.starts_with('_') => Ok(SourceKind::Meta(tag.to_string())),
        _ if tag.starts_with("additional_image") => {
            let slot = trailing_index(tag)
                .or_else(|| trailing_index(field))
                .filter(|slot| *slot > 0)
                .ok_or_else(|| {
                    format!("field '{field}': cannot determine gallery slot from source '{tag}'")
                })?;
            Ok(SourceKind::AdditionalImage { slot })
        }
        _ => Err(format!("field '{field}': unknown source '{tag}'")),
    }
}

/// Parses the `n` of a trailing `_<n>`
fn trailing_index(name: &str) -> Option<usize> {
    let (_, digits) = name.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Checks a (possibly prefixed) XML element name
fn is_valid_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if name.ends_with(':') || name.matches(':').count() > 1 {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Ordered field mapping configuration
///
/// Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMappingSpec {
    entries: Vec<(String, MappingDescriptor)>,
}

impl FieldMappingSpec {
    /// Builds a spec from already-parsed entries
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate field names.
    pub fn new(entries: Vec<(String, MappingDescriptor)>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for (name, _) in &entries {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate mapping field '{name}'"));
            }
        }
        Ok(Self { entries })
    }

    /// Parses the JSON mapping document
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingDescriptor)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Looks up a descriptor by field name
    pub fn get(&self, field: &str) -> Option<&MappingDescriptor> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, d)| d)
    }

    /// Number of mapped fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is mapped
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any field needs the given kind of source
    pub fn uses(&self, predicate: impl Fn(&SourceKind) -> bool) -> bool {
        self.entries.iter().any(|(_, d)| predicate(&d.source))
    }
}

impl<'de> Deserialize<'de> for FieldMappingSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = FieldMappingSpec;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of field name to mapping descriptor")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((field, raw)) = map.next_entry::<String, RawDescriptor>()? {
                    let descriptor =
                        MappingDescriptor::from_raw(&field, raw).map_err(de::Error::custom)?;
                    entries.push((field, descriptor));
                }
                FieldMappingSpec::new(entries).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}
