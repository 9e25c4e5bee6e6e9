//! Field mapping resolution
//!
//! Turns one descriptor of the mapping plus the assembled [`FlatRecord`] into
//! the value written to the feed, or `None` when the field must be left out.

use crate::domain::mapping::{MappingDescriptor, SourceKind};
use crate::domain::product::{additional_image_field, FieldValue, FlatRecord};

/// Key under which the assembler stores the value of a mapped field
///
/// Gallery images are stored by slot so that any field name can point at
/// them; everything else is stored under its own field name.
pub fn record_key(field_name: &str, descriptor: &MappingDescriptor) -> String {
    match descriptor.source {
        SourceKind::AdditionalImage { slot } => additional_image_field(slot),
        _ => field_name.to_string(),
    }
}

/// Resolves the output value of one mapped field
///
/// - Regional descriptors always resolve to `None`; their blocks are built
///   by [`crate::core::feed::regional`].
/// - `value_map` replaces a text value on exact, case-sensitive match.
/// - `suffix` is appended verbatim to non-empty values.
/// - Missing or empty values resolve to `None`.
///
/// # Examples
///
/// ```
/// use novazen_feed::core::transform::resolve::resolve;
/// use novazen_feed::domain::{FieldMappingSpec, FlatRecord, ProductId};
///
/// let spec = FieldMappingSpec::from_json_str(
///     r#"{"availability": {"source": "_stock_status", "xml_tag": "g:availability",
///                          "value_map": {"instock": "in stock"}}}"#,
/// ).unwrap();
/// let descriptor = spec.get("availability").unwrap();
///
/// let mut flat = FlatRecord::new(ProductId::new(1));
/// flat.set("availability", Some("instock".into()));
/// assert_eq!(resolve("availability", descriptor, &flat).unwrap().to_string(), "in stock");
/// ```
pub fn resolve(
    field_name: &str,
    descriptor: &MappingDescriptor,
    flat: &FlatRecord,
) -> Option<FieldValue> {
    if descriptor.source.is_regional() {
        return None;
    }

    let value = flat.get(&record_key(field_name, descriptor))?;
    if value.is_blank() {
        return None;
    }

    let mapped = match value {
        FieldValue::Text(text) => descriptor
            .value_map
            .get(text)
            .map(|replacement| FieldValue::Text(replacement.clone()))
            .unwrap_or_else(|| value.clone()),
        FieldValue::Number(_) => value.clone(),
    };

    let rendered = match &descriptor.suffix {
        Some(suffix) if !mapped.is_blank() => FieldValue::Text(format!("{mapped}{suffix}")),
        _ => mapped,
    };

    (!rendered.is_blank()).then_some(rendered)
}
