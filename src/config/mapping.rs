//! Field mapping file loading
//!
//! The mapping lives in its own JSON file next to the TOML configuration so
//! that feed layouts can be edited without touching connection settings.

use crate::domain::errors::FeedError;
use crate::domain::mapping::FieldMappingSpec;
use crate::domain::result::Result;
use std::fs;
use std::path::Path;

/// Mapping written by `init`
///
/// Covers the attributes Google Shopping requires for a typical WooCommerce
/// catalog. Variations are grouped by their parent through `item_group_id`.
pub const DEFAULT_MAPPING: &str = r#"{
  "id": { "source": "ID", "xml_tag": "g:id" },
  "title": { "source": "post_title", "xml_tag": "g:title" },
  "description": { "source": "post_content", "xml_tag": "g:description" },
  "link": { "source": "guid", "xml_tag": "g:link" },
  "image_link": { "source": "thumbnail_url", "xml_tag": "g:image_link" },
  "additional_image_link_1": { "source": "additional_image_link_1", "xml_tag": "g:additional_image_link" },
  "additional_image_link_2": { "source": "additional_image_link_2", "xml_tag": "g:additional_image_link" },
  "additional_image_link_3": { "source": "additional_image_link_3", "xml_tag": "g:additional_image_link" },
  "availability": {
    "source": "_stock_status",
    "xml_tag": "g:availability",
    "value_map": { "instock": "in stock", "outofstock": "out of stock", "onbackorder": "backorder" }
  },
  "price": { "source": "_regular_price", "xml_tag": "g:price", "suffix": " INR" },
  "sale_price": { "source": "_sale_price", "xml_tag": "g:sale_price", "suffix": " INR" },
  "mpn": { "source": "_sku", "xml_tag": "g:mpn" },
  "product_type": { "source": "category_path", "xml_tag": "g:product_type" },
  "item_group_id": { "source": "post_parent", "xml_tag": "g:item_group_id" },
  "condition": { "source": "fixed", "value": "new", "xml_tag": "g:condition" },
  "identifier_exists": { "source": "fixed", "value": "no", "xml_tag": "g:identifier_exists" },
  "shipping": { "source": "regional:shipping", "xml_tag": "g:shipping" },
  "tax": { "source": "regional:tax", "xml_tag": "g:tax" }
}
"#;

/// Loads and validates the field mapping file
///
/// # Errors
///
/// Returns [`FeedError::Configuration`] when the file is missing or unreadable
/// and [`FeedError::Mapping`] when its content is not a valid mapping.
pub fn load_mapping(path: impl AsRef<Path>) -> Result<FieldMappingSpec> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FeedError::Configuration(format!(
            "Mapping file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FeedError::Configuration(format!(
            "Failed to read mapping file {}: {}",
            path.display(),
            e
        ))
    })?;

    let spec = FieldMappingSpec::from_json_str(&contents)
        .map_err(|e| FeedError::Mapping(format!("{}: {}", path.display(), e)))?;

    if spec.is_empty() {
        return Err(FeedError::Mapping(format!(
            "{}: mapping defines no fields",
            path.display()
        )));
    }

    Ok(spec)
}
