//! Record assembly
//!
//! Gathers everything the mapping needs for one product (row columns, meta
//! attributes, featured image, primary category, gallery images) into a
//! [`FlatRecord`] keyed by output field name.

use crate::adapters::store::ProductStore;
use crate::core::transform::sanitize::{sanitize, DEFAULT_DESCRIPTION_MAX_LENGTH};
use crate::domain::errors::{RecordError, StoreError};
use crate::domain::mapping::{FieldMappingSpec, RecordField, SourceKind};
use crate::domain::product::{
    additional_image_field, FieldValue, FlatRecord, MetaAttributes, ProductId, RawProductRecord,
};
use std::sync::Arc;

/// Meta key holding the featured image attachment id
pub const THUMBNAIL_META_KEY: &str = "_thumbnail_id";

/// Meta key holding the comma-separated gallery attachment ids
pub const GALLERY_META_KEY: &str = "_product_image_gallery";

/// Default number of gallery images per product
pub const DEFAULT_ADDITIONAL_IMAGE_LIMIT: usize = 3;

/// Assembly tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Maximum number of gallery images resolved per product
    pub additional_image_limit: usize,

    /// Maximum sanitized description length
    pub description_max_length: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            additional_image_limit: DEFAULT_ADDITIONAL_IMAGE_LIMIT,
            description_max_length: DEFAULT_DESCRIPTION_MAX_LENGTH,
        }
    }
}

/// Builds flat records from raw product rows
///
/// Read-only: issues lookups to the store and never mutates its input.
pub struct RecordAssembler {
    store: Arc<dyn ProductStore + Send + Sync>,
    mapping: Arc<FieldMappingSpec>,
    options: AssemblyOptions,
    wants_gallery: bool,
}

impl RecordAssembler {
    /// Create a new assembler
    pub fn new(
        store: Arc<dyn ProductStore + Send + Sync>,
        mapping: Arc<FieldMappingSpec>,
        options: AssemblyOptions,
    ) -> Self {
        let wants_gallery = mapping.uses(|s| matches!(s, SourceKind::AdditionalImage { .. }));
        Self {
            store,
            mapping,
            options,
            wants_gallery,
        }
    }

    /// Assemble the flat record of one product
    ///
    /// # Errors
    ///
    /// Returns an assembly-stage [`RecordError`] when any store lookup fails.
    pub async fn assemble(&self, raw: &RawProductRecord) -> Result<FlatRecord, RecordError> {
        let id = raw.id;
        let meta = self
            .store
            .fetch_meta(id)
            .await
            .map_err(|e| lookup_error(id, "meta attributes", e))?;

        let mut flat = FlatRecord::new(id);

        if self.wants_gallery && self.options.additional_image_limit > 0 {
            for (index, url) in self.gallery_urls(id, &meta).await?.into_iter().enumerate() {
                flat.set(additional_image_field(index + 1), Some(url.into()));
            }
        }

        // Derived lookups are shared by every field that maps them
        let mut thumbnail: Option<Option<String>> = None;
        let mut category: Option<Option<String>> = None;

        for (field, descriptor) in self.mapping.iter() {
            let value = match &descriptor.source {
                SourceKind::RegionalShipping
                | SourceKind::RegionalTax
                | SourceKind::AdditionalImage { .. } => continue,
                SourceKind::Literal(column) => Some(self.literal(raw, *column)),
                SourceKind::Meta(key) => meta.get(key).map(FieldValue::from),
                SourceKind::Fixed(value) => Some(FieldValue::from(value.as_str())),
                SourceKind::Thumbnail => {
                    if thumbnail.is_none() {
                        thumbnail = Some(self.thumbnail_url(id, &meta).await?);
                    }
                    thumbnail.clone().flatten().map(FieldValue::from)
                }
                SourceKind::Category => {
                    if category.is_none() {
                        let owner = raw.taxonomy_owner();
                        let name = self
                            .store
                            .fetch_primary_category(owner)
                            .await
                            .map_err(|e| lookup_error(id, "primary category", e))?;
                        category = Some(name);
                    }
                    category.clone().flatten().map(FieldValue::from)
                }
            };
            flat.set(field, value);
        }

        Ok(flat)
    }

    fn literal(&self, raw: &RawProductRecord, column: RecordField) -> FieldValue {
        match column {
            RecordField::Id => FieldValue::from(raw.id),
            RecordField::Parent => FieldValue::from(raw.parent),
            RecordField::Title => FieldValue::from(raw.title.as_str()),
            RecordField::Guid => FieldValue::from(raw.guid.as_str()),
            RecordField::Content => {
                FieldValue::Text(sanitize(&raw.content, self.options.description_max_length))
            }
        }
    }

    async fn thumbnail_url(
        &self,
        id: ProductId,
        meta: &MetaAttributes,
    ) -> Result<Option<String>, RecordError> {
        let Some(attachment) = meta
            .get(THUMBNAIL_META_KEY)
            .and_then(|raw| raw.trim().parse::<ProductId>().ok())
        else {
            return Ok(None);
        };

        self.store
            .fetch_attachment_url(attachment)
            .await
            .map_err(|e| lookup_error(id, "featured image", e))
    }

    async fn gallery_urls(
        &self,
        id: ProductId,
        meta: &MetaAttributes,
    ) -> Result<Vec<String>, RecordError> {
        let ids: Vec<ProductId> = meta
            .get(GALLERY_META_KEY)
            .map(parse_gallery_ids)
            .unwrap_or_default()
            .into_iter()
            .take(self.options.additional_image_limit)
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.store
            .fetch_attachment_urls(&ids)
            .await
            .map_err(|e| lookup_error(id, "gallery images", e))
    }
}

/// Parses a gallery meta value such as `"12,15,18"`
///
/// Tokens that are not plain digit runs are ignored.
pub fn parse_gallery_ids(value: &str) -> Vec<ProductId> {
    value
        .split(',')
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse::<u64>().ok())
        .map(ProductId::new)
        .collect()
}

fn lookup_error(id: ProductId, what: &str, err: StoreError) -> RecordError {
    RecordError::assembly(id, format!("{what} lookup failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::errors::RecordStage;

    const MAPPING: &str = r#"{
        "id": {"source": "ID", "xml_tag": "g:id"},
        "title": {"source": "post_title", "xml_tag": "g:title"},
        "description": {"source": "post_content", "xml_tag": "g:description"},
        "link": {"source": "guid", "xml_tag": "g:link"},
        "image_link": {"source": "thumbnail_url", "xml_tag": "g:image_link"},
        "additional_image_link_1": {"source": "additional_image_link_1", "xml_tag": "g:additional_image_link"},
        "additional_image_link_2": {"source": "additional_image_link_2", "xml_tag": "g:additional_image_link"},
        "availability": {"source": "_stock_status", "xml_tag": "g:availability"},
        "product_type": {"source": "category_path", "xml_tag": "g:product_type"},
        "item_group_id": {"source": "post_parent", "xml_tag": "g:item_group_id"},
        "condition": {"source": "fixed", "xml_tag": "g:condition", "value": "new"},
        "shipping": {"source": "regional:shipping", "xml_tag": "g:shipping"}
    }"#;

    fn raw(id: u64, parent: u64, content: &str) -> RawProductRecord {
        RawProductRecord {
            id: ProductId::new(id),
            title: "Widget".to_string(),
            content: content.to_string(),
            parent: ProductId::new(parent),
            guid: format!("https://x/?p={id}"),
        }
    }

    fn meta(pairs: &[(&str, &str)]) -> MetaAttributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn assembler(store: MemoryStore, options: AssemblyOptions) -> RecordAssembler {
        let mapping = FieldMappingSpec::from_json_str(MAPPING).unwrap();
        RecordAssembler::new(Arc::new(store), Arc::new(mapping), options)
    }

    fn text(flat: &FlatRecord, field: &str) -> Option<String> {
        flat.get(field).map(|v| v.to_string())
    }

    #[tokio::test]
    async fn test_assembles_documented_example() {
        let record = raw(10, 0, "<p>Great [shortcode] for all</p>");
        let store = MemoryStore::new()
            .with_product(
                record.clone(),
                meta(&[("_thumbnail_id", "55"), ("_stock_status", "instock")]),
            )
            .with_attachment(55, "https://x/55.jpg", 0)
            .with_category(10, "Tools");

        let flat = assembler(store, AssemblyOptions::default())
            .assemble(&record)
            .await
            .unwrap();

        assert_eq!(flat.get("id"), Some(&FieldValue::Number(10)));
        assert_eq!(text(&flat, "title").as_deref(), Some("Widget"));
        assert_eq!(text(&flat, "description").as_deref(), Some("Great  for all"));
        assert_eq!(text(&flat, "image_link").as_deref(), Some("https://x/55.jpg"));
        assert_eq!(text(&flat, "product_type").as_deref(), Some("Tools"));
        assert_eq!(text(&flat, "availability").as_deref(), Some("instock"));
        assert_eq!(text(&flat, "condition").as_deref(), Some("new"));
        assert_eq!(flat.get("item_group_id"), Some(&FieldValue::Number(0)));
        assert!(flat.get("shipping").is_none());
    }

    #[tokio::test]
    async fn test_variation_uses_parent_category() {
        let parent = raw(1, 0, "");
        let variation = raw(2, 1, "");
        let store = MemoryStore::new()
            .with_product(parent, meta(&[("_thumbnail_id", "55")]))
            .with_variation(variation.clone(), MetaAttributes::new())
            .with_category(1, "Seeds")
            .with_category(2, "Ignored");

        let flat = assembler(store, AssemblyOptions::default())
            .assemble(&variation)
            .await
            .unwrap();
        assert_eq!(text(&flat, "product_type").as_deref(), Some("Seeds"));
        assert!(flat.get("image_link").is_none());
    }

    #[tokio::test]
    async fn test_gallery_is_capped_and_ordered() {
        let record = raw(10, 0, "");
        let store = MemoryStore::new()
            .with_product(
                record.clone(),
                meta(&[("_thumbnail_id", "55"), ("_product_image_gallery", "21,x,20,22")]),
            )
            .with_attachment(20, "https://x/20.jpg", 0)
            .with_attachment(21, "https://x/21.jpg", 0)
            .with_attachment(22, "https://x/22.jpg", 0);

        let options = AssemblyOptions {
            additional_image_limit: 2,
            ..AssemblyOptions::default()
        };
        let flat = assembler(store, options).assemble(&record).await.unwrap();

        assert_eq!(
            text(&flat, "additional_image_link_1").as_deref(),
            Some("https://x/21.jpg")
        );
        assert_eq!(
            text(&flat, "additional_image_link_2").as_deref(),
            Some("https://x/20.jpg")
        );
        assert!(flat.get("additional_image_link_3").is_none());
    }

    #[tokio::test]
    async fn test_missing_thumbnail_attachment_is_absent() {
        let record = raw(10, 0, "");
        let store =
            MemoryStore::new().with_product(record.clone(), meta(&[("_thumbnail_id", "404")]));

        let flat = assembler(store, AssemblyOptions::default())
            .assemble(&record)
            .await
            .unwrap();
        assert!(flat.get("image_link").is_none());
        assert!(flat.get("product_type").is_none());
    }

    #[tokio::test]
    async fn test_description_is_truncated() {
        let record = raw(10, 0, &"z".repeat(20));
        let store = MemoryStore::new().with_product(record.clone(), MetaAttributes::new());
        let options = AssemblyOptions {
            description_max_length: 10,
            ..AssemblyOptions::default()
        };

        let flat = assembler(store, options).assemble(&record).await.unwrap();
        assert_eq!(text(&flat, "description").as_deref(), Some("zzzzzzz..."));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_assembly_error() {
        let record = raw(10, 0, "");
        let store = MemoryStore::new()
            .with_product(record.clone(), MetaAttributes::new())
            .fail_lookups_for(10);

        let err = assembler(store, AssemblyOptions::default())
            .assemble(&record)
            .await
            .unwrap_err();
        assert_eq!(err.product_id, ProductId::new(10));
        assert_eq!(err.stage, RecordStage::Assembly);
        assert!(err.message.contains("meta attributes"));
    }

    #[test]
    fn test_parse_gallery_ids() {
        let ids = parse_gallery_ids("12,15, 16,,abc,18");
        assert_eq!(
            ids,
            vec![ProductId::new(12), ProductId::new(15), ProductId::new(18)]
        );
        assert!(parse_gallery_ids("").is_empty());
    }
}
