//! Product record types
//!
//! Raw rows as fetched from the store, the meta attribute bag that goes with
//! them, and the flat per-product record consumed by feed serialization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Product identifier newtype wrapper
///
/// WooCommerce stores post identifiers as `BIGINT UNSIGNED`. The value `0`
/// is used by the `post_parent` column to mean "no parent".
///
/// # Examples
///
/// ```
/// use novazen_feed::domain::product::ProductId;
/// use std::str::FromStr;
///
/// let id = ProductId::from_str("1042").unwrap();
/// assert_eq!(id.get(), 1042);
/// assert!(!id.is_root());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(u64);

impl ProductId {
    /// The "no parent" marker
    pub const ROOT: ProductId = ProductId(0);

    /// Creates a new ProductId
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the "no parent" marker
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid product ID '{s}': {e}"))
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One eligible product row as fetched from the store
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProductRecord {
    /// Post identifier
    pub id: ProductId,

    /// Product title
    pub title: String,

    /// Raw free-text body (HTML and shortcodes included)
    pub content: String,

    /// Parent product for variations, [`ProductId::ROOT`] otherwise
    pub parent: ProductId,

    /// Canonical source URL
    pub guid: String,
}

impl RawProductRecord {
    /// Whether the record is a variation of another product
    pub fn is_variation(&self) -> bool {
        !self.parent.is_root()
    }

    /// The identifier whose taxonomy applies to this record
    ///
    /// Variations carry no categories of their own, so their parent is used.
    pub fn taxonomy_owner(&self) -> ProductId {
        if self.is_variation() {
            self.parent
        } else {
            self.id
        }
    }
}

/// Sparse meta attributes of one product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaAttributes(HashMap<String, String>);

impl MetaAttributes {
    /// Creates an empty attribute bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an attribute value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Inserts or replaces an attribute
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attributes are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for MetaAttributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A resolved field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Integral number (identifiers)
    Number(i64),
}

impl FieldValue {
    /// Whether the value renders as an empty string
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<ProductId> for FieldValue {
    fn from(id: ProductId) -> Self {
        // Post IDs never come close to i64::MAX in practice.
        i64::try_from(id.get())
            .map(FieldValue::Number)
            .unwrap_or_else(|_| FieldValue::Text(id.to_string()))
    }
}

/// Output-field-name keyed record built fresh for each product
///
/// Absent values are never inserted, so lookups return `None` for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    product_id: ProductId,
    fields: HashMap<String, FieldValue>,
}

impl FlatRecord {
    /// Creates an empty record for a product
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            fields: HashMap::new(),
        }
    }

    /// Identifier of the product this record was assembled from
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Stores a value, or removes the field when the value is absent
    pub fn set(&mut self, field: impl Into<String>, value: Option<FieldValue>) {
        let field = field.into();
        match value {
            Some(v) => {
                self.fields.insert(field, v);
            }
            None => {
                self.fields.remove(&field);
            }
        }
    }

    /// Looks up a field
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Names of all populated fields
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is populated
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field name under which the `index`-th (1-based) gallery image is stored
pub fn additional_image_field(index: usize) -> String {
    format!("additional_image_link_{index}")
}
