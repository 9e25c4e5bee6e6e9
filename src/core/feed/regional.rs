//! Regional shipping and tax blocks
//!
//! Unlike generic fields these are nested elements and are written for every
//! item, whatever the rest of the record looks like.

use crate::config::RegionalConfig;
use quick_xml::escape::partial_escape;

/// Value of `g:tax_ship`; tax never applies to shipping
pub const TAX_ON_SHIPPING: &str = "n";

/// A nested element with text-only children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalBlock {
    tag: String,
    children: Vec<(&'static str, String)>,
}

impl RegionalBlock {
    /// Shipping block: country, service and `"<price> <currency>"`
    pub fn shipping(tag: &str, regional: &RegionalConfig) -> Self {
        Self {
            tag: tag.to_string(),
            children: vec![
                ("g:country", regional.country.clone()),
                ("g:service", regional.shipping.service.clone()),
                (
                    "g:price",
                    format!("{} {}", regional.shipping.price, regional.currency),
                ),
            ],
        }
    }

    /// Tax block: country, rate and the tax-on-shipping flag
    pub fn tax(tag: &str, regional: &RegionalConfig) -> Self {
        Self {
            tag: tag.to_string(),
            children: vec![
                ("g:country", regional.country.clone()),
                ("g:rate", regional.tax.rate.to_string()),
                ("g:tax_ship", TAX_ON_SHIPPING.to_string()),
            ],
        }
    }

    /// Element name of the block
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Child elements in output order
    pub fn children(&self) -> &[(&'static str, String)] {
        &self.children
    }

    /// Appends the serialized block to `out`
    pub fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        out.push('>');
        for (name, text) in &self.children {
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&partial_escape(text.as_str()));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}
