//! Streaming feed writer
//!
//! The document is written line by line: header, one line per item, footer.
//! Items are rendered to a string first so that a record that cannot be
//! serialized is rejected before anything reaches the sink.

use crate::config::{RegionalConfig, StoreConfig};
use crate::core::feed::regional::RegionalBlock;
use crate::core::transform::resolve::resolve;
use crate::domain::errors::{FeedError, RecordError};
use crate::domain::mapping::{FieldMappingSpec, SourceKind};
use crate::domain::product::FlatRecord;
use crate::domain::Result;
use quick_xml::escape::partial_escape;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Google Shopping namespace bound to the `g` prefix
pub const GOOGLE_NAMESPACE: &str = "http://base.google.com/ns/1.0";

/// Prefix applied to every item line
pub const ITEM_INDENT: &str = "    ";

/// Catalog header details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedHeader {
    /// Catalog title
    pub title: String,
    /// Store link
    pub link: String,
    /// Catalog description
    pub description: String,
}

impl From<&StoreConfig> for FeedHeader {
    fn from(store: &StoreConfig) -> Self {
        Self {
            title: store.title.clone(),
            link: store.domain.clone(),
            description: store.description.clone(),
        }
    }
}

/// Writes a feed document to an async sink
pub struct FeedWriter<W> {
    sink: W,
    items_written: u64,
}

impl<W: AsyncWrite + Unpin> FeedWriter<W> {
    /// Wrap a sink
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            items_written: 0,
        }
    }

    /// Number of items written so far
    pub fn items_written(&self) -> u64 {
        self.items_written
    }

    /// Write the XML declaration, root element and channel header
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Sink`] if the sink rejects the write.
    pub async fn write_header(&mut self, header: &FeedHeader) -> Result<()> {
        let text = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <rss xmlns:g=\"{GOOGLE_NAMESPACE}\" version=\"2.0\">\n  \
             <channel>\n    \
             <title>{}</title>\n    \
             <link>{}</link>\n    \
             <description>{}</description>\n",
            partial_escape(header.title.as_str()),
            partial_escape(header.link.as_str()),
            partial_escape(header.description.as_str()),
        );
        self.write_raw(&text, "header").await
    }

    /// Write one pre-rendered item line
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Sink`] if the sink rejects the write.
    pub async fn write_item(&mut self, item: &str) -> Result<()> {
        self.write_raw(item, "item").await?;
        self.items_written += 1;
        Ok(())
    }

    /// Close the channel and root elements and flush the sink
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Sink`] if the write or the flush fails.
    pub async fn write_footer(&mut self) -> Result<()> {
        self.write_raw("  </channel>\n</rss>\n", "footer").await?;
        self.flush().await
    }

    /// Push buffered bytes through to the sink
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Sink`] if the flush fails.
    pub async fn flush(&mut self) -> Result<()> {
        self.sink
            .flush()
            .await
            .map_err(|e| FeedError::Sink(format!("failed to flush feed: {e}")))
    }

    /// Give back the sink
    pub fn into_inner(self) -> W {
        self.sink
    }

    async fn write_raw(&mut self, text: &str, part: &str) -> Result<()> {
        self.sink
            .write_all(text.as_bytes())
            .await
            .map_err(|e| FeedError::Sink(format!("failed to write feed {part}: {e}")))
    }
}

/// Render one item line
///
/// Fields appear in mapping order. Absent values are skipped, regional
/// blocks are always present. The returned line carries [`ITEM_INDENT`],
/// every embedded newline is followed by the same indent, and it ends with
/// a newline.
///
/// # Errors
///
/// Returns a serialization-stage [`RecordError`] when a value contains a
/// character that XML 1.0 does not allow.
pub fn render_item(
    mapping: &FieldMappingSpec,
    flat: &FlatRecord,
    regional: &RegionalConfig,
) -> std::result::Result<String, RecordError> {
    let mut body = String::from("<item>");

    for (field, descriptor) in mapping.iter() {
        match descriptor.source {
            SourceKind::RegionalShipping => {
                RegionalBlock::shipping(&descriptor.xml_tag, regional).render_into(&mut body)
            }
            SourceKind::RegionalTax => {
                RegionalBlock::tax(&descriptor.xml_tag, regional).render_into(&mut body)
            }
            _ => {
                let Some(value) = resolve(field, descriptor, flat) else {
                    continue;
                };
                let text = value.to_string();
                if let Some(bad) = text.chars().find(|c| !is_xml_char(*c)) {
                    return Err(RecordError::serialization(
                        flat.product_id(),
                        format!(
                            "field '{field}' contains character U+{:04X} not allowed in XML",
                            u32::from(bad)
                        ),
                    ));
                }
                body.push('<');
                body.push_str(&descriptor.xml_tag);
                body.push('>');
                body.push_str(&partial_escape(text.as_str()));
                body.push_str("</");
                body.push_str(&descriptor.xml_tag);
                body.push('>');
            }
        }
    }
    body.push_str("</item>");

    let mut line = String::with_capacity(body.len() + ITEM_INDENT.len() + 1);
    line.push_str(ITEM_INDENT);
    line.push_str(&body.replace('\n', &format!("\n{ITEM_INDENT}")));
    line.push('\n');
    Ok(line)
}

/// Whether a character may appear in an XML 1.0 document
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
