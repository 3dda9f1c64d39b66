//! Collection document parsing.
//!
//! Walks the XML events of a collection response and extracts one
//! [`CollectionItem`] per `item` element. Items missing their required
//! fields (identifier, name) are skipped with a warning — a malformed item
//! must never crash the walk or produce a garbage entry. Every non-empty
//! image reference is written to the cache when its item closes, keyed
//! `img-{id}`, independent of whether later items parse cleanly.
//!
//! Text content arrives in pieces: entity references (`&amp;`, `&#233;`)
//! are reported as separate `GeneralRef` events splitting the surrounding
//! text, so field values are accumulated across events and only committed
//! at the closing tag.

use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::cache::{image_key, KvCache};
use crate::error::{Result, ScoutError};

use super::CollectionItem;

/// Advisory text the collection endpoint returns while rate-limiting.
///
/// Busy detection is exact-text equality against this one sentence. That is
/// a known fragility inherited from the upstream service contract; any
/// other advisory text is logged and treated as a normal document.
pub const BUSY_MESSAGE: &str = "Please try again later.";

/// Everything extracted from one collection document.
#[derive(Debug, Default)]
pub struct ParsedCollection {
    /// Top-level advisory message text, when present.
    pub message: Option<String>,
    pub items: Vec<CollectionItem>,
}

impl ParsedCollection {
    /// Whether the document is the endpoint's busy signal.
    pub fn is_busy(&self) -> bool {
        self.message.as_deref() == Some(BUSY_MESSAGE)
    }
}

/// State accumulated while inside one `item` element.
#[derive(Default)]
struct ItemBuilder {
    id: Option<String>,
    name: Option<String>,
    image: Option<String>,
    rating: Option<String>,
}

/// Which child element of an item is currently accumulating text.
#[derive(Clone, Copy, PartialEq)]
enum Target {
    Name,
    Image,
}

/// Parse a collection document, populating `cache` with image references
/// as a side effect.
pub fn parse_collection(xml: &str, cache: &dyn KvCache) -> Result<ParsedCollection> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut parsed = ParsedCollection::default();
    let mut item: Option<ItemBuilder> = None;
    let mut capturing: Option<Target> = None;
    let mut text_buf = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"item" => {
                    let mut builder = ItemBuilder {
                        id: attribute(e, "objectid")?,
                        ..Default::default()
                    };
                    if builder.id.as_deref() == Some("") {
                        builder.id = None;
                    }
                    item = Some(builder);
                    capturing = None;
                }
                b"name" => {
                    // Only the first name element of an item is kept.
                    if item.as_ref().is_some_and(|b| b.name.is_none()) {
                        capturing = Some(Target::Name);
                        text_buf.clear();
                    }
                }
                b"image" if item.is_some() => {
                    capturing = Some(Target::Image);
                    text_buf.clear();
                }
                b"rating" => {
                    if let Some(ref mut builder) = item {
                        builder.rating = attribute(e, "value")?;
                    }
                }
                b"message" => {
                    parsed.message = attribute(e, "text")?;
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"rating" => {
                    if let Some(ref mut builder) = item {
                        builder.rating = attribute(e, "value")?;
                    }
                }
                b"message" => {
                    parsed.message = attribute(e, "text")?;
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if capturing.is_some() {
                    let text = e
                        .xml_content()
                        .map_err(|e| ScoutError::Xml(format!("XML decode error: {e}")))?;
                    text_buf.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if capturing.is_some() {
                    text_buf.push_str(&resolve_reference(e)?);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"name" => {
                    if capturing == Some(Target::Name) {
                        if let Some(ref mut builder) = item {
                            let text = text_buf.trim();
                            if !text.is_empty() {
                                builder.name = Some(text.to_string());
                            }
                        }
                    }
                    capturing = None;
                }
                b"image" => {
                    if capturing == Some(Target::Image) {
                        if let Some(ref mut builder) = item {
                            let text = text_buf.trim();
                            if !text.is_empty() {
                                builder.image = Some(text.to_string());
                            }
                        }
                    }
                    capturing = None;
                }
                b"item" => {
                    if let Some(builder) = item.take() {
                        // Cache the image reference even when the item is
                        // otherwise incomplete; later items must not be
                        // able to undo this write.
                        if let (Some(id), Some(image)) =
                            (builder.id.as_deref(), builder.image.as_deref())
                        {
                            cache.put(&image_key(id), image);
                        }
                        match (builder.id, builder.name) {
                            (Some(id), Some(name)) => {
                                parsed.items.push(CollectionItem {
                                    id,
                                    name,
                                    image: builder.image,
                                    rating: builder.rating,
                                });
                            }
                            (id, _) => {
                                warn!(
                                    objectid = id.as_deref().unwrap_or("<missing>"),
                                    "Skipping collection item without id/name"
                                );
                            }
                        }
                    }
                    capturing = None;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ScoutError::Xml(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    if let Some(msg) = parsed.message.as_deref() {
        if msg != BUSY_MESSAGE {
            debug!(message = msg, "Collection document carried an advisory message");
        }
    }

    Ok(parsed)
}

/// Resolve an entity reference event into the text it stands for.
///
/// Numeric character references and the five predefined entities resolve
/// to their characters; an unknown named entity is kept in its raw `&x;`
/// form so the value is never silently shortened.
fn resolve_reference(e: &BytesRef<'_>) -> Result<String> {
    if let Some(ch) = e
        .resolve_char_ref()
        .map_err(|e| ScoutError::Xml(format!("Bad character reference: {e}")))?
    {
        return Ok(ch.to_string());
    }
    let name = e
        .decode()
        .map_err(|e| ScoutError::Xml(format!("Bad entity reference: {e}")))?;
    Ok(match name.as_ref() {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        other => {
            warn!(entity = other, "Unknown entity reference, keeping raw text");
            format!("&{other};")
        }
    })
}

/// Read a string attribute off an element, unescaping entities.
fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|e| ScoutError::Xml(format!("Bad attribute: {e}")))?;
    match attr {
        Some(a) => {
            let value = a
                .unescape_value()
                .map_err(|e| ScoutError::Xml(format!("XML unescape error: {e}")))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn parse(xml: &str) -> (ParsedCollection, MemoryCache) {
        let cache = MemoryCache::new();
        let parsed = parse_collection(xml, &cache).expect("parse should succeed");
        (parsed, cache)
    }

    #[test]
    fn test_parse_full_item_and_cache_image() {
        let xml = r#"<items totalitems="1">
            <item objectid="123" subtype="boardgame">
                <name sortindex="1">Catan</name>
                <image>http://x/y.png</image>
                <stats minplayers="3">
                    <rating value="7.5"/>
                </stats>
            </item>
        </items>"#;
        let (parsed, cache) = parse(xml);
        assert_eq!(parsed.items.len(), 1);
        let item = &parsed.items[0];
        assert_eq!(item.id, "123");
        assert_eq!(item.name, "Catan");
        assert_eq!(item.image.as_deref(), Some("http://x/y.png"));
        assert_eq!(item.rating.as_deref(), Some("7.5"));
        assert_eq!(cache.get("img-123").as_deref(), Some("http://x/y.png"));
    }

    #[test]
    fn test_item_without_image_writes_no_cache_entry() {
        let xml = r#"<items>
            <item objectid="1"><name>First</name></item>
            <item objectid="2">
                <name>Second</name>
                <image>http://x/2.png</image>
            </item>
        </items>"#;
        let (parsed, cache) = parse(xml);
        assert_eq!(parsed.items.len(), 2, "imageless item must not break later items");
        assert!(cache.get("img-1").is_none());
        assert_eq!(cache.get("img-2").as_deref(), Some("http://x/2.png"));
    }

    #[test]
    fn test_item_missing_name_is_skipped() {
        let xml = r#"<items>
            <item objectid="1"></item>
            <item objectid="2"><name>Kept</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].id, "2");
    }

    #[test]
    fn test_item_missing_objectid_is_skipped() {
        let xml = r#"<items>
            <item><name>Orphan</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_busy_message_detected_exactly() {
        let xml = r#"<message text="Please try again later."/>"#;
        let (parsed, _) = parse(xml);
        assert!(parsed.is_busy());
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_other_message_is_not_busy() {
        let xml = r#"<items>
            <message text="Your collection was refreshed."/>
            <item objectid="9"><name>Still parsed</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert!(!parsed.is_busy(), "only the exact sentence counts as busy");
        assert_eq!(parsed.items.len(), 1);
    }

    #[test]
    fn test_rating_absent_without_stats() {
        let xml = r#"<items>
            <item objectid="7"><name>Unrated</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert!(parsed.items[0].rating.is_none());
    }

    #[test]
    fn test_rating_na_sentinel_preserved() {
        let xml = r#"<items>
            <item objectid="7">
                <name>Unrated</name>
                <stats><rating value="N/A"/></stats>
            </item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert_eq!(parsed.items[0].rating.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_entities_unescaped_in_name() {
        let xml = r#"<items>
            <item objectid="5"><name>Ticket &amp; Ride</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert_eq!(parsed.items[0].name, "Ticket & Ride");
    }

    #[test]
    fn test_image_url_with_ampersand_cached_whole() {
        // Entity references split the text into multiple events; the full
        // URL must survive into both the item and the cache.
        let xml = r#"<items>
            <item objectid="4">
                <name>Pic</name>
                <image>http://x/img.php?id=4&amp;size=large&amp;fmt=png</image>
            </item>
        </items>"#;
        let (parsed, cache) = parse(xml);
        let expected = "http://x/img.php?id=4&size=large&fmt=png";
        assert_eq!(parsed.items[0].image.as_deref(), Some(expected));
        assert_eq!(cache.get("img-4").as_deref(), Some(expected));
    }

    #[test]
    fn test_numeric_character_reference_resolved() {
        let xml = r#"<items>
            <item objectid="6"><name>Caf&#233;</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert_eq!(parsed.items[0].name, "Café");
    }

    #[test]
    fn test_unknown_entity_kept_raw_not_dropped() {
        let xml = r#"<items>
            <item objectid="8"><name>Foo &weird; Bar</name></item>
        </items>"#;
        let (parsed, _) = parse(xml);
        // The value must never be silently shortened around the entity.
        assert_eq!(parsed.items[0].name, "Foo &weird; Bar");
    }

    #[test]
    fn test_malformed_document_errors() {
        let cache = MemoryCache::new();
        let result = parse_collection("<items><item objectid=", &cache);
        assert!(matches!(result, Err(ScoutError::Xml(_))));
    }

    #[test]
    fn test_only_first_name_is_kept() {
        // Some documents carry alternate names; the first one wins.
        let xml = r#"<items>
            <item objectid="3">
                <name>Primary</name>
                <name>Alternate</name>
            </item>
        </items>"#;
        let (parsed, _) = parse(xml);
        assert_eq!(parsed.items[0].name, "Primary");
    }
}
