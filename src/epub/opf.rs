//! EPUB package parsing (container.xml, OPF manifest and metadata)

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::EpubError;

use super::markup::{decode_char_data, local_name, strip_bom};

/// Dublin Core fields this crate reads and rewrites
const METADATA_FIELDS: [&str; 3] = ["identifier", "title", "language"];

/// One `<item>` of the OPF manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

impl ManifestItem {
    /// Whether the item is an XHTML or HTML content document
    pub fn is_content_document(&self) -> bool {
        matches!(self.media_type.as_str(), "application/xhtml+xml" | "text/html")
    }
}

/// Book metadata read from the OPF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub identifier: Option<String>,
    pub language: Option<String>,
}

/// Values to write into the OPF metadata; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub identifier: Option<String>,
    pub language: Option<String>,
}

impl MetadataUpdate {
    fn value_for(&self, field: &str) -> Option<&str> {
        match field {
            "title" => self.title.as_deref(),
            "identifier" => self.identifier.as_deref(),
            "language" => self.language.as_deref(),
            _ => None,
        }
    }
}

/// Parsed OPF package data.
#[derive(Debug, Clone, Default)]
pub struct PackageDocument {
    /// Manifest items in document order
    pub manifest: Vec<ManifestItem>,
    pub metadata: Metadata,
}

fn xml_error(part: &str, position: u64, error: impl std::fmt::Display) -> EpubError {
    EpubError::Xml {
        part: part.to_string(),
        position: position as usize,
        message: error.to_string(),
    }
}

fn attribute_value(value: &[u8]) -> String {
    decode_char_data(&String::from_utf8_lossy(value))
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String, EpubError> {
    const PART: &str = "META-INF/container.xml";

    let content = std::str::from_utf8(strip_bom(bytes))
        .map_err(|e| EpubError::InvalidPackage(format!("{} is not UTF-8: {}", PART, e)))?;

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(attribute_value(&attr.value));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(PART, reader.error_position(), e)),
            _ => {}
        }
    }

    Err(EpubError::InvalidPackage("No rootfile found in container.xml".to_string()))
}

/// Parse an OPF package document.
pub fn parse_package(part: &str, content: &str) -> Result<PackageDocument, EpubError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = false;

    let mut package = PackageDocument::default();
    let mut in_metadata = false;
    let mut current_field: Option<&'static str> = None;
    let mut field_text = String::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| xml_error(part, reader.error_position(), e))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"metadata" {
                    in_metadata = true;
                } else if local == b"item" {
                    package.manifest.extend(manifest_item(&e));
                } else if in_metadata && current_field.is_none() {
                    current_field = metadata_field(local);
                    field_text.clear();
                }
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"item" => {
                package.manifest.extend(manifest_item(&e));
            }
            Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) if current_field.is_some() => {
                let raw = &content[start..end];
                match raw.strip_prefix("<![CDATA[").and_then(|r| r.strip_suffix("]]>")) {
                    Some(cdata) => field_text.push_str(cdata),
                    None => field_text.push_str(&decode_char_data(raw)),
                }
            }
            Event::End(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"metadata" {
                    in_metadata = false;
                } else if let Some(field) = current_field {
                    if local == field.as_bytes() {
                        let value = field_text.trim().to_string();
                        let slot = match field {
                            "title" => &mut package.metadata.title,
                            "identifier" => &mut package.metadata.identifier,
                            _ => &mut package.metadata.language,
                        };
                        if slot.is_none() && !value.is_empty() {
                            *slot = Some(value);
                        }
                        current_field = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(package)
}

fn manifest_item(element: &BytesStart<'_>) -> Option<ManifestItem> {
    let mut item = ManifestItem {
        id: String::new(),
        href: String::new(),
        media_type: String::new(),
    };
    for attr in element.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => item.id = attribute_value(&attr.value),
            b"href" => item.href = attribute_value(&attr.value),
            b"media-type" => item.media_type = attribute_value(&attr.value),
            _ => {}
        }
    }
    (!item.href.is_empty()).then_some(item)
}

fn metadata_field(local: &[u8]) -> Option<&'static str> {
    METADATA_FIELDS
        .iter()
        .copied()
        .find(|field| field.as_bytes() == local)
}

/// Where a metadata field sits in the OPF source
#[derive(Debug, Clone, Copy)]
enum FieldSpan {
    /// Byte range of the element content
    Content(usize, usize),
    /// Byte range of a self-closing element
    Empty(usize, usize),
}

/// Rewrite the first `dc:identifier`, `dc:title` and `dc:language` of an OPF.
///
/// Only the text of those elements changes; a missing element is inserted
/// right before `</metadata>`. All other bytes are kept as they are.
pub fn rewrite_metadata(part: &str, content: &str, update: &MetadataUpdate) -> Result<String, EpubError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = false;

    let mut spans: Vec<(&'static str, FieldSpan)> = Vec::new();
    let mut open: Option<(&'static str, usize)> = None;
    let mut in_metadata = false;
    let mut metadata_end: Option<usize> = None;
    let mut dc_prefix = "dc:".to_string();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| xml_error(part, reader.error_position(), e))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"metadata" {
                    in_metadata = true;
                } else if in_metadata && open.is_none() {
                    if let Some(field) = metadata_field(local) {
                        if !spans.iter().any(|(seen, _)| *seen == field) {
                            dc_prefix = element_prefix(name.as_ref());
                            open = Some((field, end));
                        }
                    }
                }
            }
            Event::Empty(e) if in_metadata => {
                let name = e.name();
                if let Some(field) = metadata_field(local_name(name.as_ref())) {
                    if !spans.iter().any(|(seen, _)| *seen == field) {
                        spans.push((field, FieldSpan::Empty(start, end)));
                    }
                }
            }
            Event::End(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"metadata" {
                    in_metadata = false;
                    metadata_end.get_or_insert(start);
                } else if let Some((field, content_start)) = open {
                    if local == field.as_bytes() {
                        spans.push((field, FieldSpan::Content(content_start, start)));
                        open = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    let mut inserts = String::new();

    for field in METADATA_FIELDS {
        let Some(value) = update.value_for(field) else {
            continue;
        };
        let escaped = partial_escape(value);
        match spans.iter().find(|(seen, _)| *seen == field).map(|(_, span)| *span) {
            Some(FieldSpan::Content(start, end)) => edits.push((start, end, escaped.into_owned())),
            Some(FieldSpan::Empty(start, end)) => edits.push((
                start,
                end,
                format!("<{p}{f}>{v}</{p}{f}>", p = dc_prefix, f = field, v = escaped),
            )),
            None => inserts.push_str(&format!("<{p}{f}>{v}</{p}{f}>", p = dc_prefix, f = field, v = escaped)),
        }
    }

    if !inserts.is_empty() {
        let position = metadata_end
            .ok_or_else(|| EpubError::InvalidPackage(format!("{} has no <metadata> element", part)))?;
        edits.push((position, position, inserts));
    }

    edits.sort_by_key(|(start, _, _)| *start);

    let mut rewritten = String::with_capacity(content.len() + 64);
    let mut last = 0;
    for (start, end, replacement) in edits {
        rewritten.push_str(&content[last..start]);
        rewritten.push_str(&replacement);
        last = end;
    }
    rewritten.push_str(&content[last..]);

    Ok(rewritten)
}

/// Namespace prefix of a qualified name, including the colon ("dc:title" -> "dc:")
fn element_prefix(name: &[u8]) -> String {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| String::from_utf8_lossy(&name[..=i]).into_owned())
        .unwrap_or_default()
}
