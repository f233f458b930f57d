/*!
 * XHTML text walk.
 *
 * A content document is split into raw markup segments and text runs. Only
 * text runs are exposed for translation; everything else, including runs that
 * are never written, is emitted byte-for-byte when the document is serialized.
 */

use quick_xml::escape::partial_escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::EpubError;
use crate::translation::TextPosition;

use super::markup::{local_name, split_char_data, CharPiece};

/// Elements whose character data is never translated
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const BOM: &str = "\u{FEFF}";

/// A run of character data exposed for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Source bytes of the run
    raw: String,
    /// Decoded text, replaced on write
    value: String,
    /// Whether `value` was written
    edited: bool,
}

impl TextRun {
    fn new(raw: &str, value: String) -> Self {
        Self {
            raw: raw.to_string(),
            value,
            edited: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Raw(String),
    Text(TextRun),
}

/// Parsed content document
#[derive(Debug, Clone, Default)]
pub struct XhtmlDocument {
    segments: Vec<Segment>,
}

/// Handle on one text run of an `XhtmlDocument`
#[derive(Debug)]
pub struct TextSlot<'a> {
    run: &'a mut TextRun,
}

impl TextPosition for TextSlot<'_> {
    /// The run's text without surrounding whitespace
    fn read(&self) -> String {
        self.run.value.trim().to_string()
    }

    /// Store `text`, keeping the run's original leading and trailing whitespace
    fn write(&mut self, text: String) {
        let value = &self.run.value;
        let leading = &value[..value.len() - value.trim_start().len()];
        let trailing = &value[value.trim_end().len()..];
        self.run.value = format!("{}{}{}", leading, text, trailing);
        self.run.edited = true;
    }
}

impl XhtmlDocument {
    /// Parse a content document. `part` names the document in errors.
    pub fn parse(part: &str, content: &str) -> Result<Self, EpubError> {
        let mut document = Self::default();

        let body = match content.strip_prefix(BOM) {
            Some(rest) => {
                document.push_raw(BOM);
                rest
            }
            None => content,
        };
        let bom_len = content.len() - body.len();

        let mut reader = Reader::from_str(body);
        reader.config_mut().check_end_names = false;
        reader.config_mut().allow_dangling_amp = true;

        let mut open_elements: Vec<String> = Vec::new();
        let mut char_data_start: Option<usize> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(EpubError::Xml {
                        part: part.to_string(),
                        position: reader.error_position() as usize + bom_len,
                        message: e.to_string(),
                    });
                }
            };
            let end = reader.buffer_position() as usize;

            if matches!(event, Event::Text(_) | Event::GeneralRef(_)) {
                char_data_start.get_or_insert(start);
                continue;
            }

            if let Some(data_start) = char_data_start.take() {
                let raw_text = open_elements
                    .iter()
                    .any(|name| RAW_TEXT_ELEMENTS.contains(&name.as_str()));
                document.push_char_data(&body[data_start..start], raw_text);
            }

            match event {
                Event::Start(e) => {
                    open_elements.push(element_name(e.name().as_ref()));
                    document.push_raw(&body[start..end]);
                }
                Event::End(e) => {
                    let name = element_name(e.name().as_ref());
                    if let Some(index) = open_elements.iter().rposition(|open| *open == name) {
                        open_elements.truncate(index);
                    }
                    document.push_raw(&body[start..end]);
                }
                Event::Eof => {
                    document.push_raw(&body[start..]);
                    break;
                }
                _ => document.push_raw(&body[start..end]),
            }
        }

        Ok(document)
    }

    fn push_raw(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Raw(previous)) => previous.push_str(raw),
            _ => self.segments.push(Segment::Raw(raw.to_string())),
        }
    }

    fn push_char_data(&mut self, raw: &str, raw_text: bool) {
        if raw_text {
            self.push_raw(raw);
            return;
        }

        for piece in split_char_data(raw) {
            match piece {
                CharPiece::Text { raw, value } if !value.trim().is_empty() => {
                    self.segments.push(Segment::Text(TextRun::new(raw, value)));
                }
                CharPiece::Text { raw, .. } | CharPiece::Unresolved(raw) => self.push_raw(raw),
            }
        }
    }

    /// Text runs in document order
    pub fn text_positions(&mut self) -> impl Iterator<Item = TextSlot<'_>> {
        self.segments.iter_mut().filter_map(|segment| match segment {
            Segment::Text(run) => Some(TextSlot { run }),
            Segment::Raw(_) => None,
        })
    }

    /// Number of translatable text runs
    pub fn text_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Text(_)))
            .count()
    }

    /// Whether any run was written
    pub fn is_modified(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Text(run) if run.edited))
    }

    /// Serialize the document
    pub fn to_xhtml(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Raw(raw) => out.push_str(raw),
                Segment::Text(run) if run.edited => out.push_str(&partial_escape(&run.value)),
                Segment::Text(run) => out.push_str(&run.raw),
            }
        }
        out
    }
}

fn element_name(name: &[u8]) -> String {
    String::from_utf8_lossy(local_name(name)).to_ascii_lowercase()
}
