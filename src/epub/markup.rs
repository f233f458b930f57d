//! Small XML helpers shared by the OPF and XHTML readers

use quick_xml::escape::resolve_html5_entity;

/// Strip a UTF-8 BOM if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve a predefined or numeric XML entity name (without `&` and `;`).
pub fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

fn is_entity_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '_' | '-' | '.'))
}

/// A piece of character data after entity handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharPiece<'a> {
    /// Resolvable text: the raw source and its decoded value
    Text { raw: &'a str, value: String },
    /// An entity reference that cannot be resolved, kept verbatim
    Unresolved(&'a str),
}

/// Split raw character data into decoded text pieces and unresolvable entity references.
///
/// XML and HTML5 named entities decode into the surrounding text so a sentence
/// with `&nbsp;` or `&mdash;` stays one piece. A lone `&` without a closing `;`
/// is kept as literal text.
pub fn split_char_data(raw: &str) -> Vec<CharPiece<'_>> {
    let mut pieces = Vec::new();
    let mut run_start = 0;
    let mut value = String::new();
    let mut cursor = 0;

    while let Some(offset) = raw[cursor..].find('&') {
        let amp = cursor + offset;
        value.push_str(&raw[cursor..amp]);

        let semi = raw[amp..].find(';').map(|i| amp + i);
        let Some(semi) = semi.filter(|&semi| is_entity_name(&raw[amp + 1..semi])) else {
            value.push('&');
            cursor = amp + 1;
            continue;
        };

        let name = &raw[amp + 1..semi];
        if let Some(c) = resolve_entity(name) {
            value.push(c);
        } else if let Some(text) = resolve_html5_entity(name) {
            value.push_str(text);
        } else {
            if amp > run_start {
                pieces.push(CharPiece::Text {
                    raw: &raw[run_start..amp],
                    value: std::mem::take(&mut value),
                });
            }
            pieces.push(CharPiece::Unresolved(&raw[amp..=semi]));
            run_start = semi + 1;
        }
        cursor = semi + 1;
    }

    value.push_str(&raw[cursor..]);
    if run_start < raw.len() {
        pieces.push(CharPiece::Text {
            raw: &raw[run_start..],
            value,
        });
    }

    pieces
}

/// Decode character data, leaving unresolvable references as written.
pub fn decode_char_data(raw: &str) -> String {
    split_char_data(raw)
        .into_iter()
        .map(|piece| match piece {
            CharPiece::Text { value, .. } => value,
            CharPiece::Unresolved(raw) => raw.to_string(),
        })
        .collect()
}
