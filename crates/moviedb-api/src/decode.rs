//! Response decoding into a generic tree (`serde_json::Value`).

use std::collections::HashMap;

use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use crate::config::ResponseFormat;
use crate::error::{Result, TmdbError};

/// Prefix for attribute keys in decoded XML elements.
pub const XML_ATTRIBUTE_PREFIX: &str = "@";

/// Key holding the text of an XML element that also has attributes or children.
pub const XML_TEXT_KEY: &str = "#text";

/// A YAML engine, tried in list order.
#[derive(Debug, Clone, Copy)]
pub struct YamlEngine {
    /// Engine name (for logs).
    pub name: &'static str,
    parse: fn(&str) -> std::result::Result<Value, String>,
}

/// YAML engines in preference order. Engines are compiled in via cargo features.
pub const YAML_ENGINES: &[YamlEngine] = &[
    #[cfg(feature = "yaml")]
    YamlEngine {
        name: "serde_yaml",
        parse: parse_with_serde_yaml,
    },
];

#[cfg(feature = "yaml")]
fn parse_with_serde_yaml(body: &str) -> std::result::Result<Value, String> {
    serde_yaml::from_str(body).map_err(|e| e.to_string())
}

/// Decodes a response body.
///
/// Returns `Ok(None)` for an empty or whitespace-only body.
///
/// # Errors
///
/// - `TmdbError::Decode` if the body is malformed for `format`.
/// - `TmdbError::NoYamlParserAvailable` if `format` is YAML and no engine is compiled in.
pub fn decode(body: &str, format: ResponseFormat) -> Result<Option<Value>> {
    decode_with(body, format, YAML_ENGINES)
}

fn decode_with(
    body: &str,
    format: ResponseFormat,
    yaml_engines: &[YamlEngine],
) -> Result<Option<Value>> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let parsed = match format {
        ResponseFormat::Json => serde_json::from_str(body).map_err(|e| e.to_string()),
        ResponseFormat::Xml => parse_xml(body),
        ResponseFormat::Yaml => {
            let engine = yaml_engines
                .first()
                .ok_or(TmdbError::NoYamlParserAvailable)?;
            tracing::trace!(engine = engine.name, "Decoding YAML response");
            (engine.parse)(body)
        }
    };

    parsed.map(Some).map_err(|message| TmdbError::Decode {
        format,
        body: String::from(body),
        message,
    })
}

/// Element under construction while walking the XML event stream.
#[derive(Debug, Default)]
struct XmlFrame {
    name: String,
    attributes: Map<String, Value>,
    children: Vec<(String, Value)>,
    text: String,
}

impl XmlFrame {
    fn into_value(self) -> Value {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(String::from(text));
        }

        let mut object = self.attributes;
        for (name, value) in self.children {
            match object.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(name, value);
                }
            }
        }
        if !text.is_empty() {
            object.insert(String::from(XML_TEXT_KEY), Value::String(String::from(text)));
        }
        Value::Object(object)
    }
}

/// Folds an XML document into a tree: the document element becomes the
/// returned value, attributes are `@`-prefixed keys, repeated child names
/// collapse into arrays, and text-only leaves become strings.
fn parse_xml(body: &str) -> std::result::Result<Value, String> {
    let mut reader = Reader::from_str(body);
    let decoder = reader.decoder();
    let mut stack: Vec<XmlFrame> = Vec::new();
    let mut root: Option<Value> = None;
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {e}", reader.error_position()))?;
        match event {
            Event::Start(start) | Event::Empty(start) if root.is_some() => {
                let qname = start.name();
                let name = decoder.decode(qname.as_ref()).map_err(|e| e.to_string())?;
                return Err(format!("unexpected element after document end: {name}"));
            }
            Event::Start(start) => {
                stack.push(open_frame(&start, decoder)?);
            }
            Event::Empty(start) => {
                let frame = open_frame(&start, decoder)?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| String::from("closing tag without matching opening tag"))?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let raw = decoder.decode(&text).map_err(|e| e.to_string())?;
                append_text(&mut stack, &raw, Some(&entities))?;
            }
            Event::CData(cdata) => {
                let raw = decoder.decode(&cdata).map_err(|e| e.to_string())?;
                append_text(&mut stack, &raw, None)?;
            }
            Event::GeneralRef(reference) => {
                let name = decoder.decode(&reference).map_err(|e| e.to_string())?;
                append_text(&mut stack, &format!("&{name};"), Some(&entities))?;
            }
            Event::DocType(doctype) => {
                let raw = decoder.decode(&doctype).map_err(|e| e.to_string())?;
                entities = entity_declarations(&raw);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element: {}", open.name));
    }
    root.ok_or_else(|| String::from("document has no root element"))
}

fn open_frame(
    start: &quick_xml::events::BytesStart<'_>,
    decoder: quick_xml::encoding::Decoder,
) -> std::result::Result<XmlFrame, String> {
    let name = decoder
        .decode(start.name().as_ref())
        .map_err(|e| e.to_string())?
        .into_owned();

    let mut attributes = Map::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = decoder
            .decode(attribute.key.as_ref())
            .map_err(|e| e.to_string())?;
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(|e| e.to_string())?;
        attributes.insert(
            format!("{XML_ATTRIBUTE_PREFIX}{key}"),
            Value::String(value.into_owned()),
        );
    }

    Ok(XmlFrame {
        name,
        attributes,
        ..XmlFrame::default()
    })
}

fn close_frame(frame: XmlFrame, stack: &mut [XmlFrame], root: &mut Option<Value>) {
    let name = frame.name.clone();
    let value = frame.into_value();
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some(value),
    }
}

/// Collects `<!ENTITY name "value">` declarations from an internal DTD subset.
/// Parameter entities and external entities are skipped.
fn entity_declarations(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let mut rest = doctype;
    while let Some((_, after)) = rest.split_once("<!ENTITY") {
        rest = after;
        let declaration = after.trim_start();
        if declaration.starts_with('%') {
            continue;
        }
        let Some((name, tail)) = declaration.split_once(char::is_whitespace) else {
            break;
        };
        let tail = tail.trim_start();
        let Some(quote) = tail.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some((value, _)) = tail
            .strip_prefix(quote)
            .and_then(|quoted| quoted.split_once(quote))
        else {
            break;
        };
        entities.insert(String::from(name), String::from(value));
    }
    entities
}

/// Appends character data to the innermost open element, resolving references
/// against `entities` plus the predefined XML entities. `None` keeps the text
/// verbatim. Text outside the document element must be whitespace.
fn append_text(
    stack: &mut [XmlFrame],
    raw: &str,
    entities: Option<&HashMap<String, String>>,
) -> std::result::Result<(), String> {
    let Some(current) = stack.last_mut() else {
        if raw.trim().is_empty() {
            return Ok(());
        }
        return Err(format!("text outside the document element: {}", raw.trim()));
    };
    match entities {
        Some(entities) => {
            let text = unescape_with(raw, |name| {
                entities
                    .get(name)
                    .map(String::as_str)
                    .or_else(|| resolve_predefined_entity(name))
            })
            .map_err(|e| e.to_string())?;
            current.text.push_str(&text);
        }
        None => current.text.push_str(raw),
    }
    Ok(())
}
