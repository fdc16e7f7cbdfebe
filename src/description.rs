//! Description block resolution.
//!
//! Plain text passes through. File kinds are loaded and reformatted: markdown
//! verbatim, JSON pretty-printed, XML re-serialized after a well-formedness
//! check. A missing or malformed file is an error, never skipped.

use crate::error::{AnnotationError, Result};
use crate::model::{Description, DescriptionKind};
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Resolve a description into render text.
pub fn resolve(description: &Description) -> Result<String> {
    let file = Path::new(&description.payload);
    match description.kind {
        DescriptionKind::Plain => Ok(description.payload.clone()),
        DescriptionKind::Markdown => fs::read_to_string(file).map_err(|_| {
            AnnotationError::new(format!(
                "markdown description file not exist :{}",
                file.display()
            ))
        }),
        DescriptionKind::Json => {
            let content = fs::read_to_string(file).map_err(|_| {
                AnnotationError::new(format!("json file not exist :{}", file.display()))
            })?;
            let pretty = pretty_json(&content).ok_or_else(|| {
                AnnotationError::new(format!("json file :{} not a valid format", file.display()))
            })?;
            Ok(format!("```json\n{}\n```", pretty))
        }
        DescriptionKind::Xml => {
            let content = fs::read_to_string(file).map_err(|_| {
                AnnotationError::new(format!("xml file not exist :{}", file.display()))
            })?;
            let canonical = canonical_xml(&content).ok_or_else(|| {
                AnnotationError::new(format!("xml file :{} not a valid format", file.display()))
            })?;
            Ok(format!("```xml\n{}\n```", canonical))
        }
    }
}

/// Resolve an optional description; `None` stays `None`.
pub fn resolve_opt(description: Option<&Description>) -> Result<Option<String>> {
    description.map(resolve).transpose()
}

/// Pretty-print a JSON document with four-space indentation.
///
/// Only arrays and objects are accepted.
fn pretty_json(content: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    if !value.is_array() && !value.is_object() {
        return None;
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).ok()?;
    String::from_utf8(buf).ok()
}

/// Re-serialize an XML document with a normalized declaration.
///
/// CDATA sections are folded into escaped text; comments and processing
/// instructions are dropped. Returns `None` unless the input holds exactly one
/// balanced root element with well-formed attributes and known entities.
fn canonical_xml(content: &str) -> Option<String> {
    let mut reader = Reader::from_str(content);
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .ok()?;
    writer.write_event(Event::Text(BytesText::new("\n"))).ok()?;

    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        let event = reader.read_event().ok()?;
        match event {
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
            Event::Start(start) => {
                if depth == 0 {
                    roots += 1;
                }
                check_attributes(&start)?;
                depth += 1;
                writer.write_event(Event::Start(start)).ok()?;
            }
            Event::Empty(empty) => {
                if depth == 0 {
                    roots += 1;
                }
                check_attributes(&empty)?;
                writer.write_event(Event::Empty(empty)).ok()?;
            }
            Event::End(end) => {
                depth = depth.checked_sub(1)?;
                writer.write_event(Event::End(end)).ok()?;
            }
            Event::Text(text) => {
                if depth == 0 {
                    // Only whitespace may sit outside the root element.
                    if text.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    return None;
                }
                text.unescape().ok()?;
                writer.write_event(Event::Text(text)).ok()?;
            }
            Event::CData(cdata) => {
                if depth == 0 {
                    return None;
                }
                let raw = std::str::from_utf8(&cdata).ok()?.to_string();
                writer.write_event(Event::Text(BytesText::new(&raw))).ok()?;
            }
            _ => continue,
        }
    }
    if depth != 0 || roots != 1 {
        return None;
    }
    String::from_utf8(writer.into_inner()).ok()
}

/// Attributes are parsed lazily by the reader; force the syntax, duplicate
/// and entity checks here.
fn check_attributes(element: &BytesStart) -> Option<()> {
    for attr in element.attributes().with_checks(true) {
        attr.ok()?.unescape_value().ok()?;
    }
    Some(())
}
