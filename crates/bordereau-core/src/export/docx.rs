//! Docx template rendering.
//!
//! A template is an ordinary `.docx` whose text contains tags:
//! `{name}` is replaced by a value from the context and `{#name}...{/name}`
//! repeats its body once per item of the array `name`. Only the main
//! document part and header/footer parts are rendered; every other entry of
//! the package is copied unchanged.

use std::fmt::Display;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{json, Value};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::BordereauError;
use crate::model::DescriptionEntry;

const DOCUMENT_PART: &str = "word/document.xml";

/// Longest run of text accepted between `{` and `}`.
const MAX_TAG_LEN: usize = 128;

/// Line break inside a run of text.
const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

/// Read a template from disk.
pub fn load_template(path: &Path) -> Result<Vec<u8>, BordereauError> {
    std::fs::read(path).map_err(|e| BordereauError::TemplateUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Context handed to the description template.
///
/// Each project exposes its text as both `description` and `descriptif` so
/// templates written with either tag work.
pub fn description_context(entries: &[DescriptionEntry]) -> Value {
    let projects: Vec<Value> = entries
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "title": e.title,
                "description": e.description,
                "descriptif": e.description,
            })
        })
        .collect();
    json!({ "projects": projects })
}

/// Render the description document for the given entries.
pub fn render_document(
    template: &[u8],
    entries: &[DescriptionEntry],
) -> Result<Vec<u8>, BordereauError> {
    render_docx(template, &description_context(entries))
}

/// Render every templated part of a docx package against `context`.
pub fn render_docx(template: &[u8], context: &Value) -> Result<Vec<u8>, BordereauError> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .map_err(|e| package_error("template is not a docx package", e))?;
    if archive.by_name(DOCUMENT_PART).is_err() {
        return Err(BordereauError::RenderFailure(format!(
            "template has no {DOCUMENT_PART}"
        )));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let name = archive
            .by_index_raw(i)
            .map_err(|e| package_error("unreadable template entry", e))?
            .name()
            .to_string();

        if is_templated_part(&name) {
            let mut xml = String::new();
            archive
                .by_index(i)
                .map_err(|e| package_error("unreadable template entry", e))?
                .read_to_string(&mut xml)
                .map_err(|e| package_error(&name, e))?;

            let rendered = render_xml(&xml, context)?;
            check_well_formed(&rendered, &name)?;
            debug!(part = %name, "rendered template part");

            writer
                .start_file(name.as_str(), options)
                .map_err(|e| package_error("failed to write document", e))?;
            writer
                .write_all(rendered.as_bytes())
                .map_err(|e| package_error("failed to write document", e))?;
        } else {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| package_error("unreadable template entry", e))?;
            writer
                .raw_copy_file(entry)
                .map_err(|e| package_error("failed to copy template entry", e))?;
        }
    }

    let bytes = writer
        .finish()
        .map_err(|e| package_error("failed to write document", e))?
        .into_inner();
    info!(bytes = bytes.len(), "document rendered");
    Ok(bytes)
}

fn package_error(context: &str, e: impl Display) -> BordereauError {
    BordereauError::RenderFailure(format!("{context}: {e}"))
}

fn is_templated_part(name: &str) -> bool {
    name == DOCUMENT_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// Render one XML part.
pub fn render_xml(xml: &str, context: &Value) -> Result<String, BordereauError> {
    let collapsed = collapse_split_tags(xml);
    let hoisted = hoist_loop_paragraphs(&collapsed);
    let nodes = build_tree(&hoisted)?;

    let mut out = String::with_capacity(hoisted.len());
    let mut scopes = vec![context];
    render_nodes(&nodes, &mut scopes, &mut out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tag scanning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Var,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct TagSpan<'a> {
    kind: TagKind,
    name: &'a str,
    start: usize,
    end: usize,
}

/// Find every tag that sits in text content (never inside markup).
fn scan_tags(xml: &str) -> Vec<TagSpan<'_>> {
    let bytes = xml.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => i = markup_end(xml, i),
            b'{' => match parse_tag(xml, i) {
                Some(tag) => {
                    i = tag.end;
                    tags.push(tag);
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    tags
}

fn parse_tag(xml: &str, start: usize) -> Option<TagSpan<'_>> {
    let rest = &xml[start + 1..];
    let stop = rest.find(|c: char| matches!(c, '}' | '{' | '<'))?;
    if !rest[stop..].starts_with('}') || stop > MAX_TAG_LEN {
        return None;
    }

    let inner = rest[..stop].trim();
    let (kind, name) = if let Some(n) = inner.strip_prefix('#') {
        (TagKind::Open, n.trim())
    } else if let Some(n) = inner.strip_prefix('/') {
        (TagKind::Close, n.trim())
    } else {
        (TagKind::Var, inner)
    };

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    valid.then_some(TagSpan {
        kind,
        name,
        start,
        end: start + 1 + stop + 1,
    })
}

/// Index just past the markup starting at `start`.
fn markup_end(xml: &str, start: usize) -> usize {
    xml[start..]
        .find('>')
        .map(|p| start + p + 1)
        .unwrap_or(xml.len())
}

fn is_paragraph_start(markup: &str) -> bool {
    markup.starts_with("<w:p>") || markup.starts_with("<w:p ")
}

/// Rejoin tags that a word processor split over several runs.
///
/// `<w:t>{ti</w:t></w:r><w:r><w:t>tle}</w:t>` becomes
/// `<w:t>{title}</w:t></w:r><w:r><w:t></w:t>`: the text moves next to the
/// opening brace and the markup that was in between follows it unchanged,
/// so the element structure is preserved. Tags never span paragraphs.
fn collapse_split_tags(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut i = 0;

    while let Some(c) = xml[i..].chars().next() {
        match c {
            '<' => {
                let end = markup_end(xml, i);
                out.push_str(&xml[i..end]);
                i = end;
            }
            '{' => match gather_split_tag(xml, i) {
                Some((text, markup, end)) => {
                    out.push_str(&text);
                    out.push_str(&markup);
                    i = end;
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            },
            _ => {
                out.push(c);
                i += c.len_utf8();
            }
        }
    }
    out
}

/// Returns (tag text, markup crossed, end index) only for tags that really
/// are split by markup.
fn gather_split_tag(xml: &str, start: usize) -> Option<(String, String, usize)> {
    let mut text = String::from("{");
    let mut markup = String::new();
    let mut i = start + 1;

    while let Some(c) = xml[i..].chars().next() {
        match c {
            '<' => {
                let end = markup_end(xml, i);
                let piece = &xml[i..end];
                if piece.starts_with("</w:p>") || is_paragraph_start(piece) {
                    return None;
                }
                markup.push_str(piece);
                i = end;
            }
            '}' => {
                if markup.is_empty() {
                    return None;
                }
                text.push('}');
                return Some((text, markup, i + 1));
            }
            '{' => return None,
            _ => {
                text.push(c);
                if text.len() > MAX_TAG_LEN {
                    return None;
                }
                i += c.len_utf8();
            }
        }
    }
    None
}

/// Drop the paragraph around a loop tag that is alone in it, so a loop
/// repeats whole paragraphs and leaves no empty lines behind.
fn hoist_loop_paragraphs(xml: &str) -> String {
    let loop_tags: Vec<(usize, usize)> = scan_tags(xml)
        .into_iter()
        .filter(|t| t.kind != TagKind::Var)
        .map(|t| (t.start, t.end))
        .collect();

    let mut out = xml.to_string();
    for (start, end) in loop_tags.into_iter().rev() {
        let Some((p_start, p_end)) = enclosing_paragraph(&out, start, end) else {
            continue;
        };
        let tag = out[start..end].to_string();
        if paragraph_text(&out[p_start..p_end]).trim() == tag {
            out.replace_range(p_start..p_end, &tag);
        }
    }
    out
}

fn enclosing_paragraph(xml: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let before = &xml[..start];
    let p_start = match (before.rfind("<w:p>"), before.rfind("<w:p ")) {
        (Some(a), Some(b)) => a.max(b),
        (a, b) => a.or(b)?,
    };
    if before[p_start..].contains("</w:p>") {
        return None;
    }
    let p_end = end + xml[end..].find("</w:p>")? + "</w:p>".len();
    Some((p_start, p_end))
}

/// Text content of a fragment, markup removed.
fn paragraph_text(fragment: &str) -> String {
    let mut text = String::new();
    let mut in_markup = false;
    for c in fragment.chars() {
        match c {
            '<' => in_markup = true,
            '>' => in_markup = false,
            _ if !in_markup => text.push(c),
            _ => {}
        }
    }
    text
}

// ---------------------------------------------------------------------------
// Tree building and rendering
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Node<'a> {
    Raw(&'a str),
    Var(&'a str),
    Section { name: &'a str, body: Vec<Node<'a>> },
}

fn build_tree(xml: &str) -> Result<Vec<Node<'_>>, BordereauError> {
    let mut root = Vec::new();
    let mut open: Vec<(&str, Vec<Node<'_>>)> = Vec::new();
    let mut last = 0;

    for tag in scan_tags(xml) {
        let current = match open.last_mut() {
            Some((_, body)) => body,
            None => &mut root,
        };
        if last < tag.start {
            current.push(Node::Raw(&xml[last..tag.start]));
        }
        last = tag.end;

        match tag.kind {
            TagKind::Var => current.push(Node::Var(tag.name)),
            TagKind::Open => open.push((tag.name, Vec::new())),
            TagKind::Close => {
                let Some((name, body)) = open.pop() else {
                    return Err(BordereauError::RenderFailure(format!(
                        "unexpected {{/{}}} without matching {{#{}}}",
                        tag.name, tag.name
                    )));
                };
                if name != tag.name {
                    return Err(BordereauError::RenderFailure(format!(
                        "loop {{#{name}}} closed by {{/{}}}",
                        tag.name
                    )));
                }
                let parent = match open.last_mut() {
                    Some((_, body)) => body,
                    None => &mut root,
                };
                parent.push(Node::Section { name, body });
            }
        }
    }

    if let Some((name, _)) = open.last() {
        return Err(BordereauError::RenderFailure(format!(
            "unclosed loop {{#{name}}}"
        )));
    }

    if last < xml.len() {
        root.push(Node::Raw(&xml[last..]));
    }
    Ok(root)
}

fn render_nodes<'v>(
    nodes: &[Node<'_>],
    scopes: &mut Vec<&'v Value>,
    out: &mut String,
) -> Result<(), BordereauError> {
    for node in nodes {
        match node {
            Node::Raw(s) => out.push_str(s),
            Node::Var(name) => {
                if let Some(value) = lookup(scopes, name) {
                    push_text(out, &value_text(value));
                }
            }
            Node::Section { name, body } => match lookup(scopes, name) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => {}
                Some(Value::Bool(true)) => render_nodes(body, scopes, out)?,
                Some(Value::Array(items)) => {
                    for item in items {
                        scopes.push(item);
                        let result = render_nodes(body, scopes, out);
                        scopes.pop();
                        result?;
                    }
                }
                Some(obj @ Value::Object(_)) => {
                    scopes.push(obj);
                    let result = render_nodes(body, scopes, out);
                    scopes.pop();
                    result?;
                }
                Some(other) => {
                    return Err(BordereauError::RenderFailure(format!(
                        "{{#{name}}} expects a list, got {other}"
                    )));
                }
            },
        }
    }
    Ok(())
}

fn lookup<'v>(scopes: &[&'v Value], name: &str) -> Option<&'v Value> {
    scopes.iter().rev().copied().find_map(|scope| scope.get(name))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Append escaped text, turning line breaks into `<w:br/>`.
fn push_text(out: &mut String, text: &str) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            out.push_str(LINE_BREAK);
        }
        out.push_str(&quick_xml::escape::escape(line));
    }
}

/// Reject output that a word processor would refuse to open.
fn check_well_formed(xml: &str, part: &str) -> Result<(), BordereauError> {
    let mut reader = Reader::from_str(xml);
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(BordereauError::RenderFailure(format!(
                    "{part} is not well-formed after rendering (at byte {}): {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if depth != 0 {
        return Err(BordereauError::RenderFailure(format!(
            "{part} has unclosed elements after rendering"
        )));
    }
    Ok(())
}
