use std::fmt::Write;

use crate::parsing::ast::{Align, Document, Node, NodeData};

/// Renders `doc` as one line per node, children indented by two spaces.
///
/// Definitions come first as `definition` lines. Positions are left out so
/// snapshots survive unrelated offset changes.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    for definition in doc.meta.values() {
        let _ = write!(
            out,
            "definition {:?} -> {:?}",
            definition.identifier, definition.destination
        );
        if let Some(title) = &definition.title {
            let _ = write!(out, " title={title:?}");
        }
        out.push('\n');
    }
    for node in &doc.children {
        render_node(node, 0, &mut out);
    }
    out
}

fn render_node(node: &Node, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(node.kind);
    let data = render_data(&node.data);
    if !data.is_empty() {
        out.push(' ');
        out.push_str(&data);
    }
    if let Some(value) = &node.value {
        let _ = write!(out, " {value:?}");
    }
    out.push('\n');
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

fn render_data(data: &NodeData) -> String {
    let mut fields: Vec<String> = Vec::new();
    match data {
        NodeData::None => {}
        NodeData::Heading { depth } => fields.push(format!("depth={depth}")),
        NodeData::Code { lang, meta } => {
            if let Some(lang) = lang {
                fields.push(format!("lang={lang:?}"));
            }
            if let Some(meta) = meta {
                fields.push(format!("meta={meta:?}"));
            }
        }
        NodeData::List {
            ordered,
            start,
            spread,
            marker,
        } => {
            fields.push(format!("ordered={ordered}"));
            if let Some(start) = start {
                fields.push(format!("start={start}"));
            }
            fields.push(format!("spread={spread}"));
            fields.push(format!("marker={marker:?}"));
        }
        NodeData::ListItem { spread, checked } => {
            fields.push(format!("spread={spread}"));
            if let Some(checked) = checked {
                fields.push(format!("checked={checked}"));
            }
        }
        NodeData::Table { align } => {
            let align: Vec<&str> = align
                .iter()
                .map(|a| match a {
                    Align::None => "none",
                    Align::Left => "left",
                    Align::Center => "center",
                    Align::Right => "right",
                })
                .collect();
            fields.push(format!("align=[{}]", align.join(",")));
        }
        NodeData::Link { url, title } => {
            fields.push(format!("url={url:?}"));
            if let Some(title) = title {
                fields.push(format!("title={title:?}"));
            }
        }
        NodeData::Image { url, title, alt } => {
            fields.push(format!("url={url:?}"));
            if let Some(title) = title {
                fields.push(format!("title={title:?}"));
            }
            fields.push(format!("alt={alt:?}"));
        }
        NodeData::Reference {
            identifier,
            reference_type,
            ..
        } => {
            fields.push(format!("identifier={identifier:?}"));
            fields.push(format!("type={}", reference_type.as_str()));
        }
        NodeData::ImageReference {
            identifier,
            reference_type,
            alt,
            ..
        } => {
            fields.push(format!("identifier={identifier:?}"));
            fields.push(format!("type={}", reference_type.as_str()));
            fields.push(format!("alt={alt:?}"));
        }
    }
    fields.join(" ")
}
