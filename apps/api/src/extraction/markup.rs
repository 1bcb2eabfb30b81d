//! Markup walker for the structured-block strategies.
//!
//! Flattens a section's HTML fragment into an ordered stream of role-tagged
//! nodes (titles, classed fields, bullets, leaf text) with a `Boundary` at each
//! top-level wrapper block, so every extractor can build entries from the same
//! stream with its own sub-field rules.

use scraper::{ElementRef, Html, Node};

use crate::extraction::patterns::contains_date;

/// Sub-field role inferred from a tag's `class`, or from the tag itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Title,
    Company,
    Date,
    Location,
    Tech,
    Issuer,
    Description,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Start of a new top-level wrapper block.
    Boundary,
    Title(String),
    Field { role: FieldRole, text: String },
    Bullet(String),
    /// Text of a leaf paragraph/div.
    Text(String),
}

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "dt"];
const WRAPPER_TAGS: &[&str] = &["div", "article", "section", "tr", "dl"];
const INLINE_FIELD_TAGS: &[&str] = &["span", "em", "i", "small", "time", "strong", "b", "dd"];
const LEAF_TEXT_TAGS: &[&str] = &["p", "div", "td"];
const INLINE_TAGS: &[&str] = &[
    "span", "b", "i", "a", "br", "strong", "em", "small", "u", "time", "code", "sup", "sub", "mark",
];

fn role_from_class(class: &str) -> Option<FieldRole> {
    let class = class.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| class.contains(n));
    if has(&["company", "employer", "organization", "organisation", "institution", "school"]) {
        Some(FieldRole::Company)
    } else if has(&["date", "duration", "period", "time", "year"]) {
        Some(FieldRole::Date)
    } else if has(&["location", "place", "city"]) {
        Some(FieldRole::Location)
    } else if has(&["tech", "stack", "tools"]) {
        Some(FieldRole::Tech)
    } else if has(&["issuer", "authority"]) {
        Some(FieldRole::Issuer)
    } else if has(&["desc", "summary", "detail"]) {
        Some(FieldRole::Description)
    } else if has(&["title", "role", "position", "degree", "name", "heading"]) {
        Some(FieldRole::Title)
    } else {
        None
    }
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_element_children(el: &ElementRef<'_>) -> bool {
    el.children().any(|child| child.value().is_element())
}

/// A block whose own text runs through inline markup ("Led the <b>billing</b>
/// migration", "Acme Corp<br>2020"). Blocks made only of inline elements with
/// no text of their own keep per-element fields, as do classed children.
fn is_inline_text_block(el: &ElementRef<'_>) -> bool {
    let own_text = el
        .children()
        .any(|child| child.value().as_text().is_some_and(|t| !t.trim().is_empty()));
    let line_break = el
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| child.value().name() == "br");
    if !own_text && !line_break {
        return false;
    }
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .all(|d| {
            INLINE_TAGS.contains(&d.value().name())
                && d.value().attr("class").and_then(role_from_class).is_none()
        })
}

/// Text of an inline block, one entry per `<br>`-separated line.
fn inline_lines(el: &ElementRef<'_>) -> Vec<String> {
    let mut lines = vec![String::new()];
    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => {
                if let Some(line) = lines.last_mut() {
                    line.push_str(text);
                    line.push(' ');
                }
            }
            Node::Element(element) if element.name() == "br" => lines.push(String::new()),
            _ => {}
        }
    }
    lines
        .into_iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Walks `html` and returns the node stream. Returns an empty stream for
/// fragments with no element structure.
pub fn walk(html: &str) -> Vec<MarkupNode> {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();

    let has_headings = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| HEADING_TAGS.contains(&el.value().name()));

    let top_level: Vec<_> = root.children().map(|child| child.id()).collect();
    let mut consumed = Vec::new();
    let mut nodes = Vec::new();

    for el in root.descendants().filter_map(ElementRef::wrap) {
        if el.id() == root.id() {
            continue;
        }
        if el.ancestors().any(|a| consumed.contains(&a.id())) {
            continue;
        }

        let name = el.value().name();
        if top_level.contains(&el.id()) && WRAPPER_TAGS.contains(&name) {
            nodes.push(MarkupNode::Boundary);
        }

        let class_role = el.value().attr("class").and_then(role_from_class);
        let text = element_text(&el);

        if HEADING_TAGS.contains(&name) || (!has_headings && matches!(name, "strong" | "b")) {
            consumed.push(el.id());
            if !text.is_empty() {
                nodes.push(MarkupNode::Title(text));
            }
            continue;
        }

        if name == "li" {
            consumed.push(el.id());
            if !text.is_empty() {
                nodes.push(MarkupNode::Bullet(text));
            }
            continue;
        }

        if LEAF_TEXT_TAGS.contains(&name) && is_inline_text_block(&el) {
            consumed.push(el.id());
            for line in inline_lines(&el) {
                nodes.push(match class_role {
                    Some(FieldRole::Title) => MarkupNode::Title(line),
                    Some(role) => MarkupNode::Field { role, text: line },
                    None => MarkupNode::Text(line),
                });
            }
            continue;
        }

        if INLINE_FIELD_TAGS.contains(&name) || (class_role.is_some() && !has_element_children(&el)) {
            consumed.push(el.id());
            if text.is_empty() {
                continue;
            }
            let role = match class_role {
                Some(role) => role,
                None if name == "time" || contains_date(&text) => FieldRole::Date,
                None => FieldRole::Unknown,
            };
            if role == FieldRole::Title {
                nodes.push(MarkupNode::Title(text));
            } else {
                nodes.push(MarkupNode::Field { role, text });
            }
            continue;
        }

        if LEAF_TEXT_TAGS.contains(&name) && !has_element_children(&el) {
            consumed.push(el.id());
            if !text.is_empty() {
                nodes.push(MarkupNode::Text(text));
            }
        }
    }

    nodes
}

/// Whether the stream carries enough structure for a block strategy.
pub fn has_structure(nodes: &[MarkupNode]) -> bool {
    nodes
        .iter()
        .any(|n| matches!(n, MarkupNode::Title(_) | MarkupNode::Field { .. }))
}

/// Text of every bullet, leaf paragraph and inline field, in order.
pub fn item_texts(nodes: &[MarkupNode]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|node| match node {
            MarkupNode::Bullet(text) | MarkupNode::Text(text) | MarkupNode::Title(text) => {
                Some(text.clone())
            }
            MarkupNode::Field { text, .. } => Some(text.clone()),
            MarkupNode::Boundary => None,
        })
        .collect()
}
