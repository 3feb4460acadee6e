use crate::model::{MindNode, OutlineItem};
use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag, TagEnd};

/// One heading as scanned from the source, with its byte range.
struct RawHeading {
    level: u8,
    text: String,
    start: usize,
    end: usize,
}

struct ScanResult {
    title: Option<String>,
    content_start_offset: usize,
    headings: Vec<RawHeading>,
}

fn scan_markdown(text: &str) -> ScanResult {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

    let parser = Parser::new_ext(text, options);

    let mut title = None;
    let mut content_start_offset = 0;
    let mut headings = Vec::new();

    let mut in_heading = false;
    let mut current_heading_level = 0;
    let mut pending_heading_text: Option<(String, usize)> = None;

    let mut in_frontmatter = false;
    let mut frontmatter_content = String::new();

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                in_frontmatter = true;
            }
            Event::End(TagEnd::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
                in_frontmatter = false;
                if let Ok(json) = serde_yaml::from_str::<serde_json::Value>(&frontmatter_content) {
                    if let Some(t) = json.get("title").and_then(|v| v.as_str()) {
                        title = Some(t.to_string());
                    }
                }
                content_start_offset = range.end;
            }

            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = true;
                current_heading_level = level as u8;
                pending_heading_text = Some((String::new(), range.start));
            }
            Event::End(TagEnd::Heading(..)) => {
                if let Some((heading_text, start)) = pending_heading_text.take() {
                    let trimmed_text = heading_text.trim().to_string();
                    if !trimmed_text.is_empty() {
                        headings.push(RawHeading {
                            level: current_heading_level,
                            text: trimmed_text,
                            start,
                            end: range.end,
                        });
                    }
                }
                in_heading = false;
            }

            Event::Text(cow_str) | Event::Code(cow_str) => {
                let chunk = cow_str.as_ref();
                if in_frontmatter {
                    frontmatter_content.push_str(chunk);
                } else if in_heading {
                    if let Some((ref mut heading_text, _)) = pending_heading_text.as_mut() {
                        if !heading_text.is_empty() {
                            heading_text.push(' ');
                        }
                        heading_text.push_str(chunk);
                    }
                }
            }
            _ => {}
        }
    }

    ScanResult {
        title,
        content_start_offset,
        headings,
    }
}

struct Section {
    level: u8,
    topic: String,
    body: String,
}

fn build_subtree(sections: &mut std::iter::Peekable<std::vec::IntoIter<Section>>, parent_level: u8) -> Vec<MindNode> {
    let mut nodes = Vec::new();
    while let Some(next) = sections.peek() {
        if next.level <= parent_level {
            break;
        }
        let section = sections.next().unwrap();
        let mut node = MindNode::new(section.topic).with_text(section.body);
        node.children = build_subtree(sections, section.level);
        nodes.push(node);
    }
    nodes
}

/// Parse flat markdown into the structured outline form.
///
/// Headings nest by level; the prose between a heading and the next becomes
/// that node's `text`. A frontmatter `title:` names the root; otherwise a
/// document with a single top-level heading and no preamble is promoted so
/// that heading becomes the root. Everything else hangs off a synthetic
/// container root.
pub fn parse_mind(text: &str) -> MindNode {
    let scan = scan_markdown(text);

    let first_start = scan
        .headings
        .first()
        .map(|h| h.start)
        .unwrap_or(text.len());
    let preamble = text
        .get(scan.content_start_offset..first_start)
        .unwrap_or("")
        .trim();

    let mut sections = Vec::with_capacity(scan.headings.len());
    for (i, heading) in scan.headings.iter().enumerate() {
        let body_end = scan
            .headings
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(text.len());
        let body = text.get(heading.end..body_end).unwrap_or("").trim();
        sections.push(Section {
            level: heading.level,
            topic: heading.text.clone(),
            body: body.to_string(),
        });
    }

    let mut iter = sections.into_iter().peekable();
    let children = build_subtree(&mut iter, 0);

    let mut root = MindNode::container().with_text(preamble);
    root.children = children;
    if let Some(title) = scan.title {
        root.topic = title;
    } else if root.text.is_none() && root.children.len() == 1 {
        root = root.children.pop().unwrap();
    }
    root
}

/// Render the structured outline back to flat markdown.
/// Inverse of [`parse_mind`] up to level normalization and node ids.
pub fn render_markdown(root: &MindNode) -> String {
    let mut out = String::new();
    let base_level = if root.is_container() {
        0
    } else {
        push_heading(&mut out, 1, &root.topic);
        1
    };
    if let Some(text) = &root.text {
        out.push_str(text);
        out.push_str("\n\n");
    }
    for child in &root.children {
        render_node(child, base_level + 1, &mut out);
    }

    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

fn render_node(node: &MindNode, level: u8, out: &mut String) {
    push_heading(out, level, &node.topic);
    if let Some(text) = &node.text {
        out.push_str(text);
        out.push_str("\n\n");
    }
    for child in &node.children {
        render_node(child, level + 1, out);
    }
}

fn push_heading(out: &mut String, level: u8, topic: &str) {
    for _ in 0..level.min(6) {
        out.push('#');
    }
    out.push(' ');
    out.push_str(topic);
    out.push_str("\n\n");
}

/// Flat heading listing of the outline, depth-first.
pub fn outline_of(root: &MindNode) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    let base_level = if root.is_container() {
        0
    } else {
        items.push(OutlineItem {
            level: 1,
            text: root.topic.clone(),
        });
        1
    };
    for child in &root.children {
        collect_outline(child, base_level + 1, &mut items);
    }
    items
}

fn collect_outline(node: &MindNode, level: u8, items: &mut Vec<OutlineItem>) {
    items.push(OutlineItem {
        level: level.min(6),
        text: node.topic.clone(),
    });
    for child in &node.children {
        collect_outline(child, level + 1, items);
    }
}

/// Hex SHA-256 digest of content, used to skip re-parsing unchanged files.
pub fn compute_digest(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text);
    format!("{:x}", hasher.finalize())
}
