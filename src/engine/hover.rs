//! Hover cards and the per-occurrence annotations: links, code lenses,
//! inlay hints.
//!
//! Hover looks only at the cursor's line. The other three walk every
//! occurrence outside fenced blocks, independent of the cursor.

use serde::{Deserialize, Serialize};

use super::completion::MarkdownContent;
use super::dataset::Pattern;
use super::document::Document;
use super::index::PatternIndex;
use super::position::{Position, Range};
use crate::config::EngineConfig;

/// Widget inlay hint kind for type-like labels
pub const INLAY_KIND_TYPE: u8 = 1;

// =============================================================================
// Types
// =============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hover {
    pub range: Range,
    pub contents: Vec<MarkdownContent>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Link {
    pub range: Range,
    pub url: String,
    pub tooltip: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Command {
    pub id: String,
    pub title: String,
    pub arguments: Vec<String>,
    pub tooltip: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CodeLens {
    pub range: Range,
    pub command: Command,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlayHint {
    pub kind: u8,
    pub position: Position,
    pub label: String,
    pub padding_left: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<MarkdownContent>,
}

// =============================================================================
// Hover
// =============================================================================

fn hover_contents(pattern: &Pattern) -> Vec<MarkdownContent> {
    let mut contents = Vec::new();
    if let Some(info) = &pattern.info {
        contents.push(MarkdownContent::html(info));
    }
    for action in pattern.actions.iter().filter(|a| a.hover) {
        contents.push(MarkdownContent::trusted_markdown(format!(
            "[{}]({})",
            action.label, action.url
        )));
    }
    contents
}

/// Hover card for the first pattern whose occurrence spans the cursor.
/// Patterns with nothing to show are passed over.
pub fn hover(index: &PatternIndex, document: &Document, position: Position) -> Option<Hover> {
    let line = document.line(position.line_number)?;

    index
        .find_in_line(position.line_number, line)
        .into_iter()
        .filter(|o| o.contains_column(position.column))
        .find_map(|o| {
            let contents = hover_contents(index.pattern(o.pattern)?);
            if contents.is_empty() {
                None
            } else {
                Some(Hover {
                    range: o.range(),
                    contents,
                })
            }
        })
}

// =============================================================================
// Per-occurrence annotations
// =============================================================================

/// One link per action per occurrence
pub fn links(index: &PatternIndex, document: &Document, config: &EngineConfig) -> Vec<Link> {
    let mut links = Vec::new();
    for occurrence in index.scan(document, &config.fence_marker) {
        let Some(pattern) = index.pattern(occurrence.pattern) else {
            continue;
        };
        for action in &pattern.actions {
            links.push(Link {
                range: occurrence.range(),
                url: action.url.clone(),
                tooltip: action.tooltip.clone().unwrap_or_else(|| action.label.clone()),
            });
        }
    }
    links
}

/// One clickable lens per action per occurrence
pub fn code_lenses(
    index: &PatternIndex,
    document: &Document,
    config: &EngineConfig,
) -> Vec<CodeLens> {
    let mut lenses = Vec::new();
    for occurrence in index.scan(document, &config.fence_marker) {
        let Some(pattern) = index.pattern(occurrence.pattern) else {
            continue;
        };
        for action in &pattern.actions {
            lenses.push(CodeLens {
                range: occurrence.range(),
                command: Command {
                    id: config.open_url_command.clone(),
                    title: action.label.clone(),
                    arguments: vec![action.url.clone()],
                    tooltip: action.label.clone(),
                },
            });
        }
    }
    lenses
}

/// Inlay labels after each occurrence of a pattern with `inlay`, limited to
/// lines `start_line..=end_line`
pub fn inlay_hints(
    index: &PatternIndex,
    document: &Document,
    config: &EngineConfig,
    start_line: usize,
    end_line: usize,
) -> Vec<InlayHint> {
    index
        .scan(document, &config.fence_marker)
        .into_iter()
        .filter(|o| o.line_number >= start_line && o.line_number <= end_line)
        .filter_map(|o| {
            let pattern = index.pattern(o.pattern)?;
            let inlay = pattern.inlay.as_deref()?;
            Some(InlayHint {
                kind: INLAY_KIND_TYPE,
                position: Position::new(o.line_number, o.end_column),
                label: format!(": {}", inlay),
                padding_left: true,
                tooltip: pattern.info.as_deref().map(MarkdownContent::html),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dataset::Action;

    fn action(label: &str, url: &str, tooltip: Option<&str>, hover: bool) -> Action {
        Action {
            label: label.to_string(),
            url: url.to_string(),
            tooltip: tooltip.map(String::from),
            hover,
        }
    }

    fn frodo() -> Pattern {
        let mut p = Pattern::new("frodo").with_trigger("@");
        p.info = Some("<b>Frodo</b>".to_string());
        p.inlay = Some("hobbit".to_string());
        p.actions = vec![
            action("Wiki", "https://wiki.example/frodo", None, true),
            action("Map", "https://map.example/shire", Some("Open map"), false),
        ];
        p
    }

    #[test]
    fn test_hover_spans_occurrence() {
        let index = PatternIndex::build(vec![frodo()]).unwrap();
        let doc = Document::new("hi @frodo!");

        let card = hover(&index, &doc, Position::new(1, 6)).unwrap();
        assert_eq!(card.range, Range::on_line(1, 4, 10));
        assert_eq!(card.contents.len(), 2);
        assert!(card.contents[0].support_html);
        assert_eq!(card.contents[1].value, "[Wiki](https://wiki.example/frodo)");
        assert!(card.contents[1].is_trusted);

        // end column is inclusive, one past is not
        assert!(hover(&index, &doc, Position::new(1, 10)).is_some());
        assert!(hover(&index, &doc, Position::new(1, 11)).is_none());
        assert!(hover(&index, &doc, Position::new(1, 3)).is_none());
    }

    #[test]
    fn test_hover_later_occurrence_on_line() {
        let index = PatternIndex::build(vec![frodo()]).unwrap();
        let doc = Document::new("@frodo and @frodo");
        let card = hover(&index, &doc, Position::new(1, 14)).unwrap();
        assert_eq!(card.range.start_column, 12);
    }

    #[test]
    fn test_hover_skips_empty_patterns() {
        let mut described = Pattern::new("ring");
        described.info = Some("One Ring".to_string());
        let index = PatternIndex::build(vec![Pattern::new("ring"), described]).unwrap();

        let card = hover(&index, &Document::new("ring"), Position::new(1, 2)).unwrap();
        assert_eq!(card.contents[0].value, "One Ring");
    }

    #[test]
    fn test_hover_missing_line() {
        let index = PatternIndex::build(vec![frodo()]).unwrap();
        assert!(hover(&index, &Document::new("@frodo"), Position::new(5, 1)).is_none());
    }

    #[test]
    fn test_links_per_action_per_occurrence() {
        let index = PatternIndex::build(vec![frodo()]).unwrap();
        let doc = Document::new("@frodo\n```\n@frodo\n```\n@frodo @frodo");
        let links = links(&index, &doc, &EngineConfig::default());

        assert_eq!(links.len(), 6);
        assert_eq!(links[0].tooltip, "Wiki");
        assert_eq!(links[1].tooltip, "Open map");
        assert!(links.iter().all(|l| l.range.start_line_number != 3));
    }

    #[test]
    fn test_code_lenses() {
        let index = PatternIndex::build(vec![frodo()]).unwrap();
        let lenses = code_lenses(&index, &Document::new("@frodo"), &EngineConfig::default());

        assert_eq!(lenses.len(), 2);
        assert_eq!(lenses[1].command.id, "openUrl");
        assert_eq!(lenses[1].command.title, "Map");
        assert_eq!(lenses[1].command.arguments, vec!["https://map.example/shire".to_string()]);
    }

    #[test]
    fn test_inlay_hints_in_range() {
        let index = PatternIndex::build(vec![frodo(), Pattern::new("sam")]).unwrap();
        let doc = Document::new("@frodo sam\n@frodo\n@frodo");
        let hints = inlay_hints(&index, &doc, &EngineConfig::default(), 1, 2);

        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].position, Position::new(1, 7));
        assert_eq!(hints[0].label, ": hobbit");
        assert!(hints[0].padding_left);
        assert_eq!(hints[0].tooltip.as_ref().map(|t| t.value.as_str()), Some("<b>Frodo</b>"));
        assert_eq!(hints[1].position.line_number, 2);
    }
}
