//! Completion matching and item payloads

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::context::TriggerContext;
use super::dataset::Pattern;
use super::index::PatternIndex;
use super::position::Range;

/// Widget completion kind for plain-text items
pub const COMPLETION_KIND_TEXT: u8 = 18;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static tag pattern"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[^;]+;").expect("static entity pattern"));

// =============================================================================
// Types
// =============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CompletionLabel {
    pub label: String,
    pub detail: String,
    pub description: String,
}

/// Markdown/HTML payload as the widget expects it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownContent {
    pub value: String,
    #[serde(default)]
    pub is_trusted: bool,
    #[serde(default)]
    pub support_html: bool,
}

impl MarkdownContent {
    pub fn html(value: &str) -> Self {
        Self {
            value: value.to_string(),
            is_trusted: false,
            support_html: true,
        }
    }

    pub fn trusted_html(value: &str) -> Self {
        Self {
            value: value.to_string(),
            is_trusted: true,
            support_html: true,
        }
    }

    pub fn trusted_markdown(value: String) -> Self {
        Self {
            value,
            is_trusted: true,
            support_html: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: CompletionLabel,
    pub kind: u8,
    pub insert_text: String,
    pub range: Range,
    pub documentation: MarkdownContent,
    pub sort_text: String,
    pub filter_text: String,
    pub preselect: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CompletionList {
    pub suggestions: Vec<CompletionItem>,
}

// =============================================================================
// Matching
// =============================================================================

fn starts_with_ignore_case(word: &str, prefix: &str) -> bool {
    word.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Whether `pattern` should be offered for `ctx`
pub fn is_candidate(pattern: &Pattern, ctx: &TriggerContext) -> bool {
    !pattern.word.is_empty()
        && pattern.trigger_character == ctx.trigger_char
        && starts_with_ignore_case(&pattern.word, &ctx.text_after_trigger)
        && pattern.word != ctx.text_after_trigger
}

/// Indices of candidate patterns, in declaration order
pub fn candidates(index: &PatternIndex, ctx: &TriggerContext) -> Vec<usize> {
    index
        .patterns()
        .iter()
        .enumerate()
        .filter(|(_, pattern)| is_candidate(pattern, ctx))
        .map(|(i, _)| i)
        .collect()
}

/// True when the suggest widget should open by itself after typing
pub fn should_suggest(index: &PatternIndex, ctx: &TriggerContext) -> bool {
    !ctx.text_after_trigger.is_empty() && index.patterns().iter().any(|p| is_candidate(p, ctx))
}

/// Trigger characters registered with the widget: pattern triggers, then a-z
pub fn completion_trigger_characters(index: &PatternIndex) -> Vec<String> {
    index
        .trigger_characters()
        .iter()
        .cloned()
        .chain(('a'..='z').map(String::from))
        .collect()
}

// =============================================================================
// Items
// =============================================================================

/// Strip tags and character entities from an HTML snippet
pub fn plain_text(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, "");
    ENTITY_RE.replace_all(&without_tags, "").into_owned()
}

fn label_for(pattern: &Pattern) -> CompletionLabel {
    let plain = pattern.info.as_deref().map(plain_text).unwrap_or_default();
    let lines: Vec<&str> = plain.split('\n').filter(|l| !l.trim().is_empty()).collect();

    CompletionLabel {
        label: pattern.word.clone(),
        detail: lines.get(1).map(|l| l.to_string()).unwrap_or_default(),
        description: if lines.len() > 2 {
            lines[2..lines.len().min(4)].join(" ")
        } else {
            String::new()
        },
    }
}

/// Build the completion list for a context
pub fn complete(index: &PatternIndex, ctx: &TriggerContext) -> CompletionList {
    let typed = &ctx.text_after_trigger;
    let suggestions = candidates(index, ctx)
        .into_iter()
        .enumerate()
        .filter_map(|(rank, i)| index.pattern(i).map(|pattern| (rank, pattern)))
        .map(|(rank, pattern)| CompletionItem {
            label: label_for(pattern),
            kind: COMPLETION_KIND_TEXT,
            insert_text: pattern.insert_text().to_string(),
            range: ctx.range,
            documentation: MarkdownContent::trusted_html(
                pattern.info.as_deref().unwrap_or(&pattern.word),
            ),
            sort_text: format!("{:03}", rank),
            filter_text: pattern.word.clone(),
            preselect: !typed.is_empty() && starts_with_ignore_case(&pattern.word, typed),
        })
        .collect();

    CompletionList { suggestions }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(trigger: Option<&str>, text: &str) -> TriggerContext {
        TriggerContext {
            trigger_char: trigger.map(String::from),
            text_after_trigger: text.to_string(),
            range: Range::on_line(1, 1, 1 + text.len()),
        }
    }

    #[test]
    fn test_candidate_rules() {
        let world = Pattern::new("world").with_trigger("@");

        assert!(is_candidate(&world, &ctx(Some("@"), "wo")));
        assert!(is_candidate(&world, &ctx(Some("@"), "WO")));
        assert!(!is_candidate(&world, &ctx(Some("@"), "world")));
        assert!(!is_candidate(&world, &ctx(None, "wo")));
        assert!(!is_candidate(&world, &ctx(Some("#"), "wo")));
        assert!(is_candidate(&world, &ctx(Some("@"), "")));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let world = Pattern::new("World");
        assert!(is_candidate(&world, &ctx(None, "world")));
        assert!(!is_candidate(&world, &ctx(None, "World")));
    }

    #[test]
    fn test_items_keep_declaration_order() {
        let mut wonder = Pattern::new("wonder").with_trigger("@");
        wonder.trigger_complete = Some("Wonder Woman".to_string());
        let index = PatternIndex::build(vec![
            Pattern::new("world").with_trigger("@"),
            Pattern::new("word"),
            wonder,
        ])
        .unwrap();

        let list = complete(&index, &ctx(Some("@"), "wo"));
        let labels: Vec<&str> = list.suggestions.iter().map(|s| s.label.label.as_str()).collect();
        assert_eq!(labels, vec!["world", "wonder"]);
        assert_eq!(list.suggestions[0].sort_text, "000");
        assert_eq!(list.suggestions[1].sort_text, "001");
        assert_eq!(list.suggestions[1].insert_text, "Wonder Woman");
        assert_eq!(list.suggestions[1].filter_text, "wonder");
        assert!(list.suggestions[0].preselect);
    }

    #[test]
    fn test_label_detail_from_info() {
        let mut pattern = Pattern::new("frodo");
        pattern.info = Some(
            "<h3>Frodo</h3>\n<p>Ring&nbsp;bearer</p>\n\n<i>Hobbit</i>\nShire\nBag End".to_string(),
        );
        let index = PatternIndex::build(vec![pattern]).unwrap();

        let list = complete(&index, &ctx(None, "fr"));
        let item = &list.suggestions[0];
        assert_eq!(item.label.detail, "Ringbearer");
        assert_eq!(item.label.description, "Hobbit Shire");
        assert!(item.documentation.value.starts_with("<h3>"));
        assert!(item.documentation.is_trusted);
    }

    #[test]
    fn test_documentation_falls_back_to_word() {
        let index = PatternIndex::build(vec![Pattern::new("alpha")]).unwrap();
        let list = complete(&index, &ctx(None, "a"));
        assert_eq!(list.suggestions[0].documentation.value, "alpha");
        assert_eq!(list.suggestions[0].label.detail, "");
    }

    #[test]
    fn test_should_suggest() {
        let index = PatternIndex::build(vec![Pattern::new("world").with_trigger("@")]).unwrap();

        assert!(should_suggest(&index, &ctx(Some("@"), "w")));
        assert!(!should_suggest(&index, &ctx(Some("@"), "")));
        assert!(!should_suggest(&index, &ctx(Some("@"), "x")));
    }

    #[test]
    fn test_completion_trigger_characters() {
        let index = PatternIndex::build(vec![Pattern::new("w").with_trigger("@")]).unwrap();
        let chars = completion_trigger_characters(&index);
        assert_eq!(chars.len(), 27);
        assert_eq!(chars[0], "@");
        assert_eq!(chars[1], "a");
        assert_eq!(chars[26], "z");
    }
}
