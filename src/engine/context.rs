//! Trigger-context resolution at the cursor
//!
//! Answers "what is the user typing right now": either the text after the
//! closest trigger character, or the plain word ending at the cursor.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::position::{byte_at, column_at, Position, Range};

/// What the user is typing at the cursor
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerContext {
    /// None for the plain-word fallback
    pub trigger_char: Option<String>,
    pub text_after_trigger: String,
    /// Span replaced when a completion is accepted
    pub range: Range,
}

impl TriggerContext {
    pub fn is_triggered(&self) -> bool {
        self.trigger_char.is_some()
    }
}

/// Resolve the context for `position` on `line`.
///
/// The right-most trigger before the cursor wins when nothing between it
/// and the cursor is whitespace; the text after it may be empty. Otherwise
/// the word ending at the cursor is used, and an empty word means no context.
pub fn resolve_context(
    line: &str,
    position: Position,
    triggers: &[String],
) -> Option<TriggerContext> {
    let cursor = byte_at(line, position.column);
    let before = &line[..cursor];
    let cursor_column = column_at(line, cursor);

    let mut closest: Option<(usize, &str)> = None;
    for trigger in triggers {
        if let Some(found) = before.rfind(trigger.as_str()) {
            if closest.map_or(true, |(best, _)| found > best) {
                closest = Some((found, trigger.as_str()));
            }
        }
    }

    if let Some((found, trigger)) = closest {
        let text_start = found + trigger.len();
        let text = &before[text_start..];
        if !text.chars().any(char::is_whitespace) {
            return Some(TriggerContext {
                trigger_char: Some(trigger.to_string()),
                text_after_trigger: text.to_string(),
                range: Range::on_line(
                    position.line_number,
                    column_at(line, text_start),
                    cursor_column,
                ),
            });
        }
    }

    let (word_start, word) = word_until(before)?;
    Some(TriggerContext {
        trigger_char: None,
        text_after_trigger: word.to_string(),
        range: Range::on_line(position.line_number, column_at(line, word_start), cursor_column),
    })
}

/// Last word segment of `before`, if the text ends in a word
fn word_until(before: &str) -> Option<(usize, &str)> {
    let (start, segment) = before.split_word_bound_indices().next_back()?;
    if segment.chars().any(char::is_alphanumeric) {
        Some((start, segment))
    } else {
        None
    }
}
