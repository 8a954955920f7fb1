//! Quick fixes: replace a flagged occurrence with its correction

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::index::PatternIndex;
use super::position::Range;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TextEdit {
    pub range: Range,
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CodeAction {
    pub title: String,
    pub kind: String,
    pub edits: Vec<TextEdit>,
}

/// Quick fixes for the requested range, looked up on its start line.
///
/// Each pattern with a replacement and a label contributes at most one
/// action, for its first occurrence touching the range.
pub fn code_actions(
    index: &PatternIndex,
    document: &Document,
    requested: Range,
) -> Vec<CodeAction> {
    let Some(line) = document.line(requested.start_line_number) else {
        return Vec::new();
    };
    let occurrences = index.find_in_line(requested.start_line_number, line);

    let mut actions = Vec::new();
    for (i, pattern) in index.patterns().iter().enumerate() {
        let Some((label, replacement)) = pattern.quick_fix() else {
            continue;
        };
        let Some(hit) = occurrences
            .iter()
            .find(|o| o.pattern == i && o.range().touches(&requested))
        else {
            continue;
        };

        actions.push(CodeAction {
            title: label.to_string(),
            kind: "quickfix".to_string(),
            edits: vec![TextEdit {
                range: hit.range(),
                text: replacement.to_string(),
            }],
        });
    }
    actions
}
