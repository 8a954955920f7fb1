//! PatternIndex - Search-key matching via Aho-Corasick
//!
//! Every pattern's search key (`trigger + word`) goes into one automaton.
//! Keys shared by several patterns are stored once and fanned back out to
//! each pattern on a hit.
//!
//! # Overlap semantics
//! Matching uses standard (non-leftmost) semantics with overlapping
//! iteration, so a key is reported at every start position where it occurs:
//! `"aa"` in `"aaa"` yields two hits, and `"@wo"`/`"@world"` both hit in
//! `"@world"`. This is the same set a substring scan restarted one character
//! past each hit's start would produce.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::dataset::Pattern;
use super::document::Document;
use super::position::{column_at, Range};
use crate::error::EngineResult;

// =============================================================================
// Types
// =============================================================================

/// A located search key. `pattern` indexes into [`PatternIndex::patterns`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub line_number: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub pattern: usize,
}

impl Occurrence {
    pub fn range(&self) -> Range {
        Range::on_line(self.line_number, self.start_column, self.end_column)
    }

    /// Inclusive on both ends: a cursor right after the key still hits it
    pub fn contains_column(&self, column: usize) -> bool {
        column >= self.start_column && column <= self.end_column
    }
}

// =============================================================================
// PatternIndex
// =============================================================================

/// Compiled pattern set
#[derive(Debug, Clone, Default)]
pub struct PatternIndex {
    patterns: Vec<Pattern>,
    /// Search key per pattern (empty for ignored patterns)
    keys: Vec<String>,
    /// None when no pattern has a usable word
    automaton: Option<AhoCorasick>,
    /// Automaton pattern id -> pattern indices sharing that key
    key_patterns: Vec<Vec<usize>>,
    /// Distinct trigger characters in declaration order
    trigger_characters: Vec<String>,
}

impl PatternIndex {
    /// Compile a pattern set. Patterns with an empty word are kept in place
    /// (indices stay stable) but never match.
    pub fn build(patterns: Vec<Pattern>) -> EngineResult<Self> {
        let mut keys = Vec::with_capacity(patterns.len());
        let mut unique_keys: Vec<String> = Vec::new();
        let mut key_patterns: Vec<Vec<usize>> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut trigger_characters: Vec<String> = Vec::new();

        for (i, pattern) in patterns.iter().enumerate() {
            if pattern.word.is_empty() {
                keys.push(String::new());
                continue;
            }

            if let Some(trigger) = &pattern.trigger_character {
                if !trigger_characters.contains(trigger) {
                    trigger_characters.push(trigger.clone());
                }
            }

            let key = pattern.search_key();
            match seen.get(&key) {
                Some(&id) => key_patterns[id].push(i),
                None => {
                    seen.insert(key.clone(), unique_keys.len());
                    unique_keys.push(key.clone());
                    key_patterns.push(vec![i]);
                }
            }
            keys.push(key);
        }

        let automaton = if unique_keys.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .match_kind(MatchKind::Standard)
                    .build(&unique_keys)?,
            )
        };

        tracing::debug!(
            patterns = patterns.len(),
            keys = unique_keys.len(),
            triggers = trigger_characters.len(),
            "pattern index built"
        );

        Ok(Self {
            patterns,
            keys,
            automaton,
            key_patterns,
            trigger_characters,
        })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Search key of the pattern at `index` (empty when it never matches)
    pub fn search_key(&self, index: usize) -> &str {
        self.keys.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn trigger_characters(&self) -> &[String] {
        &self.trigger_characters
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every occurrence on one line, ordered by pattern then start column
    pub fn find_in_line(&self, line_number: usize, line: &str) -> Vec<Occurrence> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };

        let mut hits: Vec<(usize, usize, usize)> = Vec::new();
        for m in automaton.find_overlapping_iter(line) {
            for &pattern in &self.key_patterns[m.pattern().as_usize()] {
                hits.push((pattern, m.start(), m.end()));
            }
        }
        hits.sort_unstable();

        hits.into_iter()
            .map(|(pattern, start, end)| Occurrence {
                line_number,
                start_column: column_at(line, start),
                end_column: column_at(line, end),
                pattern,
            })
            .collect()
    }

    /// Every occurrence outside fenced blocks, line by line
    pub fn scan(&self, document: &Document, fence_marker: &str) -> Vec<Occurrence> {
        document
            .scannable_lines(fence_marker)
            .flat_map(|(line_number, line)| self.find_in_line(line_number, line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(patterns: Vec<Pattern>) -> PatternIndex {
        PatternIndex::build(patterns).unwrap()
    }

    #[test]
    fn test_finds_plain_and_triggered_keys() {
        let idx = index(vec![Pattern::new("world").with_trigger("@"), Pattern::new("hello")]);
        let hits = idx.find_in_line(1, "hello @world, world");

        assert_eq!(hits.len(), 2);
        assert_eq!(
            hits[0],
            Occurrence {
                line_number: 1,
                start_column: 7,
                end_column: 13,
                pattern: 0,
            }
        );
        assert_eq!(
            hits[1],
            Occurrence {
                line_number: 1,
                start_column: 1,
                end_column: 6,
                pattern: 1,
            }
        );
    }

    #[test]
    fn test_self_overlapping_key() {
        let idx = index(vec![Pattern::new("aa")]);
        let hits = idx.find_in_line(1, "aaa");
        let starts: Vec<usize> = hits.iter().map(|o| o.start_column).collect();
        assert_eq!(starts, vec![1, 2]);
    }

    #[test]
    fn test_shared_prefix_keys_both_hit() {
        let idx = index(vec![Pattern::new("wor"), Pattern::new("world")]);
        let hits = idx.find_in_line(1, "world");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].end_column, 4);
        assert_eq!(hits[1].end_column, 6);
    }

    #[test]
    fn test_duplicate_keys_fan_out() {
        let idx = index(vec![Pattern::new("x"), Pattern::new("y"), Pattern::new("x")]);
        let hits = idx.find_in_line(3, "x");
        let patterns: Vec<usize> = hits.iter().map(|o| o.pattern).collect();
        assert_eq!(patterns, vec![0, 2]);
    }

    #[test]
    fn test_empty_word_ignored() {
        let idx = index(vec![Pattern::new(""), Pattern::new("a")]);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.search_key(0), "");
        let hits = idx.find_in_line(1, "a");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pattern, 1);
    }

    #[test]
    fn test_no_patterns_no_hits() {
        let idx = index(vec![]);
        assert!(idx.find_in_line(1, "anything").is_empty());
    }

    #[test]
    fn test_trigger_characters_distinct_in_order() {
        let idx = index(vec![
            Pattern::new("a").with_trigger("#"),
            Pattern::new("b").with_trigger("@"),
            Pattern::new("c").with_trigger("#"),
            Pattern::new("d"),
        ]);
        assert_eq!(idx.trigger_characters(), &["#".to_string(), "@".to_string()]);
    }

    #[test]
    fn test_utf16_columns() {
        let idx = index(vec![Pattern::new("x")]);
        let hits = idx.find_in_line(1, "😀x");
        assert_eq!(hits[0].start_column, 3);
        assert_eq!(hits[0].end_column, 4);
    }

    #[test]
    fn test_scan_skips_fences() {
        let idx = index(vec![Pattern::new("x")]);
        let doc = Document::new("x\n```\nx\n```\nx x");
        let lines: Vec<usize> = idx.scan(&doc, "```").iter().map(|o| o.line_number).collect();
        assert_eq!(lines, vec![1, 5, 5]);
    }
}
