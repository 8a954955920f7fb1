//! Occurrence scan: decorations and diagnostic markers
//!
//! One decoration per occurrence, plus one marker per occurrence of a
//! pattern that carries an error descriptor. Output order follows the
//! index: line, then pattern declaration order, then column.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::index::{Occurrence, PatternIndex};
use super::position::Range;
use crate::config::EngineConfig;

// =============================================================================
// Types
// =============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecorationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_class_name: Option<String>,
}

/// Inline style over an occurrence
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Decoration {
    pub range: Range,
    pub options: DecorationOptions,
}

/// Diagnostic over an occurrence. `severity` is the widget's numeric code.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub start_line_number: usize,
    pub start_column: usize,
    pub end_line_number: usize,
    pub end_column: usize,
    pub message: String,
    pub severity: u8,
}

/// Scan statistics
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub total_us: u64,
    pub lines: usize,
    pub lines_scanned: usize,
    /// Fence markers plus the lines between them
    pub fenced_lines: usize,
    pub occurrences: usize,
    pub decorations: usize,
    pub markers: usize,
}

/// Everything the host applies after a recompute
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub decorations: Vec<Decoration>,
    pub markers: Vec<Marker>,
    /// Owner id to publish `markers` under
    pub marker_owner: String,
    pub stats: ScanStats,
}

// =============================================================================
// Scan
// =============================================================================

/// Decoration for one occurrence
pub fn decoration_for(
    index: &PatternIndex,
    occurrence: &Occurrence,
    config: &EngineConfig,
) -> Decoration {
    let inline_class_name = index
        .pattern(occurrence.pattern)
        .and_then(|p| p.style.as_deref())
        .map(|style| config.style_class(style));

    Decoration {
        range: occurrence.range(),
        options: DecorationOptions { inline_class_name },
    }
}

/// Marker for one occurrence, if its pattern carries an error descriptor
pub fn marker_for(index: &PatternIndex, occurrence: &Occurrence) -> Option<Marker> {
    let pattern = index.pattern(occurrence.pattern)?;
    let severity = pattern.severity()?;
    let message = match &pattern.error_label {
        Some(label) => label.clone(),
        None => format!("Issue with: {}", index.search_key(occurrence.pattern)),
    };

    Some(Marker {
        start_line_number: occurrence.line_number,
        start_column: occurrence.start_column,
        end_line_number: occurrence.line_number,
        end_column: occurrence.end_column,
        message,
        severity: severity.marker_code(),
    })
}

/// Full scan of a document snapshot
pub fn scan_document(
    index: &PatternIndex,
    document: &Document,
    config: &EngineConfig,
) -> ScanReport {
    let start = instant::Instant::now();

    let lines_scanned = document.scannable_lines(&config.fence_marker).count();

    let occurrences = index.scan(document, &config.fence_marker);
    let decorations: Vec<Decoration> = occurrences
        .iter()
        .map(|o| decoration_for(index, o, config))
        .collect();
    let markers: Vec<Marker> = occurrences.iter().filter_map(|o| marker_for(index, o)).collect();

    let stats = ScanStats {
        total_us: start.elapsed().as_micros() as u64,
        lines: document.line_count(),
        lines_scanned,
        fenced_lines: document.line_count() - lines_scanned,
        occurrences: occurrences.len(),
        decorations: decorations.len(),
        markers: markers.len(),
    };

    tracing::debug!(
        lines = stats.lines,
        fenced = stats.fenced_lines,
        occurrences = stats.occurrences,
        markers = stats.markers,
        total_us = stats.total_us,
        "document scanned"
    );

    ScanReport {
        decorations,
        markers,
        marker_owner: config.marker_owner.clone(),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dataset::Pattern;

    fn typo() -> Pattern {
        let mut p = Pattern::new("teh");
        p.style = Some("typo".to_string());
        p.error_replace = Some("the".to_string());
        p.error_severity = Some("error".to_string());
        p
    }

    #[test]
    fn test_decoration_class_from_style() {
        let index = PatternIndex::build(vec![typo(), Pattern::new("plain")]).unwrap();
        let report = scan_document(&index, &Document::new("teh plain"), &EngineConfig::default());

        assert_eq!(report.decorations.len(), 2);
        assert_eq!(
            report.decorations[0].options.inline_class_name.as_deref(),
            Some("style-typo")
        );
        assert_eq!(report.decorations[0].range, Range::on_line(1, 1, 4));
        assert_eq!(report.decorations[1].options.inline_class_name, None);
    }

    #[test]
    fn test_marker_defaults_message_to_key() {
        let index = PatternIndex::build(vec![typo()]).unwrap();
        let report = scan_document(&index, &Document::new("a teh"), &EngineConfig::default());

        assert_eq!(report.markers.len(), 1);
        let marker = &report.markers[0];
        assert_eq!(marker.message, "Issue with: teh");
        assert_eq!(marker.severity, 8);
        assert_eq!((marker.start_column, marker.end_column), (3, 6));
        assert_eq!(report.marker_owner, "patterns");
    }

    #[test]
    fn test_marker_uses_label() {
        let mut pattern = typo();
        pattern.error_label = Some("Fix typo".to_string());
        pattern.error_severity = Some("warning".to_string());
        let index = PatternIndex::build(vec![pattern]).unwrap();
        let report = scan_document(&index, &Document::new("teh"), &EngineConfig::default());

        assert_eq!(report.markers[0].message, "Fix typo");
        assert_eq!(report.markers[0].severity, 4);
    }

    #[test]
    fn test_no_marker_without_descriptor() {
        let index = PatternIndex::build(vec![Pattern::new("teh")]).unwrap();
        let report = scan_document(&index, &Document::new("teh teh"), &EngineConfig::default());

        assert_eq!(report.decorations.len(), 2);
        assert!(report.markers.is_empty());
        assert_eq!(report.stats.occurrences, 2);
    }

    #[test]
    fn test_stats_count_fenced_lines() {
        let index = PatternIndex::build(vec![Pattern::new("teh")]).unwrap();
        let doc = Document::new("teh\n```\nteh\nteh\n```\nteh");
        let report = scan_document(&index, &doc, &EngineConfig::default());

        assert_eq!(report.stats.lines, 6);
        assert_eq!(report.stats.lines_scanned, 2);
        assert_eq!(report.stats.fenced_lines, 4);
        assert_eq!(report.stats.occurrences, 2);
    }
}
