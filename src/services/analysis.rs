use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

/// Findings shown in the analysis panel, loaded from an optional JSON
/// sidecar next to the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisOutline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// One finding; `query` binds it to a highlightable passage.
#[derive(Debug, Clone, Deserialize)]
pub struct Finding {
    pub label: String,
    #[serde(default)]
    pub query: Option<String>,
}

/// Sidecar location for a document: `report.pdf` → `report.analysis.json`
pub fn sidecar_path(document_path: &Path) -> PathBuf {
    document_path.with_extension("analysis.json")
}

/// Load the sidecar if one exists. Malformed sidecars are logged and
/// ignored; they never fail a document load.
pub fn load_sidecar(document_path: &Path) -> Option<AnalysisOutline> {
    let path = sidecar_path(document_path);
    let data = std::fs::read_to_string(&path).ok()?;

    match serde_json::from_str(&data) {
        Ok(outline) => Some(outline),
        Err(err) => {
            warn!("ignoring malformed analysis sidecar {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_sits_next_to_the_document() {
        assert_eq!(
            sidecar_path(Path::new("/reports/q2-interim.pdf")),
            PathBuf::from("/reports/q2-interim.analysis.json")
        );
    }

    #[test]
    fn outline_parses_with_and_without_queries() {
        let outline: AnalysisOutline = serde_json::from_str(
            r#"{
                "title": "Analysis",
                "summary": "No extraordinary items were reported.",
                "findings": [
                    { "label": "Page 3 - Highlights" },
                    { "label": "Page 15 - Income statement",
                      "query": "Gain on sale of non-current assets" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(outline.findings.len(), 2);
        assert!(outline.findings[0].query.is_none());
        assert_eq!(
            outline.findings[1].query.as_deref(),
            Some("Gain on sale of non-current assets")
        );
    }

    #[test]
    fn partial_outlines_fill_defaults() {
        let outline: AnalysisOutline = serde_json::from_str(r#"{ "title": "Analysis" }"#).unwrap();

        assert!(outline.summary.is_empty());
        assert!(outline.findings.is_empty());
    }
}
