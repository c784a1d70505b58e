use log::warn;

use crate::highlight::overlay_model::OverlayRegistry;
use crate::highlight::text_match::{self, TextItem};
use crate::services::document_session::DocumentError;

/// Result of one highlight pass across the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOutcome {
    /// Whether any page produced at least one match
    pub found_any: bool,
    /// Pages with matches, in ascending order
    pub matched_pages: Vec<u16>,
}

/// Run one highlight pass over the registry.
///
/// Every registered page's match collection is cleared up front, so a query
/// with no hits still wipes previous highlights. Pages are then visited in
/// ascending order; `text_items` supplies each page's runs. A page with no
/// registered overlay is skipped silently: its layout has not completed
/// yet, which is not an error.
pub fn run_highlight_pass<F>(
    registry: &mut OverlayRegistry,
    page_count: u16,
    query: &str,
    mut text_items: F,
) -> HighlightOutcome
where
    F: FnMut(u16) -> Result<Vec<TextItem>, DocumentError>,
{
    registry.clear_matches();

    let mut matched_pages = Vec::new();

    for page_number in 1..=page_count {
        let Some(viewport) = registry.viewport(page_number) else {
            continue;
        };

        let items = match text_items(page_number) {
            Ok(items) => items,
            Err(err) => {
                warn!("skipping page {page_number} in highlight pass: {err}");
                continue;
            }
        };

        let matches = text_match::match_items(&items, query, &viewport);
        if !matches.is_empty() {
            matched_pages.push(page_number);
        }
        registry.set_matches(page_number, matches);
    }

    HighlightOutcome {
        found_any: !matched_pages.is_empty(),
        matched_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::overlay_model::MatchRect;
    use crate::highlight::viewport::PageViewport;

    fn registry_with_pages(count: u16) -> OverlayRegistry {
        let mut registry = OverlayRegistry::new();
        for page_number in 1..=count {
            registry.register(page_number, PageViewport::new(612.0, 792.0, 1.5));
        }
        registry
    }

    fn run_item(content: &str) -> TextItem {
        TextItem {
            content: content.to_string(),
            transform: [12.0, 0.0, 0.0, 12.0, 72.0, 700.0],
            width: Some(120.0),
        }
    }

    #[test]
    fn reports_matching_pages_in_ascending_order() {
        let mut registry = registry_with_pages(3);

        let outcome = run_highlight_pass(&mut registry, 3, "total", |page_number| {
            Ok(match page_number {
                1 => vec![run_item("Total assets")],
                2 => vec![run_item("Goodwill")],
                3 => vec![run_item("Total equity"), run_item("Totals")],
                _ => Vec::new(),
            })
        });

        assert!(outcome.found_any);
        assert_eq!(outcome.matched_pages, vec![1, 3]);
        assert_eq!(registry.matches(1).len(), 1);
        assert!(registry.matches(2).is_empty());
        assert_eq!(registry.matches(3).len(), 2);
    }

    #[test]
    fn a_query_matching_one_page_yields_one_scroll_target() {
        let mut registry = registry_with_pages(4);

        let outcome = run_highlight_pass(&mut registry, 4, "goodwill", |page_number| {
            Ok(if page_number == 2 {
                vec![run_item("Goodwill impairment")]
            } else {
                vec![run_item("Total assets")]
            })
        });

        assert_eq!(outcome.matched_pages, vec![2]);
    }

    #[test]
    fn no_match_clears_previous_highlights() {
        let mut registry = registry_with_pages(2);
        registry.set_matches(
            1,
            vec![MatchRect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            }],
        );

        let outcome =
            run_highlight_pass(&mut registry, 2, "nonexistent phrase", |_| Ok(vec![run_item("Total assets")]));

        assert!(!outcome.found_any);
        assert!(outcome.matched_pages.is_empty());
        for page_number in registry.page_numbers().collect::<Vec<_>>() {
            assert!(registry.matches(page_number).is_empty());
        }
    }

    #[test]
    fn unregistered_pages_are_skipped_without_fetching_text() {
        // Layout completed for page 1 only.
        let mut registry = OverlayRegistry::new();
        registry.register(1, PageViewport::new(612.0, 792.0, 1.5));

        let mut fetched = Vec::new();
        let outcome = run_highlight_pass(&mut registry, 3, "total", |page_number| {
            fetched.push(page_number);
            Ok(vec![run_item("Total assets")])
        });

        assert_eq!(fetched, vec![1]);
        assert_eq!(outcome.matched_pages, vec![1]);
    }

    #[test]
    fn text_retrieval_failure_skips_the_page() {
        let mut registry = registry_with_pages(2);

        let outcome = run_highlight_pass(&mut registry, 2, "total", |page_number| {
            if page_number == 1 {
                Err(DocumentError::TextContent {
                    page_number,
                    reason: "damaged stream".to_string(),
                })
            } else {
                Ok(vec![run_item("Total assets")])
            }
        });

        assert_eq!(outcome.matched_pages, vec![2]);
    }

    #[test]
    fn empty_query_finds_nothing_but_still_clears() {
        let mut registry = registry_with_pages(1);
        registry.set_matches(
            1,
            vec![MatchRect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            }],
        );

        let outcome = run_highlight_pass(&mut registry, 1, "", |_| Ok(vec![run_item("Total assets")]));

        assert!(!outcome.found_any);
        assert!(registry.matches(1).is_empty());
    }
}
