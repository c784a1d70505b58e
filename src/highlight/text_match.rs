use crate::highlight::overlay_model::MatchRect;
use crate::highlight::viewport::PageViewport;

/// Font height assumed when an item's transform carries no usable vertical
/// scale (zero or non-finite).
const FALLBACK_FONT_HEIGHT: f64 = 10.0;

/// Average glyph width as a fraction of the font height, used when the
/// engine reported no extent for the run.
const APPROX_GLYPH_WIDTH_RATIO: f64 = 0.5;

/// One positioned run of text on a page, as delivered by the rendering
/// engine's text model.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Text of the run
    pub content: String,
    /// Document-space placement `[a, b, c, d, e, f]`: translation components
    /// `e, f` hold the baseline origin, the vertical sub-vector `(b, d)` the
    /// font scale
    pub transform: [f64; 6],
    /// Document-space width of the run, when the engine reported one
    pub width: Option<f64>,
}

/// Scan `items` for case-insensitive substring occurrences of `query` and
/// project every match into pixel space through `viewport`.
///
/// Matching is independent per item: adjacent runs are never merged, so a
/// query spanning two separately laid-out runs does not match. An empty
/// query matches nothing.
pub fn match_items(items: &[TextItem], query: &str, viewport: &PageViewport) -> Vec<MatchRect> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();

    items
        .iter()
        .filter(|item| item.content.to_lowercase().contains(&needle))
        .map(|item| project_item(item, viewport))
        .collect()
}

/// Compute the matched item's document-space box and map it into pixel
/// space. The returned rectangle's `y` is the baseline (bottom edge).
fn project_item(item: &TextItem, viewport: &PageViewport) -> MatchRect {
    let tx = &item.transform;
    let (x, y) = (tx[4], tx[5]);

    let mut font_height = tx[1].hypot(tx[3]);
    if !font_height.is_finite() || font_height == 0.0 {
        font_height = FALLBACK_FONT_HEIGHT;
    }

    let width = item
        .width
        .unwrap_or_else(|| item.content.chars().count() as f64 * font_height * APPROX_GLYPH_WIDTH_RATIO);

    let (sx, tx_offset) = (viewport.scale_x(), viewport.offset_x());
    let (sy, ty_offset) = (viewport.scale_y(), viewport.offset_y());

    MatchRect {
        x: x * sx + tx_offset,
        y: viewport.height - (y * sy + ty_offset),
        width: width * sx,
        height: font_height * sy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> PageViewport {
        PageViewport::new(612.0, 792.0, 1.5)
    }

    fn item(content: &str, transform: [f64; 6], width: Option<f64>) -> TextItem {
        TextItem {
            content: content.to_string(),
            transform,
            width,
        }
    }

    #[test]
    fn exact_content_matches() {
        let items = vec![item("Revenue", [12.0, 0.0, 0.0, 12.0, 50.0, 500.0], Some(48.0))];

        let matches = match_items(&items, "Revenue", &viewport());
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let items = vec![item(
            "Gain on sale of non-current assets",
            [1.0, 0.0, 0.0, 1.0, 100.0, 700.0],
            Some(180.0),
        )];

        assert_eq!(match_items(&items, "gain", &viewport()).len(), 1);
        assert_eq!(match_items(&items, "NON-CURRENT", &viewport()).len(), 1);
    }

    #[test]
    fn unrelated_content_does_not_match() {
        let items = vec![item("Revenue", [12.0, 0.0, 0.0, 12.0, 50.0, 500.0], Some(48.0))];

        assert!(match_items(&items, "liabilities", &viewport()).is_empty());
    }

    #[test]
    fn empty_query_matches_nothing() {
        let items = vec![item("Revenue", [12.0, 0.0, 0.0, 12.0, 50.0, 500.0], Some(48.0))];

        assert!(match_items(&items, "", &viewport()).is_empty());
    }

    #[test]
    fn no_items_yield_no_matches() {
        assert!(match_items(&[], "Revenue", &viewport()).is_empty());
    }

    #[test]
    fn baseline_round_trip() {
        let vp = viewport();
        let (x, y, h) = (100.0, 700.0, 12.0);
        let items = vec![item("Totals", [h, 0.0, 0.0, h, x, y], Some(60.0))];

        let m = &match_items(&items, "Totals", &vp)[0];

        // Bottom edge sits on the projected baseline, top edge one scaled
        // font height above it.
        let bottom = vp.height - (y * vp.scale_y() + vp.offset_y());
        assert_eq!(m.y, bottom);
        assert_eq!(m.y - m.height, bottom - h * vp.scale_y());
        assert_eq!(m.x, x * vp.scale_x() + vp.offset_x());
    }

    #[test]
    fn degenerate_transform_falls_back_to_default_font_height() {
        let vp = viewport();
        let items = vec![item("x", [0.0, 0.0, 0.0, 0.0, 10.0, 20.0], Some(5.0))];

        let m = &match_items(&items, "x", &vp)[0];
        assert_eq!(m.height, FALLBACK_FONT_HEIGHT * vp.scale_y());
    }

    #[test]
    fn missing_width_is_estimated_from_content_length() {
        let vp = viewport();
        let items = vec![item("abcd", [10.0, 0.0, 0.0, 10.0, 0.0, 100.0], None)];

        let m = &match_items(&items, "abcd", &vp)[0];
        assert_eq!(m.width, 4.0 * 10.0 * APPROX_GLYPH_WIDTH_RATIO * vp.scale_x());
    }

    #[test]
    fn report_scenario_single_match() {
        // One-page document at scale 1.5 with the income-statement line the
        // analysis panel links to.
        let vp = viewport();
        assert_eq!(vp.height, 792.0 * 1.5);

        let items = vec![
            item("Condensed income statement", [14.0, 0.0, 0.0, 14.0, 60.0, 750.0], Some(200.0)),
            item(
                "Gain on sale of non-current assets",
                [1.0, 0.0, 0.0, 1.0, 100.0, 700.0],
                Some(180.0),
            ),
        ];

        let matches = match_items(&items, "Gain on sale", &vp);
        assert_eq!(matches.len(), 1);

        let m = &matches[0];
        assert_eq!(m.x, 100.0 * 1.5);
        assert_eq!(m.y, vp.height - 700.0 * 1.5);
        assert_eq!(m.width, 180.0 * 1.5);
    }
}
