use std::collections::BTreeMap;

use crate::highlight::viewport::PageViewport;

/// A single query match in pixel space, relative to the owning page's
/// overlay. `y` anchors the baseline: the painted rectangle extends upward
/// from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MatchRect {
    /// Painted floor so degenerate matches stay visible
    pub const MIN_WIDTH: f64 = 2.0;
    pub const MIN_HEIGHT: f64 = 6.0;

    /// Extent actually painted on the overlay: `(x, top, width, height)`,
    /// with the baseline anchoring the bottom edge and the minimum size
    /// applied.
    pub fn painted(&self) -> (f64, f64, f64, f64) {
        (
            self.x,
            self.y - self.height,
            self.width.max(Self::MIN_WIDTH),
            self.height.max(Self::MIN_HEIGHT),
        )
    }
}

/// One page's overlay state: the viewport it was laid out under and the
/// matches currently painted on it.
#[derive(Debug, Clone)]
pub struct OverlayEntry {
    viewport: PageViewport,
    matches: Vec<MatchRect>,
}

impl OverlayEntry {
    fn new(viewport: PageViewport) -> Self {
        Self {
            viewport,
            matches: Vec::new(),
        }
    }
}

/// Page-indexed overlay state for the current document, owned by the
/// session and rebuilt on every layout pass. Keys are 1-based page numbers;
/// after a complete layout they are exactly `1..=page_count`.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    entries: BTreeMap<u16, OverlayEntry>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page's overlay once its raster is in place. Re-registering
    /// a page replaces its entry (fresh viewport, no matches).
    pub fn register(&mut self, page_number: u16, viewport: PageViewport) {
        self.entries.insert(page_number, OverlayEntry::new(viewport));
    }

    pub fn contains(&self, page_number: u16) -> bool {
        self.entries.contains_key(&page_number)
    }

    pub fn viewport(&self, page_number: u16) -> Option<PageViewport> {
        self.entries.get(&page_number).map(|entry| entry.viewport)
    }

    pub fn matches(&self, page_number: u16) -> &[MatchRect] {
        self.entries
            .get(&page_number)
            .map(|entry| entry.matches.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_matches(&mut self, page_number: u16, matches: Vec<MatchRect>) {
        if let Some(entry) = self.entries.get_mut(&page_number) {
            entry.matches = matches;
        }
    }

    /// Drop the match collections on every page, keeping the registrations
    pub fn clear_matches(&mut self) {
        for entry in self.entries.values_mut() {
            entry.matches.clear();
        }
    }

    /// Forget every page, e.g. ahead of a relayout
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Registered page numbers in ascending order
    pub fn page_numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_pages(count: u16) -> OverlayRegistry {
        let mut registry = OverlayRegistry::new();
        for page_number in 1..=count {
            registry.register(page_number, PageViewport::new(612.0, 792.0, 1.5));
        }
        registry
    }

    #[test]
    fn painted_extent_applies_minimum_size() {
        let degenerate = MatchRect {
            x: 10.0,
            y: 20.0,
            width: 0.0,
            height: 0.0,
        };

        let (x, top, width, height) = degenerate.painted();
        assert_eq!((x, top), (10.0, 20.0));
        assert_eq!(width, MatchRect::MIN_WIDTH);
        assert_eq!(height, MatchRect::MIN_HEIGHT);
    }

    #[test]
    fn painted_extent_is_baseline_anchored() {
        let m = MatchRect {
            x: 5.0,
            y: 100.0,
            width: 40.0,
            height: 12.0,
        };

        let (_, top, width, height) = m.painted();
        assert_eq!(top, 88.0);
        assert_eq!((width, height), (40.0, 12.0));
    }

    #[test]
    fn registration_covers_every_page_in_order() {
        let registry = registry_with_pages(3);

        assert_eq!(registry.page_numbers().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(registry.contains(2));
        assert!(!registry.contains(4));
    }

    #[test]
    fn clear_matches_keeps_registrations() {
        let mut registry = registry_with_pages(2);
        registry.set_matches(
            1,
            vec![MatchRect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            }],
        );

        registry.clear_matches();

        assert!(registry.matches(1).is_empty());
        assert!(registry.contains(1));
        assert!(registry.contains(2));
    }

    #[test]
    fn set_matches_on_unregistered_page_is_ignored() {
        let mut registry = registry_with_pages(1);
        registry.set_matches(
            7,
            vec![MatchRect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            }],
        );

        assert!(registry.matches(7).is_empty());
        assert!(!registry.contains(7));
    }
}
