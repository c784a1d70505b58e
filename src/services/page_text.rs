use pdfium_render::prelude::*;

use crate::highlight::TextItem;

/// Vertical drift, as a fraction of glyph height, beyond which a character
/// starts a new run
const BASELINE_DRIFT_RATIO: f64 = 0.5;

/// Horizontal gap, in multiples of glyph height, beyond which a run splits
const RUN_GAP_RATIO: f64 = 1.5;

/// Character geometry pulled from the engine before run assembly
struct RawChar {
    ch: char,
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl RawChar {
    fn height(&self) -> f64 {
        self.top - self.bottom
    }

    fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Extract the positioned text runs of a page.
///
/// The engine exposes per-character boxes; consecutive characters sharing a
/// baseline are assembled into line-level runs so a multi-word phrase can be
/// matched inside a single item. Each run's placement matrix carries the
/// union line height as its scale and the run's left/baseline corner as its
/// translation.
pub fn extract_text_items(page: &PdfPage) -> Result<Vec<TextItem>, PdfiumError> {
    let text_page = page.text()?;
    let chars = text_page.chars();

    let mut raw = Vec::new();
    for char_obj in chars.iter() {
        if let (Some(ch), Ok(bounds)) = (char_obj.unicode_char(), char_obj.loose_bounds()) {
            raw.push(RawChar {
                ch,
                left: bounds.left().value as f64,
                right: bounds.right().value as f64,
                bottom: bounds.bottom().value as f64,
                top: bounds.top().value as f64,
            });
        }
    }

    Ok(assemble_runs(&raw))
}

/// Group characters into runs, splitting on line breaks, baseline jumps,
/// and column-sized horizontal gaps.
fn assemble_runs(chars: &[RawChar]) -> Vec<TextItem> {
    let mut items = Vec::new();
    let mut run: Option<RunBuilder> = None;

    for c in chars {
        if c.ch == '\n' || c.ch == '\r' {
            if let Some(finished) = run.take() {
                items.extend(finished.finish());
            }
            continue;
        }

        match run.as_mut() {
            Some(current) if current.accepts(c) => current.push(c),
            _ => {
                if let Some(finished) = run.take() {
                    items.extend(finished.finish());
                }
                run = Some(RunBuilder::start(c));
            }
        }
    }

    if let Some(finished) = run.take() {
        items.extend(finished.finish());
    }

    items
}

struct RunBuilder {
    content: String,
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
    last_right: f64,
    last_center_y: f64,
}

impl RunBuilder {
    fn start(c: &RawChar) -> Self {
        Self {
            content: c.ch.to_string(),
            left: c.left,
            right: c.right,
            bottom: c.bottom,
            top: c.top,
            last_right: c.right,
            last_center_y: c.center_y(),
        }
    }

    fn glyph_height(&self) -> f64 {
        self.top - self.bottom
    }

    fn accepts(&self, c: &RawChar) -> bool {
        if c.height() <= 0.0 {
            // Degenerate geometry (some whitespace glyphs) never breaks a run
            return true;
        }

        let reference = self.glyph_height().max(c.height());
        (c.center_y() - self.last_center_y).abs() <= reference * BASELINE_DRIFT_RATIO
            && c.left - self.last_right <= reference * RUN_GAP_RATIO
    }

    fn push(&mut self, c: &RawChar) {
        self.content.push(c.ch);
        self.left = self.left.min(c.left);
        self.right = self.right.max(c.right);
        self.bottom = self.bottom.min(c.bottom);
        self.top = self.top.max(c.top);
        self.last_right = c.right;
        if c.height() > 0.0 {
            self.last_center_y = c.center_y();
        }
    }

    fn finish(self) -> Option<TextItem> {
        if self.content.trim().is_empty() {
            return None;
        }

        let height = (self.top - self.bottom).max(0.0);
        let extent = self.right - self.left;

        Some(TextItem {
            content: self.content,
            transform: [height, 0.0, 0.0, height, self.left, self.bottom],
            width: (extent > 0.0).then_some(extent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char, left: f64, bottom: f64) -> RawChar {
        RawChar {
            ch,
            left,
            right: left + 6.0,
            bottom,
            top: bottom + 12.0,
        }
    }

    fn spell(word: &str, left: f64, bottom: f64) -> Vec<RawChar> {
        word.chars()
            .enumerate()
            .map(|(i, ch)| glyph(ch, left + i as f64 * 6.0, bottom))
            .collect()
    }

    #[test]
    fn same_baseline_characters_form_one_run() {
        let chars = spell("Total assets", 72.0, 700.0);

        let items = assemble_runs(&chars);
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.content, "Total assets");
        assert_eq!(item.transform, [12.0, 0.0, 0.0, 12.0, 72.0, 700.0]);
        assert_eq!(item.width, Some(12.0 * 6.0));
    }

    #[test]
    fn a_baseline_jump_starts_a_new_run() {
        let mut chars = spell("Revenue", 72.0, 700.0);
        chars.extend(spell("Costs", 72.0, 680.0));

        let items = assemble_runs(&chars);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].content, "Revenue");
        assert_eq!(items[1].content, "Costs");
        assert_eq!(items[1].transform[5], 680.0);
    }

    #[test]
    fn a_column_gap_splits_the_line() {
        let mut chars = spell("Item", 72.0, 700.0);
        // Same baseline, far to the right: a figure column.
        chars.extend(spell("1,234", 400.0, 700.0));

        let items = assemble_runs(&chars);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn newline_characters_flush_the_run() {
        let mut chars = spell("Header", 72.0, 700.0);
        chars.push(glyph('\n', 120.0, 700.0));
        chars.extend(spell("Body", 72.0, 699.0));

        let items = assemble_runs(&chars);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn whitespace_only_runs_are_dropped() {
        let chars = spell("   ", 72.0, 700.0);

        assert!(assemble_runs(&chars).is_empty());
    }

    #[test]
    fn degenerate_geometry_produces_a_fallback_friendly_item() {
        let chars: Vec<RawChar> = "ok"
            .chars()
            .map(|ch| RawChar {
                ch,
                left: 0.0,
                right: 0.0,
                bottom: 0.0,
                top: 0.0,
            })
            .collect();

        let items = assemble_runs(&chars);
        assert_eq!(items.len(), 1);
        // Zero vertical scale: the matcher's font-height fallback applies.
        assert_eq!(items[0].transform[0], 0.0);
        assert_eq!(items[0].transform[3], 0.0);
        assert_eq!(items[0].width, None);
    }
}
