pub mod highlighter;
pub mod overlay_model;
pub mod text_match;
pub mod viewport;

pub use highlighter::{HighlightOutcome, run_highlight_pass};
pub use overlay_model::{MatchRect, OverlayRegistry};
pub use text_match::TextItem;
pub use viewport::PageViewport;
