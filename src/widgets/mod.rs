mod analysis_panel;
mod document_view;
mod highlight_overlay;
mod hilite_header_bar;
mod hilite_window;
mod status_bar;

pub use analysis_panel::AnalysisPanel;
pub use document_view::DocumentView;
pub use highlight_overlay::HighlightOverlay;
pub use hilite_header_bar::HiliteHeaderBar;
pub use hilite_window::HiliteWindow;
pub use status_bar::StatusBar;
