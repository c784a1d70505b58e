use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Orientation, Overlay, Picture};
use log::{debug, error, info};
use pdfium_render::prelude::*;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::time::Duration;

use crate::highlight::PageViewport;
use crate::services::{DocumentError, DocumentSession};
use crate::widgets::HighlightOverlay;

/// Render scale applied to each page's natural size
const DEFAULT_SCALE: f64 = 1.5;
const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 3.0;

/// Vertical gap between page blocks
const PAGE_SPACING: i32 = 16;

const SCROLL_ANIMATION_MS: u32 = 250;
const SCROLL_FRAME_MS: u32 = 16;

mod imp {
    use super::*;

    pub struct DocumentView {
        pub session: RefCell<Option<DocumentSession>>,
        pub pdfium: RefCell<Option<&'static Pdfium>>,
        pub(super) page_pictures: RefCell<Vec<Picture>>,
        pub(super) highlight_overlays: RefCell<Vec<HighlightOverlay>>,
        pub scale: Cell<f64>,
        /// Bumped on every scroll request so in-flight animations know they
        /// have been superseded
        pub(super) scroll_generation: Cell<u32>,
    }

    impl Default for DocumentView {
        fn default() -> Self {
            Self {
                session: RefCell::new(None),
                pdfium: RefCell::new(None),
                page_pictures: RefCell::new(Vec::new()),
                highlight_overlays: RefCell::new(Vec::new()),
                scale: Cell::new(DEFAULT_SCALE),
                scroll_generation: Cell::new(0),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for DocumentView {
        const NAME: &'static str = "DocumentView";
        type Type = super::DocumentView;
        type ParentType = gtk::Box;
    }

    impl ObjectImpl for DocumentView {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }

    impl WidgetImpl for DocumentView {}
    impl BoxImpl for DocumentView {}
}

glib::wrapper! {
    /// Vertically stacked page blocks: one raster picture per page with a
    /// transparent highlight overlay stacked on top of it.
    pub struct DocumentView(ObjectSubclass<imp::DocumentView>)
        @extends gtk::Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl DocumentView {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        self.set_orientation(Orientation::Vertical);
        self.set_spacing(PAGE_SPACING);
    }

    pub fn set_pdfium(&self, pdfium: &'static Pdfium) {
        self.imp().pdfium.replace(Some(pdfium));
    }

    /// Load the document behind `reference` and lay out all of its pages.
    ///
    /// The previous document's page blocks come down exactly once, after the
    /// new document has loaded successfully; a failed load leaves the view
    /// untouched.
    pub fn load_document(&self, reference: &str) -> Result<(), DocumentError> {
        let pdfium = self.imp().pdfium.borrow().ok_or_else(|| DocumentError::Load {
            reference: reference.to_string(),
            reason: "rendering engine not initialised".to_string(),
        })?;

        let session = DocumentSession::open(pdfium, reference)?;
        info!(
            "loaded {} ({} pages)",
            session.reference(),
            session.page_count()
        );

        self.clear_pages();
        self.imp().session.replace(Some(session));
        self.layout_pages()
    }

    fn clear_pages(&self) {
        while let Some(child) = self.first_child() {
            self.remove(&child);
        }
        self.imp().page_pictures.borrow_mut().clear();
        self.imp().highlight_overlays.borrow_mut().clear();

        // Whatever scroll was running is aimed at geometry that no longer
        // exists
        let imp = self.imp();
        imp.scroll_generation
            .set(imp.scroll_generation.get().wrapping_add(1));
    }

    /// Lay out every page in ascending order: resolve its viewport, render
    /// its raster, stack the highlight overlay over it, and register the
    /// page in the overlay registry. A page that fails to render stops the
    /// pass; earlier pages stay visible and registered.
    fn layout_pages(&self) -> Result<(), DocumentError> {
        let mut session_ref = self.imp().session.borrow_mut();
        let Some(session) = session_ref.as_mut() else {
            return Ok(());
        };

        let scale = self.imp().scale.get();

        for page_number in 1..=session.page_count() {
            let (viewport, texture) = {
                let page = session
                    .document()
                    .pages()
                    .get(page_number - 1)
                    .map_err(|err| DocumentError::Render {
                        page_number,
                        reason: err.to_string(),
                    })?;

                let viewport = PageViewport::new(
                    page.width().value as f64,
                    page.height().value as f64,
                    scale,
                );

                let texture = render_page_texture(&page, &viewport).map_err(|err| {
                    DocumentError::Render {
                        page_number,
                        reason: err.to_string(),
                    }
                })?;

                (viewport, texture)
            };

            let picture = Picture::builder()
                .can_shrink(false)
                .paintable(&texture)
                .build();

            let highlight = HighlightOverlay::new();
            highlight.set_content_width(viewport.pixel_width());
            highlight.set_content_height(viewport.pixel_height());

            let block = Overlay::new();
            block.set_child(Some(&picture));
            block.add_overlay(&highlight);
            self.append(&block);

            session.registry_mut().register(page_number, viewport);
            self.imp().page_pictures.borrow_mut().push(picture);
            self.imp().highlight_overlays.borrow_mut().push(highlight);

            debug!(
                "laid out page {page_number} at {}x{}",
                viewport.pixel_width(),
                viewport.pixel_height()
            );
        }

        Ok(())
    }

    /// Run a highlight pass for `query` and repaint every overlay from the
    /// result. Returns whether any page matched.
    pub fn run_highlight(&self, query: &str) -> bool {
        let outcome = {
            let mut session_ref = self.imp().session.borrow_mut();
            let Some(session) = session_ref.as_mut() else {
                return false;
            };
            session.highlight(query)
        };

        self.materialize_highlights();

        for &page_number in &outcome.matched_pages {
            // Ascending order: with several matching pages each request
            // supersedes the previous animation, so the highest-indexed
            // page ends up in view.
            self.scroll_to_page(page_number);
        }

        info!(
            "query {:?}: {} matching page(s)",
            query,
            outcome.matched_pages.len()
        );
        outcome.found_any
    }

    /// Repaint every page overlay from the registry's current match state
    fn materialize_highlights(&self) {
        let session_ref = self.imp().session.borrow();
        let Some(session) = session_ref.as_ref() else {
            return;
        };

        let overlays = self.imp().highlight_overlays.borrow();
        for (index, overlay) in overlays.iter().enumerate() {
            let page_number = index as u16 + 1;
            overlay.set_matches(session.registry().matches(page_number).to_vec());
        }
    }

    /// Smoothly scroll the given page into view, centered in the visible
    /// area
    pub fn scroll_to_page(&self, page_number: u16) {
        let Some(scrolled) = self.find_scrolled_window() else {
            return;
        };

        let pictures = self.imp().page_pictures.borrow();
        let index = usize::from(page_number.saturating_sub(1));
        let Some(target_picture) = pictures.get(index) else {
            return;
        };

        let spacing = f64::from(PAGE_SPACING);
        let mut page_top = 0.0;
        for picture in pictures.iter().take(index) {
            page_top += f64::from(picture.preferred_size().1.height()) + spacing;
        }
        let page_height = f64::from(target_picture.preferred_size().1.height());

        let adjustment = scrolled.vadjustment();
        let visible = adjustment.page_size();
        let max_value = (adjustment.upper() - visible).max(0.0);
        let target = (page_top + page_height / 2.0 - visible / 2.0).clamp(0.0, max_value);

        self.animate_scroll(&adjustment, target);
    }

    fn animate_scroll(&self, adjustment: &gtk::Adjustment, target: f64) {
        let imp = self.imp();
        let generation = imp.scroll_generation.get().wrapping_add(1);
        imp.scroll_generation.set(generation);

        let start = adjustment.value();
        let delta = target - start;
        if delta.abs() < 1.0 {
            adjustment.set_value(target);
            return;
        }

        let steps = (SCROLL_ANIMATION_MS / SCROLL_FRAME_MS).max(1);
        let mut step = 0u32;
        let view_weak = self.downgrade();
        let adjustment = adjustment.clone();

        glib::timeout_add_local(Duration::from_millis(u64::from(SCROLL_FRAME_MS)), move || {
            let Some(view) = view_weak.upgrade() else {
                return glib::ControlFlow::Break;
            };
            if view.imp().scroll_generation.get() != generation {
                // A newer scroll request took over
                return glib::ControlFlow::Break;
            }

            step += 1;
            let t = (f64::from(step) / f64::from(steps)).min(1.0);
            let eased = 1.0 - (1.0 - t).powi(3);
            adjustment.set_value(start + delta * eased);

            if step >= steps {
                glib::ControlFlow::Break
            } else {
                glib::ControlFlow::Continue
            }
        });
    }

    /// Change the render scale (clamped) and rebuild the whole layout with
    /// freshly resolved viewports.
    pub fn set_scale(&self, scale: f64) {
        let clamped = scale.clamp(MIN_SCALE, MAX_SCALE);
        if (clamped - self.imp().scale.get()).abs() < f64::EPSILON {
            return;
        }
        self.imp().scale.set(clamped);

        if !self.has_document() {
            return;
        }

        self.clear_pages();
        if let Some(session) = self.imp().session.borrow_mut().as_mut() {
            session.registry_mut().clear();
        }
        if let Err(err) = self.layout_pages() {
            error!("relayout at scale {clamped} failed: {err}");
        }
    }

    pub fn adjust_scale(&self, delta: f64) {
        self.set_scale(self.imp().scale.get() + delta);
    }

    pub fn has_document(&self) -> bool {
        self.imp().session.borrow().is_some()
    }

    /// Filesystem path of the loaded document, for locating its sidecar
    pub fn source_path(&self) -> Option<PathBuf> {
        self.imp()
            .session
            .borrow()
            .as_ref()
            .map(|session| session.source_path().to_path_buf())
    }

    fn find_scrolled_window(&self) -> Option<gtk::ScrolledWindow> {
        self.parent()?.parent()?.downcast().ok()
    }
}

impl Default for DocumentView {
    fn default() -> Self {
        Self::new()
    }
}

/// Rasterize one page at its viewport size and wrap the pixels in a GPU
/// texture
fn render_page_texture(
    page: &PdfPage,
    viewport: &PageViewport,
) -> Result<gtk::gdk::MemoryTexture, PdfiumError> {
    let config = PdfRenderConfig::new()
        .set_target_width(viewport.pixel_width())
        .set_format(PdfBitmapFormat::BGRA);

    let bitmap = page.render_with_config(&config)?;

    let width = bitmap.width() as i32;
    let height = bitmap.height() as i32;
    let stride = (width * 4) as usize;

    let bytes = bitmap.as_raw_bytes();
    let bytes = glib::Bytes::from(&bytes);

    Ok(gtk::gdk::MemoryTexture::new(
        width,
        height,
        gtk::gdk::MemoryFormat::B8g8r8a8,
        &bytes,
        stride,
    ))
}
