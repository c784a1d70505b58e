use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use std::cell::RefCell;

use crate::highlight::MatchRect;

/// Highlight fill: semi-opaque yellow over the page raster
const FILL_RGBA: (f64, f64, f64, f64) = (1.0, 1.0, 0.0, 0.6);

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct HighlightOverlay {
        pub matches: RefCell<Vec<MatchRect>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for HighlightOverlay {
        const NAME: &'static str = "HighlightOverlay";
        type Type = super::HighlightOverlay;
        type ParentType = gtk::DrawingArea;
    }

    impl ObjectImpl for HighlightOverlay {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_drawing();
        }
    }

    impl WidgetImpl for HighlightOverlay {}
    impl DrawingAreaImpl for HighlightOverlay {}
}

glib::wrapper! {
    /// Transparent drawing surface stacked over one page's raster, painting
    /// the page's current match rectangles. Display-only: never a hit
    /// target.
    pub struct HighlightOverlay(ObjectSubclass<imp::HighlightOverlay>)
        @extends gtk::DrawingArea, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget;
}

impl HighlightOverlay {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_drawing(&self) {
        // Pointer interaction stays with the page underneath
        self.set_can_target(false);

        let overlay_weak = self.downgrade();
        self.set_draw_func(move |_area, cr, _width, _height| {
            if let Some(overlay) = overlay_weak.upgrade() {
                overlay.draw(cr);
            }
        });
    }

    fn draw(&self, cr: &gtk::cairo::Context) {
        let (r, g, b, a) = FILL_RGBA;

        for rect in self.imp().matches.borrow().iter() {
            let (x, y, width, height) = rect.painted();
            cr.set_source_rgba(r, g, b, a);
            cr.rectangle(x, y, width, height);
            let _ = cr.fill();
        }
    }

    /// Replace the painted match collection
    pub fn set_matches(&self, matches: Vec<MatchRect>) {
        self.imp().matches.replace(matches);
        self.queue_draw();
    }
}

impl Default for HighlightOverlay {
    fn default() -> Self {
        Self::new()
    }
}
