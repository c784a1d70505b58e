use gtk::gio;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{ApplicationWindow, Box, Orientation, Paned, PolicyType, ScrolledWindow};
use log::error;
use pdfium_render::prelude::*;
use std::cell::RefCell;
use std::path::Path;

use crate::services::analysis;
use crate::services::DocumentError;
use crate::widgets::{AnalysisPanel, DocumentView, HiliteHeaderBar, StatusBar};

/// Scale increment for the zoom keys
const SCALE_STEP: f64 = 0.25;

mod imp {
    use super::*;

    pub struct HiliteWindow {
        pub header_bar: HiliteHeaderBar,
        pub document_view: DocumentView,
        pub analysis_panel: AnalysisPanel,
        pub status_bar: StatusBar,
        pub pdfium: RefCell<Option<&'static Pdfium>>,
    }

    impl Default for HiliteWindow {
        fn default() -> Self {
            Self {
                header_bar: HiliteHeaderBar::new(),
                document_view: DocumentView::new(),
                analysis_panel: AnalysisPanel::new(),
                status_bar: StatusBar::new(),
                pdfium: RefCell::new(None),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for HiliteWindow {
        const NAME: &'static str = "HiliteWindow";
        type Type = super::HiliteWindow;
        type ParentType = ApplicationWindow;
    }

    impl ObjectImpl for HiliteWindow {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }

    impl WidgetImpl for HiliteWindow {}
    impl WindowImpl for HiliteWindow {}
    impl ApplicationWindowImpl for HiliteWindow {}
}

glib::wrapper! {
    pub struct HiliteWindow(ObjectSubclass<imp::HiliteWindow>)
        @extends ApplicationWindow, gtk::Window, gtk::Widget,
        @implements gio::ActionGroup, gio::ActionMap, gtk::Accessible, gtk::Buildable,
                    gtk::ConstraintTarget, gtk::Native, gtk::Root, gtk::ShortcutManager;
}

impl HiliteWindow {
    pub fn new(app: &gtk::Application) -> Self {
        let window: Self = glib::Object::builder()
            .property("application", app)
            .property("title", "Hilite")
            .property("default-width", 1100)
            .property("default-height", 800)
            .build();

        window.init_pdfium();
        window
    }

    fn init_pdfium(&self) {
        let bindings = Pdfium::bind_to_library(Path::new("./libpdfium.so"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .expect("Failed to bind to PDFium");
        let pdfium: &'static Pdfium =
            std::boxed::Box::leak(std::boxed::Box::new(Pdfium::new(bindings)));

        self.imp().pdfium.replace(Some(pdfium));
        self.imp().document_view.set_pdfium(pdfium);
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        self.set_titlebar(Some(imp.header_bar.widget()));
        self.setup_open_button();

        let paned = Paned::builder().orientation(Orientation::Horizontal).build();
        paned.set_wide_handle(true);

        let scrolled_window = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Automatic)
            .vscrollbar_policy(PolicyType::Automatic)
            .vexpand(true)
            .hexpand(true)
            .child(&imp.document_view)
            .build();

        paned.set_start_child(Some(&scrolled_window));
        paned.set_end_child(Some(&imp.analysis_panel));
        paned.set_resize_start_child(true);
        paned.set_shrink_start_child(false);
        paned.set_resize_end_child(false);
        paned.set_shrink_end_child(false);
        paned.set_position(780);

        let main_box = Box::builder().orientation(Orientation::Vertical).build();
        main_box.append(&paned);

        let root = gtk::Overlay::new();
        root.set_child(Some(&main_box));
        root.add_overlay(&imp.status_bar);

        self.set_child(Some(&root));

        self.setup_analysis_panel();
        self.setup_keyboard_controller();
    }

    fn setup_analysis_panel(&self) {
        let imp = self.imp();

        let panel = imp.analysis_panel.clone();
        imp.analysis_panel.close_button().connect_clicked(move |_| {
            panel.set_visible(false);
        });

        let view = imp.document_view.clone();
        let status = imp.status_bar.clone();
        imp.analysis_panel.connect_closure(
            "highlight-requested",
            false,
            glib::closure_local!(move |_panel: &AnalysisPanel, query: &str| {
                let found = view.run_highlight(query);
                if !found {
                    status.show_message(&format!("No matches for \u{201c}{query}\u{201d}"));
                }
            }),
        );

        let view = imp.document_view.clone();
        imp.analysis_panel.connect_closure(
            "reset-requested",
            false,
            glib::closure_local!(move |_panel: &AnalysisPanel| {
                view.scroll_to_page(1);
            }),
        );
    }

    fn setup_keyboard_controller(&self) {
        let controller = gtk::EventControllerKey::new();
        let window_weak = self.downgrade();

        controller.connect_key_pressed(move |_, key, _, _| {
            let Some(window) = window_weak.upgrade() else {
                return glib::Propagation::Proceed;
            };

            if key == gtk::gdk::Key::Tab {
                window.toggle_analysis_panel();
                glib::Propagation::Stop
            } else if key == gtk::gdk::Key::plus
                || key == gtk::gdk::Key::equal
                || key == gtk::gdk::Key::KP_Add
            {
                window.imp().document_view.adjust_scale(SCALE_STEP);
                glib::Propagation::Stop
            } else if key == gtk::gdk::Key::minus || key == gtk::gdk::Key::KP_Subtract {
                window.imp().document_view.adjust_scale(-SCALE_STEP);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });

        self.add_controller(controller);
    }

    fn toggle_analysis_panel(&self) {
        let imp = self.imp();
        let is_visible = imp.analysis_panel.is_visible();
        imp.analysis_panel.set_visible(!is_visible);
    }

    fn setup_open_button(&self) {
        let window_weak = self.downgrade();

        self.imp()
            .header_bar
            .open_button()
            .connect_clicked(move |_| {
                if let Some(window) = window_weak.upgrade() {
                    window.show_open_dialog();
                }
            });
    }

    fn show_open_dialog(&self) {
        let dialog = gtk::FileDialog::builder().title("Select a document").build();
        let window_weak = self.downgrade();

        dialog.open(Some(self), None::<&gio::Cancellable>, move |result| {
            if let Some(window) = window_weak.upgrade() {
                window.handle_file_dialog_result(result);
            }
        });
    }

    fn handle_file_dialog_result(&self, result: Result<gio::File, glib::Error>) {
        let file = match result {
            Ok(f) => f,
            Err(_) => return,
        };

        let path = match file.path() {
            Some(p) => p,
            None => return,
        };

        self.open_reference(&path.display().to_string());
    }

    /// Load the document behind a URI-like reference and populate the
    /// analysis panel from its sidecar. Failures alert the user, naming the
    /// reference.
    pub fn open_reference(&self, reference: &str) {
        let imp = self.imp();

        match imp.document_view.load_document(reference) {
            Ok(()) => {
                let outline = imp
                    .document_view
                    .source_path()
                    .and_then(|path| analysis::load_sidecar(&path));
                imp.analysis_panel.populate(outline.as_ref());
                imp.status_bar.hide_message();
            }
            Err(err) => {
                error!("{err}");
                self.show_document_alert(reference, &err);
            }
        }
    }

    fn show_document_alert(&self, reference: &str, err: &DocumentError) {
        let message = match err {
            DocumentError::Render { page_number, .. } => {
                format!("Could not display page {page_number} of {reference}")
            }
            _ => format!("Could not open {reference}"),
        };

        let detail = err.to_string();
        let dialog = gtk::AlertDialog::builder()
            .modal(true)
            .message(message.as_str())
            .detail(detail.as_str())
            .build();
        dialog.show(Some(self));
    }

    pub fn document_view(&self) -> &DocumentView {
        &self.imp().document_view
    }

    pub fn analysis_panel(&self) -> &AnalysisPanel {
        &self.imp().analysis_panel
    }
}
