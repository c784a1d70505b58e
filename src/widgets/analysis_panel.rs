use glib::subclass::Signal;
use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Box, Button, Label, ListBox, Orientation, ScrolledWindow};
use std::sync::OnceLock;

use crate::services::analysis::{AnalysisOutline, Finding};

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct AnalysisPanel {
        pub title_label: Label,
        pub summary_label: Label,
        pub list_box: ListBox,
        pub close_button: Button,
        pub reset_button: Button,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for AnalysisPanel {
        const NAME: &'static str = "AnalysisPanel";
        type Type = super::AnalysisPanel;
        type ParentType = Box;
    }

    impl ObjectImpl for AnalysisPanel {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }

        fn signals() -> &'static [Signal] {
            static SIGNALS: OnceLock<Vec<Signal>> = OnceLock::new();
            SIGNALS.get_or_init(|| {
                vec![
                    Signal::builder("highlight-requested")
                        .param_types([String::static_type()])
                        .build(),
                    Signal::builder("reset-requested").build(),
                ]
            })
        }
    }

    impl WidgetImpl for AnalysisPanel {}
    impl BoxImpl for AnalysisPanel {}
}

glib::wrapper! {
    /// Side panel listing the document's analysis findings. Findings bound
    /// to a passage carry a reference button that requests a highlight for
    /// their literal query string.
    pub struct AnalysisPanel(ObjectSubclass<imp::AnalysisPanel>)
        @extends Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl AnalysisPanel {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        self.set_orientation(Orientation::Vertical);
        self.set_spacing(0);
        self.set_size_request(300, -1);

        let header_box = Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(8)
            .margin_start(12)
            .margin_end(12)
            .margin_top(12)
            .margin_bottom(8)
            .build();

        imp.title_label.set_text("Analysis");
        imp.title_label.set_hexpand(true);
        imp.title_label.set_xalign(0.0);
        imp.title_label.add_css_class("heading");
        header_box.append(&imp.title_label);

        imp.close_button.set_icon_name("window-close-symbolic");
        imp.close_button.add_css_class("flat");
        header_box.append(&imp.close_button);

        self.append(&header_box);

        imp.summary_label.set_wrap(true);
        imp.summary_label.set_xalign(0.0);
        imp.summary_label.set_margin_start(12);
        imp.summary_label.set_margin_end(12);
        imp.summary_label.set_margin_bottom(8);
        imp.summary_label.set_opacity(0.7);
        imp.summary_label.set_visible(false);
        self.append(&imp.summary_label);

        let scrolled_window = ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();

        imp.list_box.set_selection_mode(gtk::SelectionMode::None);
        imp.list_box.add_css_class("analysis-list");
        scrolled_window.set_child(Some(&imp.list_box));
        self.append(&scrolled_window);

        imp.reset_button.set_label("Reset view");
        imp.reset_button.set_margin_start(12);
        imp.reset_button.set_margin_end(12);
        imp.reset_button.set_margin_top(8);
        imp.reset_button.set_margin_bottom(12);
        imp.reset_button.set_halign(gtk::Align::Start);
        self.append(&imp.reset_button);

        self.add_css_class("analysis-panel");

        let panel_weak = self.downgrade();
        imp.reset_button.connect_clicked(move |_| {
            if let Some(panel) = panel_weak.upgrade() {
                panel.emit_by_name::<()>("reset-requested", &[]);
            }
        });

        self.show_placeholder();
    }

    pub fn close_button(&self) -> &Button {
        &self.imp().close_button
    }

    /// Rebuild the panel from an outline, or show the empty state when the
    /// document has none.
    pub fn populate(&self, outline: Option<&AnalysisOutline>) {
        let imp = self.imp();

        while let Some(row) = imp.list_box.first_child() {
            imp.list_box.remove(&row);
        }

        let Some(outline) = outline else {
            imp.title_label.set_text("Analysis");
            imp.summary_label.set_visible(false);
            self.show_placeholder();
            return;
        };

        if outline.title.is_empty() {
            imp.title_label.set_text("Analysis");
        } else {
            imp.title_label.set_text(&outline.title);
        }

        imp.summary_label.set_text(&outline.summary);
        imp.summary_label.set_visible(!outline.summary.is_empty());

        if outline.findings.is_empty() {
            self.show_placeholder();
        } else {
            for (index, finding) in outline.findings.iter().enumerate() {
                self.add_finding_row(finding, index + 1);
            }
        }
    }

    fn show_placeholder(&self) {
        let label = Label::new(Some("No analysis available for this document"));
        label.set_margin_start(12);
        label.set_margin_end(12);
        label.set_margin_top(12);
        label.set_margin_bottom(12);
        label.set_xalign(0.0);
        label.set_wrap(true);
        label.set_opacity(0.6);
        self.imp().list_box.append(&label);
    }

    fn add_finding_row(&self, finding: &Finding, number: usize) {
        let imp = self.imp();

        let row_box = Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(4)
            .margin_start(12)
            .margin_end(12)
            .margin_top(4)
            .margin_bottom(4)
            .build();

        let label = Label::new(Some(&finding.label));
        label.set_xalign(0.0);
        label.set_hexpand(true);
        label.set_wrap(true);
        label.add_css_class("analysis-entry");
        row_box.append(&label);

        if let Some(query) = &finding.query {
            let button = Button::with_label(&format!("[{number}]"));
            button.add_css_class("flat");
            button.set_valign(gtk::Align::Start);
            button.set_tooltip_text(Some("Highlight in document"));

            let panel_weak = self.downgrade();
            let query = query.clone();
            button.connect_clicked(move |_| {
                if let Some(panel) = panel_weak.upgrade() {
                    panel.emit_by_name::<()>("highlight-requested", &[&query]);
                }
            });

            row_box.append(&button);
        }

        let row = gtk::ListBoxRow::builder()
            .child(&row_box)
            .activatable(false)
            .build();
        imp.list_box.append(&row);
    }
}

impl Default for AnalysisPanel {
    fn default() -> Self {
        Self::new()
    }
}
