use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use std::cell::Cell;
use std::time::Duration;

/// How long a message stays up before the bar hides itself
const HIDE_DELAY_SECS: u64 = 4;

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct StatusBar {
        pub label: gtk::Label,
        /// Bumped per message so an older hide timer cannot close a newer
        /// message
        pub generation: Cell<u32>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for StatusBar {
        const NAME: &'static str = "HiliteStatusBar";
        type Type = super::StatusBar;
        type ParentType = gtk::Box;
    }

    impl ObjectImpl for StatusBar {
        fn constructed(&self) {
            self.parent_constructed();

            let obj = self.obj();

            obj.set_orientation(gtk::Orientation::Horizontal);
            obj.set_halign(gtk::Align::Center);
            obj.set_valign(gtk::Align::End);
            obj.set_margin_bottom(12);

            self.label.set_halign(gtk::Align::Center);
            self.label.add_css_class("status-bar-label");

            let inner_box = gtk::Box::new(gtk::Orientation::Horizontal, 8);
            inner_box.add_css_class("status-bar");
            inner_box.set_margin_start(16);
            inner_box.set_margin_end(16);
            inner_box.set_margin_top(8);
            inner_box.set_margin_bottom(8);
            inner_box.append(&self.label);

            obj.append(&inner_box);

            // Hidden until a message arrives
            obj.set_visible(false);
        }
    }

    impl WidgetImpl for StatusBar {}
    impl BoxImpl for StatusBar {}
}

glib::wrapper! {
    /// Passive, transient notification floating at the bottom of the
    /// window; the no-match feedback channel for highlight queries.
    pub struct StatusBar(ObjectSubclass<imp::StatusBar>)
        @extends gtk::Box, gtk::Widget,
        @implements gtk::Accessible, gtk::Buildable, gtk::ConstraintTarget, gtk::Orientable;
}

impl StatusBar {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    /// Show `message` and schedule it to fade out
    pub fn show_message(&self, message: &str) {
        let imp = self.imp();

        imp.label.set_text(message);
        self.set_visible(true);

        let generation = imp.generation.get().wrapping_add(1);
        imp.generation.set(generation);

        let bar_weak = self.downgrade();
        glib::timeout_add_local_once(Duration::from_secs(HIDE_DELAY_SECS), move || {
            if let Some(bar) = bar_weak.upgrade()
                && bar.imp().generation.get() == generation
            {
                bar.set_visible(false);
            }
        });
    }

    pub fn hide_message(&self) {
        let imp = self.imp();
        imp.generation.set(imp.generation.get().wrapping_add(1));
        self.set_visible(false);
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
