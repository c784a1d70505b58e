use gtk::glib;
use gtk::prelude::*;
use gtk::subclass::prelude::*;
use gtk::{Button, HeaderBar};

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct HiliteHeaderBar {
        pub header_bar: HeaderBar,
        pub open_button: Button,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for HiliteHeaderBar {
        const NAME: &'static str = "HiliteHeaderBar";
        type Type = super::HiliteHeaderBar;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for HiliteHeaderBar {
        fn constructed(&self) {
            self.parent_constructed();
            self.obj().setup_widgets();
        }
    }
}

glib::wrapper! {
    pub struct HiliteHeaderBar(ObjectSubclass<imp::HiliteHeaderBar>);
}

impl HiliteHeaderBar {
    pub fn new() -> Self {
        glib::Object::builder().build()
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        imp.header_bar
            .set_title_widget(Some(&gtk::Label::new(Some("Hilite"))));
        imp.header_bar.set_show_title_buttons(true);

        imp.open_button.set_label("Open Document");
        imp.header_bar.pack_start(&imp.open_button);
    }

    /// Returns the HeaderBar widget to be used with set_titlebar()
    pub fn widget(&self) -> &HeaderBar {
        &self.imp().header_bar
    }

    pub fn open_button(&self) -> &Button {
        &self.imp().open_button
    }
}

impl Default for HiliteHeaderBar {
    fn default() -> Self {
        Self::new()
    }
}
