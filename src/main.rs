mod highlight;
mod services;
mod widgets;

use std::fs::File;

use gtk::prelude::*;
use gtk::{Application, gio, glib};
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};

use crate::widgets::HiliteWindow;

const APP_ID: &str = "org.gtk_rs.hilite";

fn main() -> glib::ExitCode {
    init_logging();

    let app = Application::builder()
        .application_id(APP_ID)
        .flags(gio::ApplicationFlags::HANDLES_OPEN)
        .build();

    app.connect_activate(|app| {
        HiliteWindow::new(app).present();
    });

    app.connect_open(|app, files, _hint| {
        let window = HiliteWindow::new(app);
        window.present();

        if let Some(file) = files.first() {
            // gio hands over a percent-encoded URI, so names with spaces or
            // parentheses arrive intact; the session decodes them again.
            window.open_reference(file.uri().as_str());
        }
    });

    app.run()
}

fn init_logging() {
    if let Some(dir) = dirs::data_dir().map(|dir| dir.join("hilite")) {
        let _ = std::fs::create_dir_all(&dir);
        if let Ok(file) = File::create(dir.join("hilite.log"))
            && WriteLogger::init(LevelFilter::Info, Config::default(), file).is_ok()
        {
            return;
        }
    }

    let _ = SimpleLogger::init(LevelFilter::Info, Config::default());
}
