pub mod app;
pub mod console_main;
pub mod keys;
pub mod ui;
