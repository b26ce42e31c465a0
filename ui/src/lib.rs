#![warn(clippy::all, rust_2018_idioms)]
//! egui front end for the QR code view: the widget, PNG export and the demo app.

pub mod app;
pub mod config;
pub mod export;
pub mod widgets;

pub use app::QrViewApp;
