pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod geo;
pub mod logging;
pub mod map;
pub mod markers;
pub mod pins;
pub mod popup;
pub mod ui;
