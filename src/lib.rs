//! Terminal globe with animated bird migration routes drawn in Braille.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod geo;
pub mod loader;
pub mod map;
pub mod migration;
pub mod scene;
pub mod ui;
