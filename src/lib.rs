//! TriPaint: a pixel-grid editor whose cells can be empty, filled, or split
//! into a right-angled triangle anchored at one corner.

pub mod logger;

pub mod app;
pub mod cli;
pub mod components;
pub mod controller;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod line;
pub mod project;
pub mod render;
pub mod settings;
