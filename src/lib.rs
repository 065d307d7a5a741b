//! Viewer for fast-kinetics absorption images from the KRb CCD camera.
//!
//! The core is [`data::od::OdExtractor`], which splits each raw kinetic block
//! into shadow, light and dark exposures and computes the optical density
//! `ln((light - dark) / (shadow - dark))` with finite values everywhere.
//! The remaining modules load acquisitions from disk and show the results in
//! an egui window.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
