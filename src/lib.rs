//! Fire Smoke - real-time smoke and fire particle effects
//!
//! Two independently configured particle populations rendered as camera-facing
//! point sprites, with emission from the bottom edge, the center, the pointer,
//! or the shape of a text string.

pub mod app;
pub mod config;
pub mod error;
pub mod params;
pub mod persistence;
pub mod renderer;
pub mod sim;
