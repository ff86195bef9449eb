//! # Cadenza Core
//!
//! Shared types for the Cadenza audio runtime.
//!
//! This crate provides the pieces every other crate agrees on:
//! - **Math**: glam re-exports and the camera pose handed over by the frame loop
//! - **Listener**: the packed listener state pushed to the device every frame

pub mod listener;
pub mod math;

pub use listener::ListenerState;
pub use math::{CameraPose, Vec3};

/// Name of the universal fallback ambient sound
pub const PLACEHOLDER_SOUND: &str = "";
