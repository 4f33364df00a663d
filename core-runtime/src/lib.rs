//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the recitation playback core:
//! - Logging and tracing bootstrap
//! - Bridge configuration with fail-fast validation
//! - Event bus for chapter, verse, and preference notifications
//!
//! ## Overview
//!
//! Every other core crate depends on this one for its logging conventions and
//! for the [`events::EventBus`] through which playback failures reach the UI.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
