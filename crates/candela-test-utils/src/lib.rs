//! Test utilities for Candela.
//!
//! Provides [`MockBackend`], a [`RenderBackend`] implementation that
//! records every GPU operation instead of performing it, so engine and
//! primitive behavior can be asserted without a device.
//!
//! [`RenderBackend`]: candela::render::RenderBackend

mod mock_backend;

pub use mock_backend::{BackendCall, MockBackend};
