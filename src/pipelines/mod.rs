//! Render pipeline construction.
//!
//! - `basic` builds the lit, instanced mesh pipeline
//! - `light` holds the point light uniform and its bind group

pub mod basic;
pub mod light;
