//! Resize on demand.
//!
//! The surface is checked against the displayed window/canvas size every
//! frame instead of only reacting to resize events. On the web the canvas can
//! change size through CSS without winit ever reporting a `Resized`.

use winit::dpi::PhysicalSize;

/// Size comparison between the surface backing store and what is displayed.
pub struct DisplaySize;

impl DisplaySize {
    /// Returns the size the surface has to be reconfigured to, if any.
    ///
    /// `backing` is the current surface configuration, `display` is the
    /// physical size of the window or canvas. A zero-area display (minimised
    /// window, hidden canvas) never requests a resize.
    pub fn check(backing: (u32, u32), display: PhysicalSize<u32>) -> Option<PhysicalSize<u32>> {
        if display.width == 0 || display.height == 0 {
            return None;
        }
        if backing == (display.width, display.height) {
            None
        } else {
            Some(display)
        }
    }

    /// Width over height, falling back to 1 for degenerate sizes.
    pub fn aspect(width: u32, height: u32) -> f32 {
        if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}
