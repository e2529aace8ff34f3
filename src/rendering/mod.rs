//! Rendering pipeline
//!
//! Renderers turn layout fields into paint commands at a given scale, the
//! rasterizer executes them onto the working canvas, and the compositor
//! ties the fixed draw order together.

pub mod compositor;
pub mod dots;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod sprite;
pub mod text;

pub use compositor::{Compositor, RenderWarning, Rendered};
pub use paint::{DisplayList, ImageRef, PaintCommand, TextPass};
