//! CPU frame compositing.

/// Per-frame compositing steps.
pub mod compositor;
/// Source image and output frame buffers.
pub mod frame;
