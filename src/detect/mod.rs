//! Face region locators.
//!
//! Locators run once per pipeline, before rendering starts. Their result only decides whether
//! face-anchored effects (head sway, blink) are applied.

/// Locator trait, box types and trivial locators.
pub mod locator;
/// JSON annotation locator.
pub mod sidecar;
/// Skin-chrominance heuristic locator.
pub mod skin;
