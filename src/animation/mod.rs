/// Pure per-frame liveness parameter sampler.
pub mod model;
/// Seeded noise streams.
pub mod noise;
