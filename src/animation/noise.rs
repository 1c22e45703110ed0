use crate::foundation::core::FrameIndex;
use crate::foundation::math::Fnv1a64;

#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// Standard normal sampler (Box-Muller) over [`Rng64`].
///
/// Each transform yields two independent deviates; the second is cached for the next call.
#[derive(Clone, Debug)]
pub struct Gaussian {
    rng: Rng64,
    spare: Option<f64>,
}

impl Gaussian {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng64::new(seed),
            spare: None,
        }
    }

    /// Draw one N(0, 1) deviate.
    pub fn next_standard(&mut self) -> f64 {
        if let Some(v) = self.spare.take() {
            return v;
        }
        // u1 in (0, 1] keeps ln() finite.
        let u1 = 1.0 - self.rng.next_f64_01();
        let u2 = self.rng.next_f64_01();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = std::f64::consts::TAU * u2;
        self.spare = Some(r * theta.sin());
        r * theta.cos()
    }
}

/// Base seed from which every frame's noise stream is derived.
///
/// Frame streams depend only on `(seed, frame)`, so frames can be rendered in any order (or in
/// parallel) and still get the same noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NoiseSeed(pub u64);

impl NoiseSeed {
    /// Seed that differs between runs.
    pub fn fresh() -> Self {
        Self(rand::random())
    }

    /// Independent Gaussian stream for one frame.
    pub fn frame_stream(self, frame: FrameIndex) -> Gaussian {
        let mut h = Fnv1a64::new(self.0 ^ Fnv1a64::OFFSET_BASIS);
        h.write_u64(frame.0);
        Gaussian::new(h.finish())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/noise.rs"]
mod tests;
