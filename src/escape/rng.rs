//! Injectable random source for discovery rolls.

pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;
}

/// 64-bit LCG. Good enough for item discovery; not for anything else.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the wall clock.
    pub fn from_clock() -> Self {
        #[cfg(target_arch = "wasm32")]
        let seed = js_sys::Date::now() as u64;

        #[cfg(not(target_arch = "wasm32"))]
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);

        Self::new(seed)
    }
}

impl RandomSource for SimpleRng {
    fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // Top 53 bits → [0, 1)
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[cfg(test)]
pub struct SequenceRng {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
