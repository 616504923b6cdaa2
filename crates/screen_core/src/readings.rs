//! Sources of simulated sensor values.

use std::ops::Range;

use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait ReadingSource: Send + 'static {
    fn next_value(&mut self) -> f32;
}

/// Uniform pseudo-random values in `[range.start, range.end)`.
pub struct UniformReadings {
    rng: StdRng,
    range: Range<f32>,
}

impl UniformReadings {
    pub fn new(range: Range<f32>) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }

    pub fn seeded(range: Range<f32>, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }
}

impl ReadingSource for UniformReadings {
    fn next_value(&mut self) -> f32 {
        let Range { start, end } = self.range;
        // rand panics on a span that overflows f32.
        if self.range.is_empty() || !(end - start).is_finite() {
            return start;
        }
        self.rng.gen_range(self.range.clone())
    }
}

pub struct ScriptedReadings {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedReadings {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            cursor: 0,
        }
    }
}

impl ReadingSource for ScriptedReadings {
    fn next_value(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_values_stay_in_range() {
        let mut source = UniformReadings::seeded(65.0..85.0, 42);
        for _ in 0..1_000 {
            let value = source.next_value();
            assert!((65.0..85.0).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn empty_range_yields_its_start() {
        let mut source = UniformReadings::seeded(70.0..70.0, 1);
        assert_eq!(source.next_value(), 70.0);
    }

    #[test]
    fn overflowing_range_yields_its_start() {
        let mut source = UniformReadings::seeded(-3.0e38..3.0e38, 7);
        assert_eq!(source.next_value(), -3.0e38);
    }

    #[test]
    fn script_cycles() {
        let mut source = ScriptedReadings::new([1.0, 2.0]);
        let values: Vec<f32> = (0..5).map(|_| source.next_value()).collect();
        assert_eq!(values, [1.0, 2.0, 1.0, 2.0, 1.0]);
    }
}
