//! Bounded latency reservoir and percentile computation .

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Maximum retained samples per latency family .
pub const RESERVOIR_CAPACITY: usize = 10_000;

/// A bounded FIFO of the most recent latency samples (milliseconds),
/// with on-demand percentile computation.
#[derive(Default)]
pub struct LatencyReservoir {
    samples: Mutex<VecDeque<i64>>,
}

impl LatencyReservoir {
    pub fn new() -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(RESERVOIR_CAPACITY)),
        }
    }

    pub fn record(&self, sample_ms: i64) {
        let mut samples = self.samples.lock();
        if samples.len() >= RESERVOIR_CAPACITY {
            samples.pop_front();
        }
        samples.push_back(sample_ms);
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Computes the `p`-th percentile (0..=100) by sorting a snapshot
    /// and interpolating linearly between adjacent ranks (spec §4.8:
    /// `idx = p/100 * (n-1)`, `v[floor(idx)]*(1-w) + v[ceil(idx)]*w`).
    ///
    /// Returns `0.0` for an empty reservoir.
    pub fn percentile(&self, p: f64) -> f64 {
        let mut sorted: Vec<i64> = self.samples.lock().iter().copied().collect();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_unstable();
        percentile_of_sorted(&sorted, p)
    }

    pub fn p50(&self) -> f64 {
        self.percentile(50.0)
    }

    pub fn p95(&self) -> f64 {
        self.percentile(95.0)
    }

    pub fn p99(&self) -> f64 {
        self.percentile(99.0)
    }
}

fn percentile_of_sorted(sorted: &[i64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0] as f64;
    }
    let idx = (p / 100.0) * (n - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    let weight = idx - lo as f64;
    let lo_v = sorted[lo] as f64;
    let hi_v = sorted[hi.min(n - 1)] as f64;
    lo_v * (1.0 - weight) + hi_v * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let reservoir = LatencyReservoir::new();
        for v in 1..=100 {
            reservoir.record(v);
        }
        // idx for p50 over 100 samples (n=100): 0.5 * 99 = 49.5 -> interpolate v[49],v[50] = 50,51 -> 50.5
        assert!((reservoir.p50() - 50.5).abs() < 1e-9);
    }

    #[test]
    fn empty_reservoir_percentile_is_zero() {
        let reservoir = LatencyReservoir::new();
        assert_eq!(reservoir.percentile(50.0), 0.0);
    }

    #[test]
    fn oldest_sample_drops_on_overflow() {
        let reservoir = LatencyReservoir::new();
        for v in 0..(RESERVOIR_CAPACITY as i64 + 10) {
            reservoir.record(v);
        }
        assert_eq!(reservoir.len(), RESERVOIR_CAPACITY);
        // The oldest 10 samples (0..10) should have been evicted.
        assert_eq!(reservoir.percentile(0.0), 10.0);
    }
}
