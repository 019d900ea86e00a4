//! Block-height sampling.
//!
//! [`Sampler`] yields `from, from + step, from + 2·step, …` up to the last
//! value `<= to`. The stride alone does not guarantee that `to` is probed;
//! [`Sampler::with_end`] appends it as a forced final sample.

use crate::error::ScanError;
use crate::types::BlockHeight;

/// Validated sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    from: BlockHeight,
    to: BlockHeight,
    step: u64,
    include_end: bool,
}

impl Sampler {
    /// Validate raw parameters.
    ///
    /// `from > to` is valid and produces no heights.
    pub fn new(from: i64, to: i64, step: i64) -> Result<Self, ScanError> {
        if from < 0 {
            return Err(ScanError::range(format!("from-block must be >= 0 (got {from})")));
        }
        if to < 0 {
            return Err(ScanError::range(format!("to-block must be >= 0 (got {to})")));
        }
        if step <= 0 {
            return Err(ScanError::range(format!("step must be positive (got {step})")));
        }
        Ok(Self {
            from: from as u64,
            to: to as u64,
            step: step as u64,
            include_end: false,
        })
    }

    /// Always probe `to` as the final height, even off-stride.
    pub fn with_end(mut self, include_end: bool) -> Self {
        self.include_end = include_end;
        self
    }

    pub fn from_block(&self) -> BlockHeight {
        self.from
    }

    pub fn to_block(&self) -> BlockHeight {
        self.to
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of heights [`heights`](Self::heights) will yield.
    pub fn sample_count(&self) -> u64 {
        if self.from > self.to {
            return 0;
        }
        let span = self.to - self.from;
        let strided = span / self.step + 1;
        if self.include_end && span % self.step != 0 {
            strided + 1
        } else {
            strided
        }
    }

    /// A fresh iterator over the heights to probe.
    pub fn heights(&self) -> Heights {
        Heights {
            next: (self.from <= self.to).then_some(self.from),
            to: self.to,
            step: self.step,
            include_end: self.include_end,
            tail: None,
        }
    }
}

/// Strided heights from `from` to `to`, without the forced end sample.
pub fn generate(from: i64, to: i64, step: i64) -> Result<Heights, ScanError> {
    Ok(Sampler::new(from, to, step)?.heights())
}

/// Lazy, finite iterator over sampled heights.
#[derive(Debug, Clone)]
pub struct Heights {
    next: Option<BlockHeight>,
    to: BlockHeight,
    step: u64,
    include_end: bool,
    tail: Option<BlockHeight>,
}

impl Iterator for Heights {
    type Item = BlockHeight;

    fn next(&mut self) -> Option<BlockHeight> {
        let Some(current) = self.next else {
            return self.tail.take();
        };
        self.next = current.checked_add(self.step).filter(|n| *n <= self.to);
        if self.next.is_none() && self.include_end && current < self.to {
            self.tail = Some(self.to);
        }
        Some(current)
    }
}

impl std::iter::FusedIterator for Heights {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(from: i64, to: i64, step: i64) -> Vec<u64> {
        generate(from, to, step).unwrap().collect()
    }

    #[test]
    fn exact_multiple() {
        assert_eq!(collect(100, 300, 100), vec![100, 200, 300]);
    }

    #[test]
    fn stride_stops_below_end() {
        assert_eq!(collect(100, 350, 100), vec![100, 200, 300]);
    }

    #[test]
    fn forced_end_appended() {
        let s = Sampler::new(100, 350, 100).unwrap().with_end(true);
        assert_eq!(s.heights().collect::<Vec<_>>(), vec![100, 200, 300, 350]);
        assert_eq!(s.sample_count(), 4);
    }

    #[test]
    fn forced_end_not_duplicated() {
        let s = Sampler::new(100, 300, 100).unwrap().with_end(true);
        assert_eq!(s.heights().collect::<Vec<_>>(), vec![100, 200, 300]);
        assert_eq!(s.sample_count(), 3);
    }

    #[test]
    fn single_height_range() {
        assert_eq!(collect(42, 42, 500), vec![42]);
        let s = Sampler::new(42, 42, 500).unwrap().with_end(true);
        assert_eq!(s.heights().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(collect(500, 100, 100).is_empty());
        let s = Sampler::new(500, 100, 100).unwrap().with_end(true);
        assert_eq!(s.heights().count(), 0);
        assert_eq!(s.sample_count(), 0);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(generate(-1, 10, 1), Err(ScanError::InvalidRange { .. })));
        assert!(matches!(generate(0, -10, 1), Err(ScanError::InvalidRange { .. })));
        assert!(matches!(generate(0, 10, 0), Err(ScanError::InvalidRange { .. })));
        assert!(matches!(generate(0, 10, -5), Err(ScanError::InvalidRange { .. })));
    }

    #[test]
    fn length_matches_formula() {
        for (from, to, step) in [(0i64, 0i64, 1i64), (0, 9, 3), (7, 1000, 13), (5, 6, 10), (1, 1_000_000, 999)] {
            let heights = collect(from, to, step);
            let expected = ((to - from) / step + 1) as usize;
            assert_eq!(heights.len(), expected, "({from}, {to}, {step})");
            assert!(heights.windows(2).all(|w| w[0] < w[1]));
            assert!(heights.iter().all(|h| *h >= from as u64 && *h <= to as u64));
            let s = Sampler::new(from, to, step).unwrap();
            assert_eq!(s.sample_count(), expected as u64);
        }
    }

    #[test]
    fn restartable() {
        let s = Sampler::new(0, 1000, 250).unwrap();
        let a: Vec<_> = s.heights().collect();
        let b: Vec<_> = s.heights().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn forced_end_at_large_heights() {
        let s = Sampler::new(i64::MAX - 5, i64::MAX, 4).unwrap().with_end(true);
        let max = i64::MAX as u64;
        assert_eq!(s.heights().collect::<Vec<_>>(), vec![max - 5, max - 1, max]);
    }
}
