//! Shared types for the scan pipeline.

use serde::Serialize;

use crate::fingerprint::CodeFingerprint;

/// A block number. Never negative; strictly increasing within a scan.
pub type BlockHeight = u64;

// ─── Sample ───────────────────────────────────────────────────────────────────

/// The fingerprint observed at one sampled height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub block: BlockHeight,
    pub fingerprint: CodeFingerprint,
}

impl Sample {
    pub fn new(block: BlockHeight, fingerprint: CodeFingerprint) -> Self {
        Self { block, fingerprint }
    }
}

// ─── Segment ──────────────────────────────────────────────────────────────────

/// A maximal run of consecutive samples sharing one fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub fingerprint: CodeFingerprint,
    /// Height of the first sample in the run.
    pub first_block: BlockHeight,
    /// Height of the last sample in the run.
    pub last_block: BlockHeight,
    /// Number of samples folded into this segment.
    pub samples: usize,
}

impl Segment {
    pub(crate) fn start(sample: &Sample) -> Self {
        Self {
            fingerprint: sample.fingerprint,
            first_block: sample.block,
            last_block: sample.block,
            samples: 1,
        }
    }

    pub(crate) fn extend(&mut self, sample: &Sample) {
        self.last_block = sample.block;
        self.samples += 1;
    }
}

// ─── ScanResult ───────────────────────────────────────────────────────────────

/// Everything the core hands to a reporter once a scan completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Every sample, in increasing block order.
    pub samples: Vec<Sample>,
    /// The de-duplicated timeline.
    pub segments: Vec<Segment>,
    /// `true` iff more than one distinct known fingerprint was observed.
    pub changed: bool,
    /// Heights whose lookup failed, in increasing order.
    pub failed_lookups: Vec<BlockHeight>,
}

impl ScanResult {
    /// Returns `true` if no heights were sampled at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns `true` if any lookup failed.
    pub fn has_failures(&self) -> bool {
        !self.failed_lookups.is_empty()
    }

    /// Returns `true` if every sample's lookup failed.
    pub fn all_unknown(&self) -> bool {
        !self.is_empty() && self.failed_lookups.len() == self.samples.len()
    }

    /// Distinct known fingerprints in order of first appearance.
    pub fn unique_fingerprints(&self) -> Vec<CodeFingerprint> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if segment.fingerprint.is_known() && !seen.contains(&segment.fingerprint) {
                seen.push(segment.fingerprint);
            }
        }
        seen
    }

    /// The first sample of each segment: where the code was first seen and
    /// every height at which it differed from the previous sample.
    pub fn change_points(&self) -> Vec<Sample> {
        self.segments
            .iter()
            .map(|s| Sample::new(s.first_block, s.fingerprint))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;

    fn result(samples: Vec<Sample>) -> ScanResult {
        crate::timeline::TimelineBuilder::from_samples(samples).unwrap()
    }

    #[test]
    fn unique_fingerprints_skip_unknown_and_repeat() {
        let h1 = fingerprint(Some(&b"one"[..]));
        let h2 = fingerprint(Some(&b"two"[..]));
        let r = result(vec![
            Sample::new(1, h1),
            Sample::new(2, CodeFingerprint::Unknown),
            Sample::new(3, h2),
            Sample::new(4, h1),
        ]);
        assert_eq!(r.unique_fingerprints(), vec![h1, h2]);
        assert_eq!(r.segments.len(), 4);
    }

    #[test]
    fn change_points_follow_segments() {
        let h1 = fingerprint(Some(&b"one"[..]));
        let r = result(vec![
            Sample::new(10, CodeFingerprint::NoCode),
            Sample::new(20, h1),
            Sample::new(30, h1),
        ]);
        assert_eq!(
            r.change_points(),
            vec![
                Sample::new(10, CodeFingerprint::NoCode),
                Sample::new(20, h1)
            ]
        );
    }

    #[test]
    fn all_unknown_detection() {
        let r = result(vec![
            Sample::new(1, CodeFingerprint::Unknown),
            Sample::new(2, CodeFingerprint::Unknown),
        ]);
        assert!(r.all_unknown());
        assert!(r.has_failures());
        assert!(!result(vec![]).all_unknown());
    }
}
