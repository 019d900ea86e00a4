//! Timeline folding: the `Scanning → Completed` state machine.
//!
//! Samples are pushed in strictly increasing block order. Each push either
//! extends the current segment (same fingerprint value) or opens a new one.
//! Consecutive `Unknown` samples coalesce like any other value but never
//! count towards `changed`.

use crate::error::ScanError;
use crate::fingerprint::CodeFingerprint;
use crate::types::{BlockHeight, Sample, ScanResult, Segment};

/// Builder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    /// Accepting samples.
    Scanning,
    /// `finish` was called; no more samples accepted.
    Completed,
}

/// Accumulates samples into segments.
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    state: TimelineState,
    samples: Vec<Sample>,
    segments: Vec<Segment>,
    failed_lookups: Vec<BlockHeight>,
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-size the sample buffer for a scan of `n` heights.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            state: TimelineState::Scanning,
            samples: Vec::with_capacity(n),
            segments: Vec::new(),
            failed_lookups: Vec::new(),
        }
    }

    /// Fold an already-ordered sample list in one go.
    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Result<ScanResult, ScanError> {
        let mut builder = Self::new();
        for sample in samples {
            builder.push(sample)?;
        }
        builder.finish()
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Samples accepted so far.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append the next sample.
    ///
    /// Fails if the builder is completed or `sample.block` does not exceed
    /// the previous sample's height.
    pub fn push(&mut self, sample: Sample) -> Result<(), ScanError> {
        if self.state == TimelineState::Completed {
            return Err(ScanError::AlreadyCompleted);
        }
        if let Some(last) = self.samples.last() {
            if sample.block <= last.block {
                return Err(ScanError::OutOfOrder {
                    block: sample.block,
                    last: last.block,
                });
            }
        }

        if sample.fingerprint == CodeFingerprint::Unknown {
            self.failed_lookups.push(sample.block);
        }
        match self.segments.last_mut() {
            Some(current) if current.fingerprint == sample.fingerprint => current.extend(&sample),
            _ => self.segments.push(Segment::start(&sample)),
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Transition to `Completed` and produce the result.
    pub fn finish(&mut self) -> Result<ScanResult, ScanError> {
        if self.state == TimelineState::Completed {
            return Err(ScanError::AlreadyCompleted);
        }
        self.state = TimelineState::Completed;

        let changed = has_changed(&self.segments);
        tracing::debug!(
            samples = self.samples.len(),
            segments = self.segments.len(),
            failed = self.failed_lookups.len(),
            changed,
            "timeline completed"
        );
        Ok(ScanResult {
            samples: std::mem::take(&mut self.samples),
            segments: std::mem::take(&mut self.segments),
            changed,
            failed_lookups: std::mem::take(&mut self.failed_lookups),
        })
    }
}

/// More than one distinct known fingerprint across the segments.
fn has_changed(segments: &[Segment]) -> bool {
    let mut first_known: Option<CodeFingerprint> = None;
    for fp in segments.iter().map(|s| s.fingerprint).filter(|f| f.is_known()) {
        match first_known {
            None => first_known = Some(fp),
            Some(first) if first != fp => return true,
            Some(_) => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;

    fn h(tag: &str) -> CodeFingerprint {
        fingerprint(Some(tag.as_bytes()))
    }

    fn samples(entries: &[(u64, CodeFingerprint)]) -> Vec<Sample> {
        entries.iter().map(|(b, f)| Sample::new(*b, *f)).collect()
    }

    #[test]
    fn empty_timeline() {
        let mut b = TimelineBuilder::new();
        assert_eq!(b.state(), TimelineState::Scanning);
        let r = b.finish().unwrap();
        assert_eq!(b.state(), TimelineState::Completed);
        assert!(r.is_empty());
        assert!(r.segments.is_empty());
        assert!(!r.changed);
    }

    #[test]
    fn constant_code_single_segment() {
        let r = TimelineBuilder::from_samples(samples(&[(100, h("a")), (200, h("a")), (300, h("a"))]))
            .unwrap();
        assert_eq!(r.segments.len(), 1);
        assert_eq!(r.segments[0].first_block, 100);
        assert_eq!(r.segments[0].last_block, 300);
        assert_eq!(r.segments[0].samples, 3);
        assert!(!r.changed);
    }

    #[test]
    fn upgrade_detected() {
        let r = TimelineBuilder::from_samples(samples(&[
            (100, h("v1")),
            (200, h("v1")),
            (300, h("v2")),
            (400, h("v2")),
        ]))
        .unwrap();
        assert_eq!(r.segments.len(), 2);
        assert!(r.changed);
    }

    #[test]
    fn deployment_counts_as_change() {
        let r = TimelineBuilder::from_samples(samples(&[
            (100, CodeFingerprint::NoCode),
            (200, h("v1")),
        ]))
        .unwrap();
        assert!(r.changed);
    }

    #[test]
    fn unknown_splits_but_does_not_change() {
        let r = TimelineBuilder::from_samples(samples(&[
            (100, h("a")),
            (200, CodeFingerprint::Unknown),
            (300, h("a")),
        ]))
        .unwrap();
        assert_eq!(r.segments.len(), 3);
        assert_eq!(r.segments[1].fingerprint, CodeFingerprint::Unknown);
        assert!(!r.changed);
        assert_eq!(r.failed_lookups, vec![200]);
    }

    #[test]
    fn consecutive_unknowns_coalesce() {
        let r = TimelineBuilder::from_samples(samples(&[
            (1, CodeFingerprint::Unknown),
            (2, CodeFingerprint::Unknown),
            (3, CodeFingerprint::Unknown),
        ]))
        .unwrap();
        assert_eq!(r.segments.len(), 1);
        assert_eq!(r.segments[0].samples, 3);
        assert!(!r.changed);
        assert_eq!(r.failed_lookups, vec![1, 2, 3]);
    }

    #[test]
    fn rejects_out_of_order_and_duplicates() {
        let mut b = TimelineBuilder::new();
        b.push(Sample::new(200, h("a"))).unwrap();
        assert!(matches!(
            b.push(Sample::new(100, h("a"))),
            Err(ScanError::OutOfOrder { block: 100, last: 200 })
        ));
        assert!(b.push(Sample::new(200, h("a"))).is_err());
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn rejects_push_after_finish() {
        let mut b = TimelineBuilder::new();
        b.finish().unwrap();
        assert_eq!(b.push(Sample::new(1, h("a"))), Err(ScanError::AlreadyCompleted));
        assert!(b.finish().is_err());
    }

    #[test]
    fn segments_partition_samples() {
        let input = samples(&[
            (1, h("a")),
            (2, h("a")),
            (3, CodeFingerprint::Unknown),
            (4, CodeFingerprint::NoCode),
            (5, CodeFingerprint::NoCode),
            (6, h("b")),
            (7, h("a")),
        ]);
        let built = TimelineBuilder::from_samples(input.clone()).unwrap();
        let segments = &built.segments;
        let expanded: Vec<CodeFingerprint> = segments
            .iter()
            .flat_map(|s| std::iter::repeat(s.fingerprint).take(s.samples))
            .collect();
        let original: Vec<CodeFingerprint> = input.iter().map(|s| s.fingerprint).collect();
        assert_eq!(expanded, original);
        assert!(segments.windows(2).all(|w| w[0].fingerprint != w[1].fingerprint));
        assert!(segments.windows(2).all(|w| w[0].last_block < w[1].first_block));
        assert_eq!(segments.first().map(|s| s.first_block), Some(1));
        assert_eq!(segments.last().map(|s| s.last_block), Some(7));
        assert_eq!(built.samples, input);
    }
}
