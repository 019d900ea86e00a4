//! Rendering a `ScanResult` as text or JSON, and choosing the exit code.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use codehash_core::{Address, BlockHeight, CodeFingerprint, Sample, ScanResult, Segment};

/// Scan completed, code did not change.
pub const EXIT_STABLE: i32 = 0;
/// Fatal error before or during startup.
pub const EXIT_FATAL: i32 = 1;
/// Scan completed, code changed.
pub const EXIT_CHANGED: i32 = 2;

/// How a completed scan should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The range produced no heights.
    NoSamples,
    /// Every lookup failed; nothing was observed.
    Inconclusive,
    /// One known fingerprint, some lookups failed.
    StableWithGaps,
    /// One known fingerprint, every lookup succeeded.
    Stable,
    /// More than one known fingerprint.
    Changed,
}

impl ScanStatus {
    pub fn of(result: &ScanResult) -> Self {
        if result.is_empty() {
            Self::NoSamples
        } else if result.changed {
            Self::Changed
        } else if result.all_unknown() {
            Self::Inconclusive
        } else if result.has_failures() {
            Self::StableWithGaps
        } else {
            Self::Stable
        }
    }
}

/// Process exit status for a completed scan.
pub fn exit_code(result: &ScanResult) -> i32 {
    if result.changed {
        EXIT_CHANGED
    } else {
        EXIT_STABLE
    }
}

/// Everything shown about one run.
#[derive(Debug)]
pub struct Report<'a> {
    pub rpc: &'a str,
    pub chain_id: Option<u64>,
    pub address: Address,
    pub from_block: BlockHeight,
    pub to_block: BlockHeight,
    pub step: u64,
    pub result: &'a ScanResult,
    pub elapsed: Duration,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    rpc: &'a str,
    chain_id: Option<u64>,
    address: Address,
    from_block: BlockHeight,
    to_block: BlockHeight,
    step: u64,
    samples: &'a [Sample],
    segments: &'a [Segment],
    change_points: Vec<Sample>,
    unique_fingerprints: Vec<CodeFingerprint>,
    changed: bool,
    failed_lookups: &'a [BlockHeight],
    status: ScanStatus,
    elapsed_seconds: f64,
}

/// Pretty-printed JSON for CI consumption.
pub fn render_json(report: &Report<'_>) -> Result<String, serde_json::Error> {
    let result = report.result;
    let out = JsonReport {
        rpc: report.rpc,
        chain_id: report.chain_id,
        address: report.address,
        from_block: report.from_block,
        to_block: report.to_block,
        step: report.step,
        samples: &result.samples,
        segments: &result.segments,
        change_points: result.change_points(),
        unique_fingerprints: result.unique_fingerprints(),
        changed: result.changed,
        failed_lookups: &result.failed_lookups,
        status: ScanStatus::of(result),
        elapsed_seconds: (report.elapsed.as_secs_f64() * 100.0).round() / 100.0,
    };
    serde_json::to_string_pretty(&out)
}

/// Human-readable report.
///
/// With `only_changes`, one line per segment instead of one per sample.
pub fn render_text(report: &Report<'_>, only_changes: bool) -> String {
    TextReport {
        report,
        only_changes,
    }
    .to_string()
}

struct TextReport<'r, 'a> {
    report: &'r Report<'a>,
    only_changes: bool,
}

impl fmt::Display for TextReport<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let result = report.result;

        writeln!(f, "codehash-timeline")?;
        match report.chain_id {
            Some(id) => writeln!(f, "  Chain ID: {id}")?,
            None => writeln!(f, "  Chain ID: (unavailable)")?,
        }
        writeln!(f, "  RPC:      {}", report.rpc)?;
        writeln!(f, "  Address:  {}", report.address)?;
        writeln!(
            f,
            "  Range:    {} → {} (step={})",
            report.from_block, report.to_block, report.step
        )?;
        writeln!(f)?;

        if result.is_empty() {
            writeln!(f, "No samples taken: the range contains no blocks to probe.")?;
        } else if self.only_changes {
            writeln!(f, "Change points:")?;
            for segment in &result.segments {
                writeln!(f, "  {}", segment_line(segment))?;
            }
        } else {
            writeln!(f, "Timeline:")?;
            for sample in &result.samples {
                writeln!(f, "  #{}: {}", sample.block, sample.fingerprint)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "{}", summary(result))?;
        if result.has_failures() {
            let heights: Vec<String> = result.failed_lookups.iter().map(u64::to_string).collect();
            writeln!(
                f,
                "  Failed lookups: {} of {} ({})",
                result.failed_lookups.len(),
                result.samples.len(),
                heights.join(", ")
            )?;
        }
        writeln!(f, "  Completed in {:.2}s", report.elapsed.as_secs_f64())
    }
}

fn segment_line(segment: &Segment) -> String {
    let span = if segment.first_block == segment.last_block {
        format!("#{}", segment.first_block)
    } else {
        format!("#{}..#{}", segment.first_block, segment.last_block)
    };
    let plural = if segment.samples == 1 { "" } else { "s" };
    format!("{span}: {} ({} sample{plural})", segment.fingerprint, segment.samples)
}

fn summary(result: &ScanResult) -> String {
    let distinct = result.unique_fingerprints().len();
    match ScanStatus::of(result) {
        ScanStatus::NoSamples => "No samples taken; nothing to compare.".into(),
        ScanStatus::Changed => format!(
            "Detected code hash changes over the scanned range ({distinct} distinct fingerprints)."
        ),
        ScanStatus::Stable => "No code hash change detected in the scanned samples.".into(),
        ScanStatus::StableWithGaps => format!(
            "No code hash change detected in the samples that could be read; {} of {} lookups failed.",
            result.failed_lookups.len(),
            result.samples.len()
        ),
        ScanStatus::Inconclusive => format!(
            "Inconclusive: all {} lookups failed, no code was observed.",
            result.samples.len()
        ),
    }
}
