//! Headerless binary images.
//!
//! ROM dumps and memory snapshots carry no segment headers. The whole
//! buffer becomes a single segment at the address the caller names. The
//! end address wraps at 64K like the CPU's program counter does.

use tracing::debug;

use crate::types::{LoadReport, Segment};

/// Treat `data` as one segment loaded at `base`.
pub fn load(data: &[u8], base: u16) -> LoadReport {
    let mut report = LoadReport::default();
    if data.is_empty() {
        return report;
    }

    let end = base.wrapping_add((data.len() - 1) as u16);
    debug!(base, end, len = data.len(), "raw image");
    report.segments.push(Segment {
        start: base,
        end,
        bytes: data.to_vec(),
    });
    report
}
