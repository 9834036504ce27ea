//! Sampling ranges for the volume download scripts.
//!
//! Produces `[0,100,200,...]` style lists used to fetch every nth volume of a
//! scroll, e.g. to build a representative sample for masking.

use anyhow::Result;

/// Z-axis length of scroll 2
pub const DEFAULT_LENGTH: u64 = 14427;
pub const DEFAULT_STEP: u64 = 100;

/// Values `start, start + step, ...` strictly below `length`
pub fn sampling_range(start: u64, length: u64, step: u64) -> Result<Vec<u64>> {
    if step == 0 {
        return Err(anyhow::anyhow!("Step must be greater than 0"));
    }
    Ok((start..length).step_by(step as usize).collect())
}

/// Render values as `[a,b,c]` with no spaces
pub fn format_range(values: &[u64]) -> String {
    let joined = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", joined)
}
