//! Timestamp comparisons.
//!
//! An input counts as newer when it was modified at or after its output, so
//! two writes within one timestamp tick still trigger a rebuild. A missing
//! output is always out of date; a missing input never makes anything stale.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Modification time, or `None` if the path cannot be inspected.
pub fn modified(path: &Path) -> Option<SystemTime> {
  fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Returns true if `input` was modified at or after `output_time`.
pub fn is_newer(input: &Path, output_time: SystemTime) -> bool {
  modified(input).is_some_and(|time| time >= output_time)
}

/// Returns true if `output` is missing or any input is newer.
pub fn outdated<I, P>(output: &Path, inputs: I) -> bool
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  match modified(output) {
    Some(time) => inputs.into_iter().any(|input| is_newer(input.as_ref(), time)),
    None => true,
  }
}
