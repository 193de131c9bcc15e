// =============================================================================
// Dump Discovery — which files belong to this run
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tracing::{debug, warn};

const DUMP_EXTENSION: &str = "txt";

/// List `*.txt` dumps in `dir` modified within `window_hours` of `now`,
/// sorted by path.
///
/// A missing directory is not an error: it yields an empty list so the
/// caller can report "no input" and exit cleanly.
pub fn find_dumps(
    dir: impl AsRef<Path>,
    window_hours: f64,
    now: SystemTime,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "input directory not found");
        return Ok(Vec::new());
    }

    let window = Duration::from_secs_f64(window_hours.max(0.0) * 3600.0);
    let cutoff = now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list input directory {}", dir.display()))?;

    let mut dumps = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "unreadable directory entry skipped");
                continue;
            }
        };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(DUMP_EXTENSION) {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified());
        match modified {
            Ok(t) if t >= cutoff => dumps.push(path),
            Ok(_) => debug!(path = %path.display(), "dump outside window"),
            Err(e) => warn!(path = %path.display(), error = %e, "dump metadata unreadable"),
        }
    }

    dumps.sort();
    Ok(dumps)
}
