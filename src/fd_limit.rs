//! Raise `RLIMIT_NOFILE` headroom around phases that open many run or
//! shard files at once (chiefly the k-way merger), and restore it
//! afterwards.

use anyhow::Context;
use rlimit::{getrlimit, setrlimit, Resource};

/// A saved soft/hard `RLIMIT_NOFILE` pair, restored on drop's caller via
/// [`restore`]. Not a guard type on purpose, callers need the restore to
/// happen after a fallible phase whether that phase succeeded or not, which
/// reads more plainly as an explicit call at the end of a `Result`-returning
/// function than as a `Drop` impl racing a `?`.
#[derive(Clone, Copy, Debug)]
pub struct Headroom {
    soft: u64,
    hard: u64,
}

/// Raise the soft limit to at least `min_files` (never above the hard
/// limit), returning the previous limits so they can be restored with
/// [`restore`].
pub fn raise(min_files: u64) -> Result<Headroom, anyhow::Error> {
    let (soft, hard) = getrlimit(Resource::NOFILE).context("getrlimit NOFILE")?;
    log::info!("current rlimit NOFILE, soft: {}, hard: {}", soft, hard);
    let new_soft = min_files.max(soft).min(hard);
    log::info!("raising rlimit NOFILE, soft: {}, hard: {}", new_soft, hard);
    setrlimit(Resource::NOFILE, new_soft, hard)
        .with_context(|| format!("setrlimit NOFILE, soft: {}, hard: {}", new_soft, hard))?;
    Ok(Headroom { soft, hard })
}

/// Restore the limits returned by a prior [`raise`].
pub fn restore(headroom: Headroom) -> Result<(), anyhow::Error> {
    log::info!(
        "restoring rlimit NOFILE, soft: {}, hard: {}",
        headroom.soft,
        headroom.hard
    );
    setrlimit(Resource::NOFILE, headroom.soft, headroom.hard).with_context(|| {
        format!(
            "setrlimit NOFILE, soft: {}, hard: {}",
            headroom.soft, headroom.hard
        )
    })?;
    Ok(())
}
