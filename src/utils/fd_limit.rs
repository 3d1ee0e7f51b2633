//! File descriptor limit detection for capping concurrent analyzer processes (Unix).

/// Estimated descriptors held per live analyzer (stderr pipe, spawn-time pipes, reaper slack).
pub const FDS_PER_ANALYZER: usize = 4;

/// Fraction of the process FD limit to use (leave headroom for other code).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur as u64)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Largest concurrency ceiling that stays under ~80% of the FD limit.
/// Returns `None` if no limit is available (use caller's value).
pub fn max_concurrency_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    if usable < FDS_PER_ANALYZER {
        return Some(1);
    }
    Some(usable / FDS_PER_ANALYZER)
}

/// Cap `requested` by the FD limit, logging when it is lowered.
pub fn cap_concurrency(requested: usize) -> usize {
    match max_concurrency_by_fd_limit() {
        Some(fd_cap) if fd_cap < requested => {
            log::debug!(
                "Capping concurrency {} -> {} (FD limit ~80%)",
                requested,
                fd_cap
            );
            fd_cap
        }
        _ => requested,
    }
}
