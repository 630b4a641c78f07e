//! Host capacity detection for the payload placement pool.

/// Number of logical CPU cores.
fn detect_cpu_cores() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1)
}

/// One-minute load average, or 0 where the platform cannot report it.
fn load_average_1m() -> f64 {
    let mut loads = [0f64; 3];
    // SAFETY: getloadavg writes at most the requested number of samples
    // into the provided buffer.
    let written = unsafe { libc::getloadavg(loads.as_mut_ptr(), 1) };
    if written >= 1 { loads[0] } else { 0.0 }
}

/// Worker count for payload placement: the idle share of the CPUs,
/// at least one worker, capped at 32.
pub fn placement_workers() -> usize {
    let cores = detect_cpu_cores();
    let busy = load_average_1m().round() as usize;
    cores.saturating_sub(busy).clamp(1, 32)
}
