pub mod db;

/// Watch-time completion threshold: a lecture counts as completed once 95% of
/// its duration has been watched.
pub const COMPLETION_THRESHOLD: f64 = 0.95;

/// Derived on every save from the reported watch time; never set by clients.
pub fn is_completed(watch_time: f64, duration: f64) -> bool {
    watch_time >= duration * COMPLETION_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_threshold_at_95_percent() {
        assert!(!is_completed(94.9, 100.0));
        assert!(is_completed(95.0, 100.0));
        assert!(is_completed(100.0, 100.0));
    }

    #[test]
    fn partial_watch_is_not_completed() {
        assert!(!is_completed(10.0, 600.0));
    }
}
