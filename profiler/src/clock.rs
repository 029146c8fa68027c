use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

fn epoch() -> Instant {
    *EPOCH.get_or_init(Instant::now)
}

/// Monotonic seconds since the first timestamp taken in this process.
/// All hook timestamps come from here, so `end_time >= start_time` holds
/// without any validation on the recording path.
pub fn now_secs() -> f64 {
    epoch().elapsed().as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_never_go_backwards() {
        let t1 = now_secs();
        let t2 = now_secs();
        assert!(t2 >= t1);
        assert!(t1 >= 0.0);
    }
}
