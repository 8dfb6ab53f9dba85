//! Single-fire latch for handlers that must run at most once.

use std::sync::atomic::{AtomicBool, Ordering};

/// Armed until the first successful [`OneShot::fire`], then permanently
/// disarmed.
#[derive(Debug, Default)]
pub struct OneShot {
    fired: AtomicBool,
}

impl OneShot {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Returns `true` exactly once: on the first call.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    pub fn is_armed(&self) -> bool {
        !self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fires_once() {
        let once = OneShot::new();
        assert!(once.is_armed());
        assert!(once.fire());
        assert!(!once.fire());
        assert!(!once.is_armed());
    }

    #[test]
    fn only_one_thread_wins() {
        let once = Arc::new(OneShot::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let once = Arc::clone(&once);
                std::thread::spawn(move || once.fire())
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
