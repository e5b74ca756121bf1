//! Scripted movement intent for the headless client

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::InputIntent;
use std::time::{Duration, Instant};

/// The eight compass headings plus standing still, as (up, down, left, right)
const HEADINGS: [(bool, bool, bool, bool); 9] = [
    (false, false, false, false),
    (true, false, false, false),
    (false, true, false, false),
    (false, false, true, false),
    (false, false, false, true),
    (true, false, true, false),
    (true, false, false, true),
    (false, true, true, false),
    (false, true, false, true),
];

/// Wanders by picking a new random heading at a fixed interval
pub struct InputManager {
    current: InputIntent,
    speed: Option<f32>,
    change_every: Duration,
    last_change: Option<Instant>,
    rng: StdRng,
}

impl InputManager {
    pub fn new(speed: Option<f32>, change_every: Duration) -> Self {
        Self::with_rng(speed, change_every, StdRng::from_entropy())
    }

    pub fn with_seed(speed: Option<f32>, change_every: Duration, seed: u64) -> Self {
        Self::with_rng(speed, change_every, StdRng::seed_from_u64(seed))
    }

    fn with_rng(speed: Option<f32>, change_every: Duration, rng: StdRng) -> Self {
        Self {
            current: InputIntent {
                speed,
                ..InputIntent::default()
            },
            speed,
            change_every,
            last_change: None,
            rng,
        }
    }

    /// Intent to send at `now`. The whole intent is resent every time, since the
    /// server keeps only the latest one.
    pub fn update(&mut self, now: Instant) -> InputIntent {
        let due = match self.last_change {
            Some(last) => now.duration_since(last) >= self.change_every,
            None => true,
        };

        if due {
            let (up, down, left, right) = HEADINGS[self.rng.gen_range(0..HEADINGS.len())];
            self.current = InputIntent {
                up,
                down,
                left,
                right,
                speed: self.speed,
            };
            self.last_change = Some(now);
        }

        self.current
    }

    /// Returns the current input state
    pub fn current(&self) -> &InputIntent {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_holds_between_changes() {
        let mut manager = InputManager::with_seed(Some(220.0), Duration::from_secs(2), 5);
        let start = Instant::now();

        let first = manager.update(start);
        for ms in [50, 500, 1999] {
            assert_eq!(manager.update(start + Duration::from_millis(ms)), first);
        }
        assert_eq!(first.speed, Some(220.0));
    }

    #[test]
    fn test_heading_changes_are_valid() {
        let mut manager = InputManager::with_seed(None, Duration::from_millis(1), 9);
        let start = Instant::now();

        for step in 0..200 {
            let intent = manager.update(start + Duration::from_millis(step * 2));
            assert!(!(intent.up && intent.down));
            assert!(!(intent.left && intent.right));
            assert_eq!(intent.speed, None);
        }
        let latest = manager.update(start + Duration::from_millis(398));
        let current = *manager.current();
        assert_eq!(current, latest);
    }
}
