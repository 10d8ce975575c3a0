use std::time::Duration;

/// Spreads stepwise work over frames.
///
/// The host loop hands each frame's elapsed time to [`Pacer::poll`] as a
/// budget. A step may run once the delay owed by the previous step has been
/// paid from that budget; [`Pacer::suspend`] starts the next delay.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    owed: Duration,
}

impl Pacer {
    /// The first step is due immediately
    pub fn new(delay: Duration) -> Self {
        Pacer {
            delay,
            owed: Duration::ZERO,
        }
    }

    /// Takes effect from the next suspension
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Pay what is owed from `budget`; true if the next step may run now
    pub fn poll(&mut self, budget: &mut Duration) -> bool {
        if *budget >= self.owed {
            *budget -= self.owed;
            self.owed = Duration::ZERO;
            true
        } else {
            self.owed -= *budget;
            *budget = Duration::ZERO;
            false
        }
    }

    /// Call after each step
    pub fn suspend(&mut self) {
        self.owed = self.delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_is_immediate() {
        let mut pacer = Pacer::new(Duration::from_millis(50));
        let mut budget = Duration::ZERO;

        assert!(pacer.poll(&mut budget));
    }

    #[test]
    fn test_delay_accumulates_across_frames() {
        let mut pacer = Pacer::new(Duration::from_millis(50));
        let mut budget = Duration::ZERO;
        assert!(pacer.poll(&mut budget));
        pacer.suspend();

        let mut frame = Duration::from_millis(30);
        assert!(!pacer.poll(&mut frame));
        assert_eq!(frame, Duration::ZERO);

        let mut frame = Duration::from_millis(30);
        assert!(pacer.poll(&mut frame));
        assert_eq!(frame, Duration::from_millis(10));
    }

    #[test]
    fn test_set_delay_applies_to_next_suspension() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        pacer.set_delay(Duration::from_millis(10));
        pacer.suspend();

        let mut frame = Duration::from_millis(10);
        assert!(pacer.poll(&mut frame));
        assert_eq!(frame, Duration::ZERO);
    }
}
