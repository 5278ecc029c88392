use std::time::{Duration, Instant};

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Timer {
    pub total_time: Duration,
    pub curr: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self { total_time: Duration::ZERO, curr: Instant::now() }
    }
}

impl Timer {
    /// Creates a timer that is already running.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn start(&mut self) {
        self.curr = Instant::now();
    }

    #[inline(always)]
    pub fn stop(&mut self) -> Duration {
        let diff = self.curr.elapsed();
        self.total_time += diff;
        diff
    }
}

#[test]
fn test_timer() {
    use std::thread;

    let mut timer = Timer::new();

    thread::sleep(Duration::from_millis(20));

    timer.stop();

    assert!(timer.total_time >= Duration::from_millis(20));
}

#[test]
fn test_timer_accumulates() {
    let mut timer = Timer::new();
    let first = timer.stop();
    timer.start();
    let second = timer.stop();

    assert_eq!(timer.total_time, first + second);
}
