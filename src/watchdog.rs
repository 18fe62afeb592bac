/// Deadman counter over the sequencer state.
#[derive(Clone, Copy, Debug)]
pub struct Watchdog {
    timeout: u32,
    count: u32,
    prev_state: usize,
}

impl Watchdog {
    pub fn new(timeout: u32) -> Self {
        Self {
            timeout,
            count: 0,
            prev_state: 0,
        }
    }

    /// Feed the state reached at the end of a cycle. Returns true once the
    /// state stood still for more than `timeout` cycles.
    pub fn check(&mut self, state: usize) -> bool {
        match state != self.prev_state {
            true => self.count = 0,
            false => self.count += 1,
        }
        self.prev_state = state;
        self.count > self.timeout
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_timeout() {
        let mut wd = Watchdog::new(3);
        let fired: Vec<bool> = (0..5).map(|_| wd.check(0)).collect();
        assert_eq!(fired, vec![false, false, false, true, true]);
    }

    #[test]
    fn progress_rearms() {
        let mut wd = Watchdog::new(2);
        wd.check(0);
        wd.check(0);
        assert!(!wd.check(1));
        assert_eq!(wd.count(), 0);
        assert!(!wd.check(1));
        assert!(!wd.check(1));
        assert!(wd.check(1));
    }
}
