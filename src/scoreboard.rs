use std::collections::VecDeque;
use std::fmt;

use crate::logger::{TbLogger, Verbosity};
use crate::monitor::MAX_OUTSTANDING;
use crate::transaction::{Response, Word};

// Initial queue capacity. In-order traffic never holds more than this, longer
// backlogs grow the queues and are not an error.
pub const QUEUE_DEPTH: usize = 2 * MAX_OUTSTANDING;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScbStatus {
    /// Nothing paired this cycle.
    Idle,
    Matched,
    Mismatch,
    /// A fault was notified since the last call to `process`.
    Fault,
}

impl ScbStatus {
    pub fn is_err(&self) -> bool {
        matches!(self, ScbStatus::Mismatch | ScbStatus::Fault)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub checked: u32,
    pub errors: u32,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.passed() {
            true => write!(
                f,
                "CHECKS PASSED > errors: {} (checked {} transactions)",
                self.errors, self.checked
            ),
            false => write!(f, "CHECKS FAILED > errors: {}/{}", self.errors, self.checked),
        }
    }
}

/// In-order checker: the Nth scheduled expectation is compared with the Nth
/// delivered response.
pub struct Scoreboard {
    exp_q: VecDeque<Word>,
    rsp_q: VecDeque<Response>,
    scheduled: u32,
    received: u32,
    checked: u32,
    errors: u32,
    fault_pending: bool,
    last_checked: Option<Response>,
    logger: TbLogger,
}

impl Scoreboard {
    pub fn new(logger: TbLogger) -> Self {
        Self {
            exp_q: VecDeque::with_capacity(QUEUE_DEPTH),
            rsp_q: VecDeque::with_capacity(QUEUE_DEPTH),
            scheduled: 0,
            received: 0,
            checked: 0,
            errors: 0,
            fault_pending: false,
            last_checked: None,
            logger,
        }
    }

    pub fn schedule_check(&mut self, exp_value: Word) {
        tb_log!(
            self.logger,
            Verbosity::Debug,
            "SCB > Scheduling read data check: 0x{:08x}",
            exp_value
        );
        self.scheduled += 1;
        self.exp_q.push_back(exp_value);
    }

    pub fn submit_response(&mut self, rsp: Response) {
        self.received += 1;
        self.rsp_q.push_back(rsp);
    }

    /// Pair at most one expectation with one response. Called once per cycle.
    pub fn process(&mut self) -> ScbStatus {
        tb_log!(
            self.logger,
            Verbosity::Debug,
            "SCB > response queue size: {} | expectation queue size: {}",
            self.rsp_q.len(),
            self.exp_q.len()
        );
        let status = self.pair();
        match std::mem::take(&mut self.fault_pending) {
            true if status != ScbStatus::Mismatch => ScbStatus::Fault,
            _ => status,
        }
    }

    fn pair(&mut self) -> ScbStatus {
        if self.exp_q.is_empty() {
            // unchecked traffic
            self.rsp_q.clear();
            return ScbStatus::Idle;
        }
        let Some(rsp) = self.rsp_q.pop_front() else {
            return ScbStatus::Idle;
        };
        let Some(exp_value) = self.exp_q.pop_front() else {
            return ScbStatus::Idle;
        };

        self.checked += 1;
        self.last_checked = Some(rsp);
        if rsp.data != exp_value {
            tb_err!(
                self.logger,
                "SCB > Received data (0x{:08x}) does not match the expected value (0x{:08x})",
                rsp.data,
                exp_value
            );
            self.errors += 1;
            return ScbStatus::Mismatch;
        }

        let lvl = match exp_value {
            0 => Verbosity::High,
            _ => Verbosity::Medium,
        };
        tb_success!(
            self.logger,
            lvl,
            "SCB > Received data: 0x{:08x} (expected: 0x{:08x})",
            rsp.data,
            exp_value
        );
        ScbStatus::Matched
    }

    /// Count a fault raised outside of data comparison.
    pub fn notify_fault(&mut self) {
        self.errors += 1;
        self.fault_pending = true;
    }

    /// Drop the oldest outstanding expectation, keeping both queues aligned
    /// after a response went missing.
    pub fn discard_oldest_expectation(&mut self) -> Option<Word> {
        let exp = self.exp_q.pop_front();
        if let Some(exp_value) = exp {
            tb_log!(
                self.logger,
                Verbosity::High,
                "SCB > Discarding expectation 0x{:08x}",
                exp_value
            );
        }
        exp
    }

    pub fn final_verdict(&self) -> Verdict {
        Verdict {
            checked: self.checked,
            errors: self.errors,
        }
    }

    pub fn is_done(&self) -> bool {
        self.exp_q.is_empty() && self.rsp_q.is_empty()
    }

    pub fn pending_expectations(&self) -> usize {
        self.exp_q.len()
    }

    pub fn scheduled(&self) -> u32 {
        self.scheduled
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    pub fn last_checked(&self) -> Option<Response> {
        self.last_checked
    }

    pub fn result_str(&self) -> String {
        format!(
            "scheduled={}, received={}, checked={}, errors={}, expQ: {}, rspQ: {}",
            self.scheduled,
            self.received,
            self.checked,
            self.errors,
            self.exp_q.len(),
            self.rsp_q.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scb() -> Scoreboard {
        Scoreboard::new(TbLogger::default())
    }

    #[test]
    fn pairs_in_fifo_order() {
        let mut s = scb();
        s.schedule_check(1);
        s.schedule_check(2);
        assert_eq!(s.process(), ScbStatus::Idle);
        s.submit_response(Response::new(1));
        assert_eq!(s.process(), ScbStatus::Matched);
        s.submit_response(Response::new(2));
        assert_eq!(s.process(), ScbStatus::Matched);
        assert_eq!(s.final_verdict(), Verdict { checked: 2, errors: 0 });
        assert!(s.is_done());
    }

    #[test]
    fn one_pair_per_call() {
        let mut s = scb();
        s.schedule_check(5);
        s.schedule_check(6);
        s.submit_response(Response::new(5));
        s.submit_response(Response::new(6));
        assert_eq!(s.process(), ScbStatus::Matched);
        assert_eq!(s.final_verdict().checked, 1);
        assert_eq!(s.process(), ScbStatus::Matched);
        assert_eq!(s.final_verdict().checked, 2);
    }

    #[test]
    fn unchecked_responses_are_drained() {
        let mut s = scb();
        s.submit_response(Response::new(7));
        s.submit_response(Response::new(8));
        assert_eq!(s.process(), ScbStatus::Idle);
        assert_eq!(s.process(), ScbStatus::Idle);
        assert!(s.is_done());
        assert_eq!(s.final_verdict(), Verdict { checked: 0, errors: 0 });
        assert_eq!(s.received(), 2);
    }

    #[test]
    fn mismatch_is_counted_and_run_continues() {
        let mut s = scb();
        s.schedule_check(3);
        s.submit_response(Response::new(4));
        assert_eq!(s.process(), ScbStatus::Mismatch);
        s.schedule_check(9);
        s.submit_response(Response::new(9));
        assert_eq!(s.process(), ScbStatus::Matched);
        let v = s.final_verdict();
        assert_eq!(v, Verdict { checked: 2, errors: 1 });
        assert!(!v.passed());
    }

    #[test]
    fn fault_is_reported_once() {
        let mut s = scb();
        s.notify_fault();
        assert_eq!(s.process(), ScbStatus::Fault);
        assert_eq!(s.process(), ScbStatus::Idle);
        assert_eq!(s.final_verdict().errors, 1);
    }

    #[test]
    fn discard_drops_oldest_only() {
        let mut s = scb();
        s.schedule_check(1);
        s.schedule_check(2);
        assert_eq!(s.discard_oldest_expectation(), Some(1));
        assert_eq!(s.pending_expectations(), 1);
        s.submit_response(Response::new(2));
        assert_eq!(s.process(), ScbStatus::Matched);
        assert_eq!(s.discard_oldest_expectation(), None);
    }

    #[test]
    fn zero_compares_like_any_other_value() {
        let mut s = scb();
        s.schedule_check(0);
        s.submit_response(Response::new(0));
        assert_eq!(s.process(), ScbStatus::Matched);
        s.schedule_check(0);
        s.submit_response(Response::new(1));
        assert_eq!(s.process(), ScbStatus::Mismatch);
    }

    #[test]
    fn backlog_past_initial_depth_is_not_an_error() {
        let mut s = scb();
        let n = 2 * QUEUE_DEPTH as Word + 1;
        for v in 0..n {
            s.schedule_check(v);
        }
        assert_eq!(s.pending_expectations(), n as usize);
        for v in 0..n {
            s.submit_response(Response::new(v));
        }
        while !s.is_done() {
            assert_eq!(s.process(), ScbStatus::Matched);
        }
        assert_eq!(s.final_verdict(), Verdict { checked: n as u32, errors: 0 });
    }

    #[test]
    fn long_unchecked_burst_drains_without_error() {
        let mut s = scb();
        for v in 0..3 * QUEUE_DEPTH as Word {
            s.submit_response(Response::new(v));
        }
        assert_eq!(s.process(), ScbStatus::Idle);
        assert!(s.is_done());
        assert_eq!(s.final_verdict().errors, 0);
    }
}
