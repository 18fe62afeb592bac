use rand::Rng;

use crate::logger::{TbLogger, Verbosity};
use crate::transaction::{Request, Word};

/// Value source for write data and read checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Const(Word),
    /// Drawn once when the step is entered, inclusive bounds.
    Random { lo: Word, hi: Word },
    /// Data of the most recent write issued by the script.
    LastWritten,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Write { addr: Word, data: Operand, be: u8 },
    Read { addr: Word, check: Option<Operand> },
    /// Consume one cycle.
    Wait,
    /// Hold until the completion signal is seen.
    WaitIrq,
    /// Re-issue a read every cycle until `mask` shows up in the returned data.
    Poll { addr: Word, mask: Word },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub action: Action,
    /// Start the next step in the same cycle once this one retires.
    pub fallthrough: bool,
    pub label: &'static str,
}

impl Step {
    pub fn write(label: &'static str, addr: Word, data: Operand, be: u8) -> Self {
        Self {
            action: Action::Write { addr, data, be },
            fallthrough: true,
            label,
        }
    }

    pub fn read(label: &'static str, addr: Word) -> Self {
        Self {
            action: Action::Read { addr, check: None },
            fallthrough: true,
            label,
        }
    }

    pub fn wait() -> Self {
        Self {
            action: Action::Wait,
            fallthrough: false,
            label: "wait",
        }
    }

    pub fn wait_irq(label: &'static str) -> Self {
        Self {
            action: Action::WaitIrq,
            fallthrough: true,
            label,
        }
    }

    pub fn poll(label: &'static str, addr: Word, mask: Word) -> Self {
        Self {
            action: Action::Poll { addr, mask },
            fallthrough: false,
            label,
        }
    }

    /// Attach a check to a read step. No effect on other actions.
    pub fn check(mut self, exp: Operand) -> Self {
        if let Action::Read { ref mut check, .. } = self.action {
            *check = Some(exp);
        }
        self
    }

    pub fn no_fallthrough(mut self) -> Self {
        self.fallthrough = false;
        self
    }
}

/// Result of one evaluation of the current step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: usize,
    pub request: Option<Request>,
    pub check: Option<Word>,
    /// When false the caller evaluates the next step within the same cycle.
    pub consumed_cycle: bool,
}

impl Transition {
    fn stay(state: usize, request: Option<Request>) -> Self {
        Self {
            next: state,
            request,
            check: None,
            consumed_cycle: true,
        }
    }
}

pub struct Sequencer {
    script: Vec<Step>,
    state: usize,
    // request of the current step, fixed on entry
    current: Option<Request>,
    accepted: bool,
    irq: bool,
    rdata: Word,
    last_written: Word,
    end_of_test: bool,
    irq_events: u32,
    logger: TbLogger,
}

impl Sequencer {
    pub fn new(script: Vec<Step>, logger: TbLogger) -> Self {
        Self {
            script,
            state: 0,
            current: None,
            accepted: false,
            irq: false,
            rdata: 0,
            last_written: 0,
            end_of_test: false,
            irq_events: 0,
            logger,
        }
    }

    /// Latch what the monitors saw this cycle. `rdata` is `Some` only while
    /// response-valid is asserted.
    pub fn observe(&mut self, accepted: bool, irq: bool, rdata: Option<Word>) {
        self.accepted = accepted;
        self.irq = irq;
        if let Some(data) = rdata {
            self.rdata = data;
        }
    }

    /// Evaluate the current step once.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Transition {
        let idx = self.state;
        let Some(step) = self.script.get(idx).copied() else {
            if !self.end_of_test {
                tb_log!(self.logger, Verbosity::Medium, "## Test program complete");
                self.end_of_test = true;
            }
            return Transition::stay(idx, None);
        };

        match step.action {
            Action::Write { addr, data, be } => {
                if !self.accepted {
                    let req = match self.current {
                        Some(req) => req,
                        None => {
                            let data = self.resolve(data, rng);
                            self.last_written = data;
                            tb_log!(
                                self.logger,
                                Verbosity::High,
                                "## {} (0x{:08x})...",
                                step.label,
                                data
                            );
                            self.issue(Request::write(addr, data, be))
                        }
                    };
                    return Transition::stay(idx, Some(req));
                }
                self.retire(idx, &step, None)
            }
            Action::Read { addr, check } => {
                if !self.accepted {
                    let req = match self.current {
                        Some(req) => req,
                        None => {
                            tb_log!(self.logger, Verbosity::High, "## {}...", step.label);
                            self.issue(Request::read(addr))
                        }
                    };
                    return Transition::stay(idx, Some(req));
                }
                let check = check.map(|exp| self.resolve(exp, rng));
                self.retire(idx, &step, check)
            }
            Action::Wait => {
                self.goto(idx + 1);
                Transition::stay(idx + 1, None)
            }
            Action::WaitIrq => {
                if !self.irq {
                    return Transition::stay(idx, None);
                }
                tb_log!(self.logger, Verbosity::Low, "## Interrupt received!");
                self.irq_events += 1;
                self.goto(idx + 1);
                Transition {
                    next: idx + 1,
                    request: None,
                    check: None,
                    consumed_cycle: !step.fallthrough,
                }
            }
            Action::Poll { addr, mask } => {
                if self.rdata & mask != 0 {
                    tb_log!(self.logger, Verbosity::Low, "## {}: bit set!", step.label);
                    self.goto(idx + 1);
                    return Transition::stay(idx + 1, None);
                }
                tb_log!(self.logger, Verbosity::Full, "## {}...", step.label);
                Transition::stay(idx, Some(Request::read(addr)))
            }
        }
    }

    #[inline]
    fn issue(&mut self, req: Request) -> Request {
        self.current = Some(req);
        req
    }

    fn retire(&mut self, idx: usize, step: &Step, check: Option<Word>) -> Transition {
        self.accepted = false;
        self.goto(idx + 1);
        Transition {
            next: idx + 1,
            request: None,
            check,
            consumed_cycle: !step.fallthrough,
        }
    }

    fn resolve<R: Rng + ?Sized>(&self, op: Operand, rng: &mut R) -> Word {
        match op {
            Operand::Const(v) => v,
            Operand::Random { lo, hi } => rng.gen_range(lo..=hi),
            Operand::LastWritten => self.last_written,
        }
    }

    #[inline]
    fn goto(&mut self, next: usize) {
        self.state = next;
        self.current = None;
    }

    pub fn state(&self) -> usize {
        self.state
    }

    pub fn is_end_of_test(&self) -> bool {
        self.end_of_test
    }

    pub fn irq_events(&self) -> u32 {
        self.irq_events
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seq(script: Vec<Step>) -> (Sequencer, StdRng) {
        (
            Sequencer::new(script, TbLogger::default()),
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn issue_holds_until_accepted() {
        let (mut s, mut rng) = seq(vec![Step::write("w", 0x4, Operand::Const(10), 0xf)]);
        let t0 = s.advance(&mut rng);
        s.observe(false, false, None);
        let t1 = s.advance(&mut rng);
        assert_eq!(t0, t1);
        assert_eq!(t0.next, 0);
        assert!(t0.consumed_cycle);
        assert_eq!(t0.request, Some(Request::write(0x4, 10, 0xf)));
    }

    #[test]
    fn acceptance_falls_through_within_the_cycle() {
        let (mut s, mut rng) = seq(vec![
            Step::write("w", 0x4, Operand::Const(10), 0xf),
            Step::read("r", 0x4).check(Operand::LastWritten),
        ]);
        s.advance(&mut rng);
        s.observe(true, false, None);

        let retire = s.advance(&mut rng);
        assert_eq!(retire.next, 1);
        assert!(!retire.consumed_cycle);
        assert_eq!(retire.request, None);

        // same cycle: the read goes out
        let issue = s.advance(&mut rng);
        assert_eq!(issue.next, 1);
        assert_eq!(issue.request, Some(Request::read(0x4)));
        assert!(issue.consumed_cycle);

        s.observe(true, false, None);
        let retire = s.advance(&mut rng);
        assert_eq!(retire.check, Some(10));
        assert_eq!(s.state(), 2);
    }

    #[test]
    fn no_fallthrough_consumes_the_cycle() {
        let (mut s, mut rng) = seq(vec![
            Step::read("r", 0x0).no_fallthrough(),
            Step::read("r", 0x8),
        ]);
        s.advance(&mut rng);
        s.observe(true, false, None);
        let t = s.advance(&mut rng);
        assert!(t.consumed_cycle);
        assert_eq!(t.next, 1);
    }

    #[test]
    fn wait_takes_one_cycle_each() {
        let (mut s, mut rng) = seq(vec![Step::wait(), Step::wait()]);
        assert_eq!(s.advance(&mut rng), Transition::stay(1, None));
        assert_eq!(s.advance(&mut rng), Transition::stay(2, None));
        assert!(!s.is_end_of_test());
        s.advance(&mut rng);
        assert!(s.is_end_of_test());
    }

    #[test]
    fn irq_wait_blocks_then_falls_through() {
        let (mut s, mut rng) = seq(vec![Step::wait_irq("irq"), Step::read("r", 0x8)]);
        for _ in 0..3 {
            s.observe(false, false, None);
            assert_eq!(s.advance(&mut rng), Transition::stay(0, None));
        }
        s.observe(false, true, None);
        let t = s.advance(&mut rng);
        assert_eq!(t.next, 1);
        assert!(!t.consumed_cycle);
        assert_eq!(s.advance(&mut rng).request, Some(Request::read(0x8)));
        assert_eq!(s.irq_events(), 1);
    }

    #[test]
    fn poll_reissues_until_bit_seen() {
        let (mut s, mut rng) = seq(vec![Step::poll("poll", 0x8, 0x1)]);
        s.observe(true, false, Some(0));
        assert_eq!(s.advance(&mut rng).request, Some(Request::read(0x8)));
        s.observe(true, false, Some(0x2));
        assert_eq!(s.advance(&mut rng).request, Some(Request::read(0x8)));
        // no response this cycle, latched data stays
        s.observe(true, false, None);
        assert_eq!(s.advance(&mut rng).request, Some(Request::read(0x8)));
        s.observe(true, false, Some(0x1));
        let t = s.advance(&mut rng);
        assert_eq!(t, Transition::stay(1, None));
    }

    #[test]
    fn random_operand_is_drawn_once_per_step() {
        let (mut s, mut rng) = seq(vec![
            Step::write("thr", 0x4, Operand::Random { lo: 1, hi: 63 }, 0xf),
            Step::read("r", 0x4).check(Operand::LastWritten),
        ]);
        let first = s.advance(&mut rng).request.map(|r| r.wdata);
        for _ in 0..5 {
            s.observe(false, false, None);
            assert_eq!(s.advance(&mut rng).request.map(|r| r.wdata), first);
        }
        let thr = first.unwrap();
        assert!((1..=63).contains(&thr));
        s.observe(true, false, None);
        s.advance(&mut rng);
        s.advance(&mut rng);
        s.observe(true, false, None);
        assert_eq!(s.advance(&mut rng).check, Some(thr));
    }

    #[test]
    fn empty_script_ends_immediately() {
        let (mut s, mut rng) = seq(vec![]);
        assert!(s.is_empty());
        let t = s.advance(&mut rng);
        assert!(t.consumed_cycle);
        assert!(s.is_end_of_test());
    }
}
