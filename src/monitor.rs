use crate::logger::{TbLogger, Verbosity};
use crate::scoreboard::Scoreboard;
use crate::signal::BusSnapshot;
use crate::transaction::{Request, Response, Word};

/// Maximum number of in-flight transactions on the bus.
pub const MAX_OUTSTANDING: usize = 2;

/*
 * REQUEST MONITOR
 */
pub struct ReqMonitor {
    accepted: bool,
    last: Option<Request>,
    count: u64,
    logger: TbLogger,
}

impl ReqMonitor {
    pub fn new(logger: TbLogger) -> Self {
        Self {
            accepted: false,
            last: None,
            count: 0,
            logger,
        }
    }

    /// Must run exactly once per cycle, after the stimulus settled.
    pub fn sample(&mut self, snap: &BusSnapshot) {
        self.accepted = snap.accepted();
        if !self.accepted {
            return;
        }
        self.count += 1;
        self.last = snap.request();
        if let Some(req) = self.last {
            tb_log!(self.logger, Verbosity::High, "OBI REQ > {}", req);
        }
    }

    /// Whether the last sampled cycle completed a request handshake.
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn last_request(&self) -> Option<Request> {
        self.last
    }

    pub fn accepted_count(&self) -> u64 {
        self.count
    }
}

/*
 * RESPONSE MONITOR
 */
pub struct RspMonitor {
    // [0]: read accepted in the most recent sample, [1]: the one before
    pending_read: [bool; MAX_OUTSTANDING],
    data_ready: bool,
    rdata: Word,
    irq: bool,
    dropped: u32,
    logger: TbLogger,
}

impl RspMonitor {
    pub fn new(logger: TbLogger) -> Self {
        Self {
            pending_read: [false; MAX_OUTSTANDING],
            data_ready: false,
            rdata: 0,
            irq: false,
            dropped: 0,
            logger,
        }
    }

    pub fn sample(&mut self, snap: &BusSnapshot, scb: &mut Scoreboard) {
        self.data_ready = snap.rsp.rvalid;
        self.rdata = snap.rsp.rdata;
        self.irq = snap.irq;

        let new_read_req = snap.read_accepted();

        // oldest response still missing while yet another request gets in
        if self.pending_read[MAX_OUTSTANDING - 1] && !snap.rsp.rvalid && snap.accepted() {
            tb_err!(self.logger, "RSP > Response not delivered");
            self.dropped += 1;
            scb.notify_fault();
            scb.discard_oldest_expectation();
            self.shift(new_read_req);
            return;
        }

        if !self.pending_read[0] || !snap.rsp.rvalid {
            self.shift(new_read_req);
            return;
        }

        let rsp = Response {
            data: snap.rsp.rdata,
            valid: snap.rsp.rvalid,
        };
        tb_log!(self.logger, Verbosity::High, "OBI RSP > {}", rsp);
        scb.submit_response(rsp);

        self.pending_read[MAX_OUTSTANDING - 1] = false;
        self.pending_read[0] = new_read_req;
    }

    #[inline]
    fn shift(&mut self, new_read_req: bool) {
        self.pending_read.rotate_right(1);
        self.pending_read[0] = new_read_req;
    }

    pub fn is_data_ready(&self) -> bool {
        self.data_ready
    }

    pub fn data(&self) -> Word {
        self.rdata
    }

    pub fn irq(&self) -> bool {
        self.irq
    }

    pub fn outstanding(&self) -> usize {
        self.pending_read.iter().filter(|p| **p).count()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ObiReq, ObiRsp};

    fn snap(read_granted: bool, rvalid: bool, rdata: Word) -> BusSnapshot {
        BusSnapshot {
            req: ObiReq {
                req: read_granted,
                we: false,
                be: 0xf,
                addr: 0x4,
                wdata: 0,
            },
            rsp: ObiRsp {
                gnt: read_granted,
                rvalid,
                rdata,
            },
            irq: false,
        }
    }

    fn setup() -> (RspMonitor, Scoreboard) {
        (
            RspMonitor::new(TbLogger::default()),
            Scoreboard::new(TbLogger::default()),
        )
    }

    #[test]
    fn single_cycle_latency_read_is_forwarded() {
        let (mut mon, mut scb) = setup();
        scb.schedule_check(0x2a);
        mon.sample(&snap(true, false, 0), &mut scb);
        mon.sample(&snap(false, true, 0x2a), &mut scb);
        assert_eq!(scb.received(), 1);
        assert!(mon.is_data_ready());
        assert_eq!(mon.data(), 0x2a);
        assert!(!scb.process().is_err());
        assert_eq!(scb.final_verdict().checked, 1);
    }

    #[test]
    fn back_to_back_reads() {
        let (mut mon, mut scb) = setup();
        mon.sample(&snap(true, false, 0), &mut scb);
        mon.sample(&snap(true, true, 1), &mut scb);
        mon.sample(&snap(false, true, 2), &mut scb);
        assert_eq!(scb.received(), 2);
        assert_eq!(mon.outstanding(), 0);
        assert_eq!(mon.dropped(), 0);
    }

    #[test]
    fn third_request_with_two_outstanding_is_a_drop() {
        let (mut mon, mut scb) = setup();
        scb.schedule_check(1);
        scb.schedule_check(2);
        mon.sample(&snap(true, false, 0), &mut scb);
        mon.sample(&snap(true, false, 0), &mut scb);
        assert_eq!(mon.outstanding(), 2);
        mon.sample(&snap(true, false, 0), &mut scb);
        assert_eq!(mon.dropped(), 1);
        assert_eq!(scb.final_verdict().errors, 1);
        assert_eq!(scb.pending_expectations(), 1);
        assert_eq!(scb.received(), 0);
    }

    #[test]
    fn response_without_pending_read_is_ignored() {
        let (mut mon, mut scb) = setup();
        // write response
        let mut s = snap(true, false, 0);
        s.req.we = true;
        mon.sample(&s, &mut scb);
        mon.sample(&snap(false, true, 0), &mut scb);
        assert_eq!(scb.received(), 0);
        assert!(mon.is_data_ready());
    }

    #[test]
    fn irq_is_passed_through() {
        let (mut mon, mut scb) = setup();
        let mut s = snap(false, false, 0);
        s.irq = true;
        mon.sample(&s, &mut scb);
        assert!(mon.irq());
        s.irq = false;
        mon.sample(&s, &mut scb);
        assert!(!mon.irq());
    }

    #[test]
    fn request_monitor_flags_handshake_only() {
        let mut mon = ReqMonitor::new(TbLogger::default());
        let mut s = snap(false, false, 0);
        s.req.req = true;
        mon.sample(&s);
        assert!(!mon.accepted());
        mon.sample(&snap(true, false, 0));
        assert!(mon.accepted());
        assert_eq!(mon.last_request().map(|r| r.addr), Some(0x4));
        assert_eq!(mon.accepted_count(), 1);
    }
}
