use std::fmt;
use std::fs::File;
use std::io::BufWriter;

use rand::rngs::StdRng;
use tracing::info_span;

use crate::config::{TbConfig, END_OF_RESET_TIME};
use crate::driver::Driver;
use crate::error::TbResult;
use crate::logger::{TbLogger, Verbosity};
use crate::monitor::{ReqMonitor, RspMonitor};
use crate::scoreboard::{Scoreboard, Verdict};
use crate::sequencer::{Sequencer, Step};
use crate::sim_if::SimIf;
use crate::transaction::{Request, Response};
use crate::utils::seeded_rng;
use crate::watchdog::Watchdog;
use crate::wave::VcdWriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// Script finished and the linger period ran out.
    EndOfTest,
    /// Sequencer stopped advancing.
    Watchdog,
    MaxCycles,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::EndOfTest => "end of test",
            EndReason::Watchdog => "watchdog timeout",
            EndReason::MaxCycles => "cycle limit reached",
        };
        f.write_str(s)
    }
}

/// Everything known about a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TbReport {
    pub checked: u32,
    pub errors: u32,
    pub scheduled: u32,
    pub received: u32,
    /// Expectations still waiting for a response when the run stopped.
    pub pending: usize,
    pub irq_events: u32,
    /// Request handshakes seen on the bus.
    pub accepted: u64,
    /// Read responses the device never delivered.
    pub dropped: u32,
    /// Reads still in flight when the run stopped.
    pub outstanding: usize,
    pub cycles: u64,
    pub end: EndReason,
    pub last_response: Option<Response>,
    pub seed: u64,
}

impl TbReport {
    pub fn verdict(&self) -> Verdict {
        Verdict {
            checked: self.checked,
            errors: self.errors,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict().passed()
    }
}

/// Cycle-stepped bench around a device model.
pub struct Testbench<D: SimIf> {
    dut: D,
    driver: Driver,
    req_mon: ReqMonitor,
    rsp_mon: RspMonitor,
    scb: Scoreboard,
    seq: Sequencer,
    watchdog: Watchdog,
    rng: StdRng,
    waves: Option<VcdWriter<BufWriter<File>>>,
    cfg: TbConfig,
    logger: TbLogger,

    time: u64,
    cycles: u64,
    end_of_test: bool,
    exit_timer: u32,
}

impl<D: SimIf> Testbench<D> {
    pub fn new(dut: D, script: Vec<Step>, cfg: TbConfig) -> TbResult<Self> {
        cfg.validate()?;
        let logger = TbLogger::new(cfg.log_level);
        let waves = match cfg.gen_waves {
            true => {
                tb_log!(logger, Verbosity::Low, "Dumping waveforms to {}", cfg.wave_path.display());
                Some(VcdWriter::create(&cfg.wave_path)?)
            }
            false => None,
        };
        Ok(Self {
            dut,
            driver: Driver::new(),
            req_mon: ReqMonitor::new(logger),
            rsp_mon: RspMonitor::new(logger),
            scb: Scoreboard::new(logger),
            seq: Sequencer::new(script, logger),
            watchdog: Watchdog::new(cfg.watchdog_timeout),
            rng: seeded_rng(cfg.seed),
            waves,
            cfg,
            logger,
            time: 0,
            cycles: 0,
            end_of_test: false,
            exit_timer: 0,
        })
    }

    /// Run until end of test, watchdog abort or the cycle limit.
    pub fn run(&mut self) -> TbReport {
        tb_log!(
            self.logger,
            Verbosity::Low,
            "Running {}-step program with seed {} (log level {})",
            self.seq.len(),
            self.cfg.seed,
            self.logger.level()
        );
        let end = loop {
            // reset pulse and clock
            self.dut.set_rst_n(!(self.time > 1 && self.time < 5));
            let clk = !self.dut.clk();
            self.dut.set_clk(clk);
            self.dut.eval();

            if clk && self.time > END_OF_RESET_TIME {
                if let Some(end) = self.cycle() {
                    self.dump();
                    break end;
                }
            }

            self.dump();
            self.time += 1;
            if self.cycles >= self.cfg.max_cycles {
                tb_warn!(
                    self.logger,
                    "Simulation stopped after {} cycles without reaching end of test",
                    self.cycles
                );
                break EndReason::MaxCycles;
            }
        };

        self.dut.finalize();
        // closes the trace file
        self.waves = None;

        let report = self.report(end);
        match report.passed() {
            true => tb_success!(self.logger, Verbosity::Low, "{}", report.verdict()),
            false => tb_err!(self.logger, "{}", report.verdict()),
        }
        report
    }

    // one active clock cycle, returns how the run ended if it did
    fn cycle(&mut self) -> Option<EndReason> {
        let span = info_span!("cycle", n = self.cycles);
        let _enter = span.enter();
        self.cycles += 1;

        let req = self.step_sequencer();
        self.driver.drive(&mut self.dut, req.as_ref());
        self.dut.eval();

        let snap = self.dut.sample();
        self.req_mon.sample(&snap);
        self.rsp_mon.sample(&snap, &mut self.scb);
        self.seq.observe(
            self.req_mon.accepted(),
            self.rsp_mon.irq(),
            self.rsp_mon.is_data_ready().then(|| self.rsp_mon.data()),
        );

        if self.scb.process().is_err() && self.cfg.stop_on_mismatch && !self.end_of_test {
            tb_log!(self.logger, Verbosity::Medium, "Stopping test after scoreboard error");
            self.end_of_test = true;
        }

        if self.watchdog.check(self.seq.state()) {
            tb_err!(
                self.logger,
                "Watchdog timeout: program stuck in step {} for {} cycles",
                self.seq.state(),
                self.watchdog.count()
            );
            if let Some(req) = self.req_mon.last_request() {
                tb_log!(self.logger, Verbosity::Low, "Last accepted request: {}", req);
            }
            self.scb.notify_fault();
            return Some(EndReason::Watchdog);
        }

        self.end_of_test |= self.seq.is_end_of_test();
        if self.end_of_test {
            let t = self.exit_timer;
            self.exit_timer += 1;
            if t == self.cfg.end_of_test_timeout {
                return Some(EndReason::EndOfTest);
            }
        }
        None
    }

    // evaluate steps until one consumes the cycle
    fn step_sequencer(&mut self) -> Option<Request> {
        loop {
            let t = self.seq.advance(&mut self.rng);
            if let Some(exp) = t.check {
                self.scb.schedule_check(exp);
            }
            if t.consumed_cycle {
                return t.request;
            }
        }
    }

    fn dump(&mut self) {
        let Some(w) = self.waves.as_mut() else {
            return;
        };
        let snap = self.dut.sample();
        if let Err(e) = w.dump(self.time, self.dut.clk(), self.dut.rst_n(), &snap) {
            tb_warn!(self.logger, "Waveform dump failed, disabling waves: {}", e);
            self.waves = None;
        }
    }

    fn report(&self, end: EndReason) -> TbReport {
        let v = self.scb.final_verdict();
        tb_log!(self.logger, Verbosity::Full, "SCB > {}", self.scb.result_str());
        TbReport {
            checked: v.checked,
            errors: v.errors,
            scheduled: self.scb.scheduled(),
            received: self.scb.received(),
            pending: self.scb.pending_expectations(),
            irq_events: self.seq.irq_events(),
            accepted: self.req_mon.accepted_count(),
            dropped: self.rsp_mon.dropped(),
            outstanding: self.rsp_mon.outstanding(),
            cycles: self.cycles,
            end,
            last_response: self.scb.last_checked(),
            seed: self.cfg.seed,
        }
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }
}
