use rand::rngs::StdRng;
use rand::Rng;

use crate::cnt_regs::*;
use crate::signal::{BusSnapshot, ObiReq, ObiRsp};
use crate::sim_if::SimIf;
use crate::transaction::Word;
use crate::utils::seeded_rng;

/// Misbehaviour injected into the counter model.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaultConfig {
    /// Swallow the response of every Nth granted read.
    pub drop_read_every: Option<u32>,
    /// Chance of withholding grant in a given cycle.
    pub stall_prob: f64,
    /// Never grant anything.
    pub never_grant: bool,
}

/// Behavioral model of the OBI counter peripheral.
///
/// Grant is combinational, every granted request gets `rvalid` on the
/// following cycle. `irq` follows the terminal-count status bit.
pub struct CounterModel {
    clk: bool,
    prev_clk: bool,
    rst_n: bool,
    inputs: ObiReq,

    enable: bool,
    threshold: Word,
    count: Word,
    tc: bool,

    rvalid_q: bool,
    rdata_q: Word,
    stall: bool,
    reads_granted: u32,

    faults: FaultConfig,
    rng: StdRng,
}

impl CounterModel {
    pub fn new(seed: u64) -> Self {
        Self::with_faults(seed, FaultConfig::default())
    }

    pub fn with_faults(seed: u64, mut faults: FaultConfig) -> Self {
        faults.stall_prob = faults.stall_prob.clamp(0.0, 1.0);
        Self {
            clk: false,
            prev_clk: false,
            rst_n: true,
            inputs: ObiReq::default(),
            enable: false,
            threshold: 0,
            count: 0,
            tc: false,
            rvalid_q: false,
            rdata_q: 0,
            stall: false,
            reads_granted: 0,
            faults,
            rng: seeded_rng(seed),
        }
    }

    fn reset(&mut self) {
        self.enable = false;
        self.threshold = 0;
        self.count = 0;
        self.tc = false;
        self.rvalid_q = false;
        self.rdata_q = 0;
        self.stall = false;
        self.reads_granted = 0;
    }

    #[inline]
    fn gnt(&self) -> bool {
        self.inputs.req && !self.stall && !self.faults.never_grant
    }

    fn on_rising_edge(&mut self) {
        let granted = self.gnt();
        let req = self.inputs;

        if self.enable {
            self.count = self.count.wrapping_add(1);
            if self.count >= self.threshold {
                self.tc = true;
                self.count = 0;
            }
        }

        self.rvalid_q = false;
        self.rdata_q = 0;
        if granted {
            match req.we {
                true => {
                    self.write(req.addr, req.wdata, req.be);
                    self.rvalid_q = true;
                }
                false => {
                    self.reads_granted += 1;
                    if !self.drops_read() {
                        self.rvalid_q = true;
                        self.rdata_q = self.read(req.addr);
                    }
                }
            }
        }

        self.stall = self.faults.stall_prob > 0.0 && self.rng.gen_bool(self.faults.stall_prob);
    }

    fn drops_read(&self) -> bool {
        match self.faults.drop_read_every {
            Some(n) if n > 0 => self.reads_granted % n == 0,
            _ => false,
        }
    }

    fn read(&self, addr: Word) -> Word {
        match addr {
            CONTROL_REG_OFFSET => (self.enable as Word) << CONTROL_ENABLE_BIT,
            THRESHOLD_REG_OFFSET => self.threshold,
            STATUS_REG_OFFSET => (self.tc as Word) << STATUS_TC_BIT,
            COUNT_REG_OFFSET => self.count,
            _ => 0,
        }
    }

    fn write(&mut self, addr: Word, wdata: Word, be: u8) {
        match addr {
            CONTROL_REG_OFFSET => {
                let old = (self.enable as Word) << CONTROL_ENABLE_BIT;
                let val = merge_bytes(old, wdata, be);
                self.enable = val & (1 << CONTROL_ENABLE_BIT) != 0;
                if val & (1 << CONTROL_CLEAR_BIT) != 0 {
                    self.count = 0;
                    self.tc = false;
                }
            }
            THRESHOLD_REG_OFFSET => self.threshold = merge_bytes(self.threshold, wdata, be),
            STATUS_REG_OFFSET => {
                // write one to clear
                if merge_bytes(0, wdata, be) & (1 << STATUS_TC_BIT) != 0 {
                    self.tc = false;
                }
            }
            _ => {}
        }
    }

    pub fn count(&self) -> Word {
        self.count
    }

    pub fn threshold(&self) -> Word {
        self.threshold
    }

    pub fn tc(&self) -> bool {
        self.tc
    }
}

#[inline]
fn merge_bytes(old: Word, new: Word, be: u8) -> Word {
    let mask = (0..4)
        .filter(|i| be & (1 << i) != 0)
        .fold(0, |m, i| m | (0xff << (8 * i)));
    (old & !mask) | (new & mask)
}

impl SimIf for CounterModel {
    fn set_clk(&mut self, clk: bool) {
        self.clk = clk;
    }
    fn set_rst_n(&mut self, rst_n: bool) {
        self.rst_n = rst_n;
    }
    fn clk(&self) -> bool {
        self.clk
    }
    fn rst_n(&self) -> bool {
        self.rst_n
    }
    fn inputs_mut(&mut self) -> &mut ObiReq {
        &mut self.inputs
    }
    fn eval(&mut self) {
        if !self.rst_n {
            self.reset();
        } else if self.clk && !self.prev_clk {
            self.on_rising_edge();
        }
        self.prev_clk = self.clk;
    }
    fn sample(&self) -> BusSnapshot {
        BusSnapshot {
            req: self.inputs,
            rsp: ObiRsp {
                gnt: self.gnt(),
                rvalid: self.rvalid_q,
                rdata: self.rdata_q,
            },
            irq: self.tc,
        }
    }
}
