use std::iter;

use crate::cnt_regs::*;
use crate::sequencer::{Operand, Step};
use crate::transaction::{Word, BE_WORD};

// Thresholds drawn by the conformance program.
pub const THRESHOLD_MIN: Word = 1;
pub const THRESHOLD_MAX: Word = 63;

const RANDOM_THRESHOLD: Operand = Operand::Random {
    lo: THRESHOLD_MIN,
    hi: THRESHOLD_MAX,
};

fn waits(n: usize) -> impl Iterator<Item = Step> {
    iter::repeat(Step::wait()).take(n)
}

/// Full conformance program for the counter peripheral.
///
/// Step numbering is significant for the watchdog and the logs; the one-cycle
/// waits standing in for counter reads keep it aligned.
pub fn counter_script() -> Vec<Step> {
    let enable = 1 << CONTROL_ENABLE_BIT;
    let clear = 1 << CONTROL_CLEAR_BIT;
    let tc = 1 << STATUS_TC_BIT;

    let mut s = Vec::with_capacity(36);
    // 0..=5: configure and read back
    s.push(Step::write(
        "Writing counter threshold",
        THRESHOLD_REG_OFFSET,
        RANDOM_THRESHOLD,
        BE_WORD,
    ));
    s.push(Step::read("Reading counter threshold", THRESHOLD_REG_OFFSET).check(Operand::LastWritten));
    s.extend(waits(1));
    s.push(Step::read("Reading TC bit", STATUS_REG_OFFSET).check(Operand::Const(0)));
    s.push(Step::write(
        "Enabling counter",
        CONTROL_REG_OFFSET,
        Operand::Const(enable),
        0x1,
    ));
    s.push(Step::read("Reading control register", CONTROL_REG_OFFSET).check(Operand::LastWritten));
    // 6..=13: let it count, wait for the interrupt
    s.extend(waits(6));
    s.push(Step::wait_irq("Waiting for interrupt"));
    s.extend(waits(1));
    // 14..=21: stop and inspect
    s.push(Step::write(
        "Disabling counter",
        CONTROL_REG_OFFSET,
        Operand::Const(0),
        0x1,
    ));
    s.extend(waits(6));
    s.push(Step::read("Reading TC bit", STATUS_REG_OFFSET).check(Operand::Const(tc)));
    // 22..=29
    s.push(Step::write(
        "Clearing counter",
        CONTROL_REG_OFFSET,
        Operand::Const(clear),
        0x1,
    ));
    s.extend(waits(7));
    // 30..=35: second round, completion observed by polling
    s.push(Step::write(
        "Writing counter threshold",
        THRESHOLD_REG_OFFSET,
        RANDOM_THRESHOLD,
        BE_WORD,
    ));
    s.push(Step::read("Reading counter threshold", THRESHOLD_REG_OFFSET).check(Operand::LastWritten));
    s.push(Step::write(
        "Enabling counter",
        CONTROL_REG_OFFSET,
        Operand::Const(enable),
        0x1,
    ));
    s.push(Step::read("Polling TC bit", STATUS_REG_OFFSET));
    s.push(Step::poll("Polling TC bit", STATUS_REG_OFFSET, tc));
    s.push(Step::write(
        "Clearing TC bit",
        STATUS_REG_OFFSET,
        Operand::Const(tc),
        0x1,
    ));
    s
}

/// Write `value` to `addr` and check it on an immediate read-back.
pub fn write_readback(addr: Word, value: Word) -> Vec<Step> {
    vec![
        Step::write("Writing register", addr, Operand::Const(value), BE_WORD),
        Step::read("Reading register back", addr).check(Operand::LastWritten),
    ]
}
