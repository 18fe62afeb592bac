// Register map of the OBI counter peripheral.
use crate::transaction::Word;

pub const CONTROL_REG_OFFSET: Word = 0x0;
pub const CONTROL_ENABLE_BIT: u32 = 0;
pub const CONTROL_CLEAR_BIT: u32 = 1;

pub const THRESHOLD_REG_OFFSET: Word = 0x4;

pub const STATUS_REG_OFFSET: Word = 0x8;
pub const STATUS_TC_BIT: u32 = 0;

// read-only
pub const COUNT_REG_OFFSET: Word = 0xc;
