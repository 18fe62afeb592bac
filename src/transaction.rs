use std::fmt;

pub type Word = u32;

/// Byte enable covering a full 32-bit word.
pub const BE_WORD: u8 = 0xf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReqKind {
    Read,
    Write,
}

/// One bus request. Lives only for the cycle it is driven in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub kind: ReqKind,
    pub addr: Word,
    pub wdata: Word,
    pub be: u8,
}

impl Request {
    pub fn write(addr: Word, wdata: Word, be: u8) -> Self {
        Self {
            kind: ReqKind::Write,
            addr,
            wdata,
            be,
        }
    }

    pub fn read(addr: Word) -> Self {
        Self {
            kind: ReqKind::Read,
            addr,
            wdata: 0,
            be: BE_WORD,
        }
    }

    #[inline]
    pub fn is_write(&self) -> bool {
        matches!(self.kind, ReqKind::Write)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<5} | be: 0x{:1x} | addr: 0x{:08x} | wdata: 0x{:08x}",
            match self.kind {
                ReqKind::Read => "READ",
                ReqKind::Write => "WRITE",
            },
            self.be,
            self.addr,
            self.wdata
        )
    }
}

/// Sampled read response. Owned by the scoreboard once submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    pub data: Word,
    pub valid: bool,
}

impl Response {
    pub fn new(data: Word) -> Self {
        Self { data, valid: true }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rvalid: {} | rdata: 0x{:08x}", self.valid as u8, self.data)
    }
}
