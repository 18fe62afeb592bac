use crate::transaction::{Request, Word};

// Stimulus side of the OBI interface, driven by the testbench.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObiReq {
    pub req: bool,
    pub we: bool,
    pub be: u8,
    pub addr: Word,
    pub wdata: Word,
}

// Response side, driven by the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObiRsp {
    pub gnt: bool,
    pub rvalid: bool,
    pub rdata: Word,
}

/// Immutable view of every interface pin after the device settled.
///
/// Monitors only ever look at snapshots, never at the device itself, so the
/// "drive, settle, then sample" order is enforced by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusSnapshot {
    pub req: ObiReq,
    pub rsp: ObiRsp,
    pub irq: bool,
}

impl BusSnapshot {
    /// Handshake completed this cycle.
    #[inline]
    pub fn accepted(&self) -> bool {
        self.req.req && self.rsp.gnt
    }

    #[inline]
    pub fn read_accepted(&self) -> bool {
        self.accepted() && !self.req.we
    }

    /// Request currently on the pins, if any.
    pub fn request(&self) -> Option<Request> {
        if !self.req.req {
            return None;
        }
        Some(match self.req.we {
            true => Request::write(self.req.addr, self.req.wdata, self.req.be),
            false => Request {
                be: self.req.be,
                ..Request::read(self.req.addr)
            },
        })
    }
}
