use crate::signal::ObiReq;
use crate::sim_if::SimIf;
use crate::transaction::Request;

/// Translates the pending request into stimulus pins. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct Driver;

impl Driver {
    pub fn new() -> Self {
        Self
    }

    pub fn drive<D: SimIf + ?Sized>(&self, dut: &mut D, req: Option<&Request>) {
        apply(dut.inputs_mut(), req);
    }
}

#[inline]
fn apply(pins: &mut ObiReq, req: Option<&Request>) {
    // with no request the remaining fields are don't-care and left as they are
    pins.req = false;
    if let Some(req) = req {
        pins.req = true;
        pins.we = req.is_write();
        pins.be = req.be;
        pins.addr = req.addr;
        pins.wdata = req.wdata;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drives_all_fields() {
        let mut pins = ObiReq::default();
        apply(&mut pins, Some(&Request::write(0x8, 0xdead_beef, 0x3)));
        assert_eq!(
            pins,
            ObiReq {
                req: true,
                we: true,
                be: 0x3,
                addr: 0x8,
                wdata: 0xdead_beef,
            }
        );
    }

    #[test]
    fn idle_only_drops_req() {
        let mut pins = ObiReq::default();
        apply(&mut pins, Some(&Request::read(0xc)));
        apply(&mut pins, None);
        assert!(!pins.req);
        assert_eq!(pins.addr, 0xc);
    }
}
