use crate::signal::{BusSnapshot, ObiReq};

/// Pin-level interface to the device under test.
///
/// The testbench owns the clock and reset pins and the OBI stimulus; the model
/// owns grant, response and interrupt timing. Nothing here assumes a fixed
/// latency.
pub trait SimIf {
    fn set_clk(&mut self, clk: bool);
    fn set_rst_n(&mut self, rst_n: bool);
    fn clk(&self) -> bool;
    fn rst_n(&self) -> bool;
    /// Stimulus pins, written by the driver.
    fn inputs_mut(&mut self) -> &mut ObiReq;
    /// Settle combinational logic; sequential state updates on a rising clock.
    fn eval(&mut self);
    fn sample(&self) -> BusSnapshot;
    fn finalize(&mut self) {}
}

impl<T: SimIf + ?Sized> SimIf for Box<T> {
    fn set_clk(&mut self, clk: bool) {
        (**self).set_clk(clk)
    }
    fn set_rst_n(&mut self, rst_n: bool) {
        (**self).set_rst_n(rst_n)
    }
    fn clk(&self) -> bool {
        (**self).clk()
    }
    fn rst_n(&self) -> bool {
        (**self).rst_n()
    }
    fn inputs_mut(&mut self) -> &mut ObiReq {
        (**self).inputs_mut()
    }
    fn eval(&mut self) {
        (**self).eval()
    }
    fn sample(&self) -> BusSnapshot {
        (**self).sample()
    }
    fn finalize(&mut self) {
        (**self).finalize()
    }
}
