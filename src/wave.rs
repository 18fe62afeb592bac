use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::TbResult;
use crate::signal::BusSnapshot;

/*
 * VCD TRACE
 */
const PINS: [(&str, u32); 11] = [
    ("clk_i", 1),
    ("rst_ni", 1),
    ("req_i", 1),
    ("we_i", 1),
    ("be_i", 4),
    ("addr_i", 32),
    ("wdata_i", 32),
    ("gnt_o", 1),
    ("rvalid_o", 1),
    ("rdata_o", 32),
    ("irq_o", 1),
];

fn bits(v: u64, width: u32) -> Vec<vcd::Value> {
    (0..width)
        .rev()
        .map(|i| match (v >> i) & 1 {
            0 => vcd::Value::V0,
            _ => vcd::Value::V1,
        })
        .collect()
}

/// Value-change dump of the bus pins, one sample per time step.
pub struct VcdWriter<W: Write> {
    w: vcd::Writer<W>,
    ids: Vec<vcd::IdCode>,
    prev: Option<[u64; PINS.len()]>,
}

impl VcdWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> TbResult<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?))?)
    }
}

impl<W: Write> VcdWriter<W> {
    pub fn new(out: W) -> io::Result<Self> {
        let mut w = vcd::Writer::new(out);
        w.timescale(1, vcd::TimescaleUnit::NS)?;
        w.add_module("tb")?;
        let ids = PINS
            .iter()
            .map(|(name, width)| w.add_wire(*width, name))
            .collect::<io::Result<Vec<_>>>()?;
        w.upscope()?;
        w.enddefinitions()?;
        Ok(Self { w, ids, prev: None })
    }

    /// Emit the values that changed since the previous dump.
    pub fn dump(&mut self, time: u64, clk: bool, rst_n: bool, snap: &BusSnapshot) -> io::Result<()> {
        let vals = [
            clk as u64,
            rst_n as u64,
            snap.req.req as u64,
            snap.req.we as u64,
            snap.req.be as u64,
            snap.req.addr as u64,
            snap.req.wdata as u64,
            snap.rsp.gnt as u64,
            snap.rsp.rvalid as u64,
            snap.rsp.rdata as u64,
            snap.irq as u64,
        ];
        if self.prev == Some(vals) {
            return Ok(());
        }
        self.w.timestamp(time)?;
        for (i, ((_, width), val)) in PINS.iter().zip(vals.iter()).enumerate() {
            if self.prev.map(|p| p[i]) == Some(*val) {
                continue;
            }
            match *width {
                1 => self.w.change_scalar(self.ids[i], *val != 0)?,
                w => self.w.change_vector(self.ids[i], &bits(*val, w))?,
            }
        }
        self.prev = Some(vals);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn parse(sink: &Sink) -> (vcd::Header, Vec<vcd::Command>) {
        let text = sink.0.borrow().clone();
        let mut p = vcd::Parser::new(&text[..]);
        let header = p.parse_header().unwrap();
        let cmds = p.collect::<io::Result<Vec<_>>>().unwrap();
        (header, cmds)
    }

    #[test]
    fn header_declares_all_pins() {
        let sink = Sink::default();
        VcdWriter::new(sink.clone()).unwrap();
        let (header, _) = parse(&sink);
        for (name, _) in PINS.iter() {
            assert!(header.find_var(&["tb", *name]).is_some(), "{}", name);
        }
    }

    #[test]
    fn only_changes_are_dumped() {
        let sink = Sink::default();
        let mut w = VcdWriter::new(sink.clone()).unwrap();
        let mut snap = BusSnapshot::default();
        w.dump(0, false, true, &snap).unwrap();
        w.dump(1, false, true, &snap).unwrap();
        snap.rsp.rdata = 5;
        w.dump(2, true, true, &snap).unwrap();

        let (header, cmds) = parse(&sink);
        let stamps: Vec<u64> = cmds
            .iter()
            .filter_map(|c| match c {
                vcd::Command::Timestamp(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(stamps, vec![0, 2]);

        let rdata = header.find_var(&["tb", "rdata_o"]).unwrap().code;
        let tail: Vec<&vcd::Command> = cmds
            .iter()
            .skip_while(|c| **c != vcd::Command::Timestamp(2))
            .skip(1)
            .collect();
        assert_eq!(tail.len(), 2);
        assert!(tail
            .iter()
            .any(|c| **c == vcd::Command::ChangeVector(rdata, bits(5, 32))));
    }

    #[test]
    fn vector_bits_are_msb_first() {
        use vcd::Value::{V0, V1};
        assert_eq!(bits(0b1101, 4), vec![V1, V1, V0, V1]);
    }
}
