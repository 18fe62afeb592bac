pub use crate::config::TbConfig;
pub use crate::counter_model::{CounterModel, FaultConfig};
pub use crate::error::{TbError, TbResult};
pub use crate::logger::{TbLogger, Verbosity};
pub use crate::scoreboard::{ScbStatus, Scoreboard, Verdict};
pub use crate::script::{counter_script, write_readback};
pub use crate::sequencer::{Action, Operand, Sequencer, Step, Transition};
pub use crate::signal::BusSnapshot;
pub use crate::sim_if::SimIf;
pub use crate::testbench::{EndReason, TbReport, Testbench};
pub use crate::transaction::{Request, Response, Word};
pub use crate::{tb_err, tb_log, tb_success, tb_warn};
