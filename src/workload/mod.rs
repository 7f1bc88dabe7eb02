//! Workload definitions
//!
//! - Operation: the unit of work driven by the workers
//! - Built-in operations selectable from the command line

pub mod builtin;
pub mod operation;
pub mod workload_type;

pub use builtin::{CommandOperation, SleepOperation, SpinOperation, TcpConnectOperation};
pub use operation::{Operation, Outcome, Sample};
pub use workload_type::WorkloadType;
