//! JaCoCo integration: the execution data codec, the in-memory store, and the
//! `jacococli.jar` driver that turns class files into a coverage model.

pub mod exec;
pub mod store;
pub mod tool;
pub mod xml;

pub use exec::ExecFileLoader;
pub use store::{ExecutionData, ExecutionStore, SessionInfo};
pub use tool::JacocoCli;
