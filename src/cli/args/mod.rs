mod execinfo;
mod list;
mod project;
mod tools;

pub use execinfo::ExecInfoArgs;
pub use list::ListArgs;
pub use project::ProjectArgs;
pub use tools::ToolArgs;
