pub mod args;
pub mod client;
pub mod completion;
pub mod driver;
pub mod exec;
pub mod logging;
pub mod pending;
pub mod status;

pub use args::{Operation, ParseError, ParsedArguments};
pub use completion::AwaitableCompletion;
pub use pending::{FutureStatus, Pending, PendingBase};
pub use status::{Code, OpError, error_name};
