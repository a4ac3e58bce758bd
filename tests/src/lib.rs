mod flaky_driver;
pub use flaky_driver::FlakyDriver;

mod logging_driver;
pub use logging_driver::{DriverOp, LoggingDriver, OpsLog};

pub mod prelude;

pub mod setup;
