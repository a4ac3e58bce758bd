//! Common imports for test files
//!
//! `use tests::prelude::*;`

pub use crate::setup::{build, build_logged, shop};
pub use crate::{DriverOp, FlakyDriver, LoggingDriver};

pub use serde_json::json;
pub use weave::{Db, Input, Instance, Persistable, Value};
pub use weave_driver_memory::Memory;
