pub mod common;
pub mod month;
pub mod period;
pub mod subscription;

pub use common::*;
pub use month::*;
pub use period::*;
pub use subscription::*;
