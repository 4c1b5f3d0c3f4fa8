pub mod dispatch;
pub mod error;
pub mod manifest;
pub mod worker;

pub use error::DispatchError;
pub use worker::run;
