pub mod complaints;
pub mod error;
pub mod issues;
pub mod policy;
pub mod storage;

mod time;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
