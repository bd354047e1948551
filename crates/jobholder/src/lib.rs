pub mod common;
pub mod holder;

pub type Error = crate::common::error::HolderError;
pub type Result<T> = std::result::Result<T, Error>;

pub const JOBHOLDER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod tests;
