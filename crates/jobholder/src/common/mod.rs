pub mod cli;
pub mod error;
pub mod manager;
pub mod parser;
pub mod setup;
pub mod utils;
pub mod wrapped;

pub use wrapped::WrappedRcRefCell;
