pub use jot_core::Tendril;

pub mod commands;
pub mod document;
pub mod export;
pub mod gesture;
pub mod history;
pub mod render;
pub mod selection;
pub mod session;
pub mod sync;
pub mod transaction;
