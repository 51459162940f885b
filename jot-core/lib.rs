use smartstring::{LazyCompact, SmartString};

pub mod block;
pub mod line;
pub mod text;

pub type Tendril = SmartString<LazyCompact>;
