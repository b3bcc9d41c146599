mod cost;
mod partition;

pub use cost::*;
pub use partition::*;
