pub mod dist;
pub mod names;
pub mod time;

pub use dist::*;
pub use time::*;
