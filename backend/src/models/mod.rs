pub mod attendance;
pub mod time;


pub use attendance::*;
pub use time::*;
