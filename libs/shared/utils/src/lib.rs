pub mod date;
pub mod logging;
pub mod test_utils;

pub use date::{truncate_to_day, Clock, FixedClock, SystemClock};
