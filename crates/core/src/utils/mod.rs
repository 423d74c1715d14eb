pub mod clock;
pub mod time_utils;
