pub mod calendar;
pub mod streak;
