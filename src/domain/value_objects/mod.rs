pub mod calendar_dates;
pub mod subscriptions;
