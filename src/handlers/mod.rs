pub mod auth;
pub mod health;
pub mod streaks;
pub mod subscriptions;
pub mod workouts;
