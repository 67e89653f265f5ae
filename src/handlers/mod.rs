pub mod archetypes;
pub mod cron;
pub mod dreams;
pub mod health;
pub mod reports;
