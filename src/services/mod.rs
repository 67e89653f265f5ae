pub mod monthly_report;
pub mod store;
pub mod worker;
