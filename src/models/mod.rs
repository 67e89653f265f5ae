pub mod dream;
pub mod report;
