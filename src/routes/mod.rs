pub mod audit_logs;
pub mod auth;
pub mod bootstrap;
pub mod dashboard;
pub mod departments;
pub mod expenses;
pub mod health;
pub mod roles;
pub mod settings;
pub mod tasks;
pub mod trips;
pub mod units;
pub mod users;
