pub mod audit;
pub mod domain;
pub mod org;
pub mod rbac;
pub mod settings;
pub mod user;
