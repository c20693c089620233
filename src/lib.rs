//! Product catalog service: users, categories and products over Postgres,
//! with a cache-aside inventory report.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
