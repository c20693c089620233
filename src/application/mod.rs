//! Application services layer.

pub mod categories;
pub mod error;
pub mod pagination;
pub mod products;
pub mod repos;
pub mod users;
