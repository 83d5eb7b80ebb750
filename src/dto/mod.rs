pub mod auth;
pub mod base;
pub mod file;
pub mod filter;
