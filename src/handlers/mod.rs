pub mod auth;
pub mod crud;
pub mod file;
pub mod health;
