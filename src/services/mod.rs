pub mod auth_client;
pub mod base;
pub mod database;
pub mod dto;
pub mod file;
pub mod storage;
pub mod user;
