pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod portal;
pub mod services;
