pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod grouping;
pub mod lists;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod spaces;
pub mod storage;
pub mod tasks;

pub use error::{Error, Result};
