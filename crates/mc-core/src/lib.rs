pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod expansion;
pub mod feed;
pub mod io;
pub mod load;
pub mod paths;
pub mod project;
pub mod stage;
pub mod types;
pub mod validate;

pub use error::{McError, Result};
