//! Handlers 模块

pub mod auth;
pub mod health;
pub mod metrics;
pub mod users;

pub use auth::*;
pub use health::*;
pub use metrics::*;
pub use users::*;
