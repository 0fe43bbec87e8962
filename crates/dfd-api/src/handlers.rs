//! Request handlers.

pub mod detect;
pub mod health;
pub mod models;

pub use detect::*;
pub use health::*;
pub use models::*;
