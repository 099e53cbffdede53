//! Request handlers.

pub mod characters;
pub mod health;
pub mod projects;

pub use characters::*;
pub use health::*;
pub use projects::*;
