//! Domain layer containing the token session entities.

pub mod entities;

pub use entities::*;
