pub mod identity;
pub mod rotation;

pub use identity::{IdentityDirectory, InMemoryIdentityDirectory};
pub use rotation::{InMemoryRotationStore, RotationStore};
