//! MySQL implementations of the rotation store and identity directory

pub mod identity_directory_impl;
pub mod rotation_store_impl;

pub use identity_directory_impl::MySqlIdentityDirectory;
pub use rotation_store_impl::MySqlRotationStore;
