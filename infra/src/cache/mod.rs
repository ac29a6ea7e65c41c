//! Cache module - Redis-backed rotation store
//!
//! One hash per subject keyed `<prefix>:<subject_id>`, expiring with the
//! refresh token lifetime. Compare-and-advance runs as a Lua script so the
//! read and the write happen atomically on the server.

pub mod redis_rotation_store;

#[cfg(test)]
mod tests;

pub use redis_rotation_store::RedisRotationStore;
