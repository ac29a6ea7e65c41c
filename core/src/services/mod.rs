//! Business services

pub mod token;

pub use token::{
    Clock, KeyProvider, ManualClock, RotationCleanupConfig, RotationCleanupService, SystemClock,
    TokenCodec, TokenService, TokenServiceConfig,
};
