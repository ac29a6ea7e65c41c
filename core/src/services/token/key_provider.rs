//! Asymmetric key loading for JWT signing and verification

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey};
use rotor_shared::JwtConfig;

use crate::errors::{DomainError, KeyError};

/// Payload signed and verified once at load to prove the halves belong together
const PROBE_MESSAGE: &[u8] = b"rotor key correspondence probe";

/// Where the key material came from
#[derive(Clone)]
enum KeySource {
    Files {
        private_key_path: PathBuf,
        public_key_path: PathBuf,
    },
    Memory,
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Files {
                private_key_path,
                public_key_path,
            } => f
                .debug_struct("Files")
                .field("private_key_path", &private_key_path.display())
                .field("public_key_path", &public_key_path.display())
                .finish(),
            KeySource::Memory => f.write_str("Memory"),
        }
    }
}

#[derive(Clone)]
struct KeyMaterial {
    algorithm: Algorithm,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    source: KeySource,
}

/// Holds the process signing keypair
///
/// Loaded once at startup and immutable afterwards. Cloning shares the
/// same key material.
#[derive(Clone)]
pub struct KeyProvider {
    inner: Arc<KeyMaterial>,
}

impl std::fmt::Debug for KeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyProvider")
            .field("algorithm", &self.inner.algorithm)
            .field("key_id", &self.inner.key_id)
            .field("source", &self.inner.source)
            .finish()
    }
}

impl KeyProvider {
    /// Loads the keypair described by a JWT configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Algorithm, key file locations and optional key id
    ///
    /// # Returns
    ///
    /// * `Ok(KeyProvider)` - Keys loaded and verified to correspond
    /// * `Err(DomainError)` - Unsupported algorithm, unreadable or malformed
    ///   key material, or halves that do not match
    pub fn load(config: &JwtConfig) -> Result<Self, DomainError> {
        let algorithm = parse_algorithm(&config.algorithm)?;
        let provider = Self::from_files(algorithm, &config.private_key_path, &config.public_key_path)?;

        Ok(match &config.key_id {
            Some(kid) => provider.with_key_id(kid.clone()),
            None => provider,
        })
    }

    /// Loads the keypair from PEM files
    pub fn from_files<P: AsRef<Path>>(
        algorithm: Algorithm,
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, DomainError> {
        let private_key_path = private_key_path.as_ref().to_path_buf();
        let public_key_path = public_key_path.as_ref().to_path_buf();

        let private_key_pem = fs::read(&private_key_path).map_err(|e| KeyError::KeyLoadError {
            message: format!("Failed to read private key {}: {}", private_key_path.display(), e),
        })?;
        let public_key_pem = fs::read(&public_key_path).map_err(|e| KeyError::KeyLoadError {
            message: format!("Failed to read public key {}: {}", public_key_path.display(), e),
        })?;

        Self::build(
            algorithm,
            &private_key_pem,
            &public_key_pem,
            KeySource::Files {
                private_key_path,
                public_key_path,
            },
        )
    }

    /// Creates a provider from PEM strings (useful for testing or embedded keys)
    pub fn from_pem_strings(
        algorithm: Algorithm,
        private_key_pem: &str,
        public_key_pem: &str,
    ) -> Result<Self, DomainError> {
        Self::build(
            algorithm,
            private_key_pem.as_bytes(),
            public_key_pem.as_bytes(),
            KeySource::Memory,
        )
    }

    /// Sets the key id written to token headers
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).key_id = Some(key_id.into());
        self
    }

    fn build(
        algorithm: Algorithm,
        private_key_pem: &[u8],
        public_key_pem: &[u8],
        source: KeySource,
    ) -> Result<Self, DomainError> {
        ensure_asymmetric(algorithm)?;

        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => (
                EncodingKey::from_rsa_pem(private_key_pem).map_err(invalid_private_key)?,
                DecodingKey::from_rsa_pem(public_key_pem).map_err(invalid_public_key)?,
            ),
            Algorithm::ES256 | Algorithm::ES384 => (
                EncodingKey::from_ec_pem(private_key_pem).map_err(invalid_private_key)?,
                DecodingKey::from_ec_pem(public_key_pem).map_err(invalid_public_key)?,
            ),
            Algorithm::EdDSA => (
                EncodingKey::from_ed_pem(private_key_pem).map_err(invalid_private_key)?,
                DecodingKey::from_ed_pem(public_key_pem).map_err(invalid_public_key)?,
            ),
            other => {
                return Err(KeyError::UnsupportedAlgorithm {
                    algorithm: format!("{:?}", other),
                }
                .into())
            }
        };

        let provider = Self {
            inner: Arc::new(KeyMaterial {
                algorithm,
                key_id: None,
                encoding_key,
                decoding_key,
                source,
            }),
        };
        provider.check_correspondence()?;

        Ok(provider)
    }

    fn check_correspondence(&self) -> Result<(), DomainError> {
        let signature = self.sign(PROBE_MESSAGE).map_err(|_| KeyError::KeyLoadError {
            message: format!("Private key cannot sign with {:?}", self.inner.algorithm),
        })?;

        if self.verify(&signature, PROBE_MESSAGE) {
            Ok(())
        } else {
            Err(KeyError::KeyMismatch.into())
        }
    }

    /// Signs `message` with the private key, returning a base64url signature
    pub fn sign(&self, message: &[u8]) -> Result<String, DomainError> {
        crypto::sign(message, &self.inner.encoding_key, self.inner.algorithm).map_err(|e| {
            DomainError::Internal {
                message: format!("Signing failed: {}", e),
            }
        })
    }

    /// Verifies a base64url `signature` over `message` with the public key
    pub fn verify(&self, signature: &str, message: &[u8]) -> bool {
        crypto::verify(signature, message, &self.inner.decoding_key, self.inner.algorithm)
            .unwrap_or(false)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.inner.algorithm
    }

    pub fn key_id(&self) -> Option<&str> {
        self.inner.key_id.as_deref()
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }
}

/// Parses a configured algorithm name, accepting only asymmetric algorithms
pub fn parse_algorithm(name: &str) -> Result<Algorithm, KeyError> {
    let algorithm = Algorithm::from_str(name.trim()).map_err(|_| KeyError::UnsupportedAlgorithm {
        algorithm: name.to_string(),
    })?;
    ensure_asymmetric(algorithm)?;
    Ok(algorithm)
}

fn ensure_asymmetric(algorithm: Algorithm) -> Result<(), KeyError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Err(KeyError::UnsupportedAlgorithm {
                algorithm: format!("{:?}", algorithm),
            })
        }
        _ => Ok(()),
    }
}

fn invalid_private_key(e: jsonwebtoken::errors::Error) -> KeyError {
    KeyError::KeyLoadError {
        message: format!("Invalid private key format: {}", e),
    }
}

fn invalid_public_key(e: jsonwebtoken::errors::Error) -> KeyError {
    KeyError::KeyLoadError {
        message: format!("Invalid public key format: {}", e),
    }
}
