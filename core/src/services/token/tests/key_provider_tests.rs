//! Tests for key loading and the correspondence probe

use jsonwebtoken::Algorithm;
use rotor_shared::JwtConfig;

use super::fixtures::*;
use crate::errors::{DomainError, KeyError};
use crate::services::token::{parse_algorithm, KeyProvider};

#[test]
fn test_loads_each_supported_family() {
    assert_eq!(rsa_keys().algorithm(), Algorithm::RS256);
    assert_eq!(ed_keys().algorithm(), Algorithm::EdDSA);

    let pss = KeyProvider::from_pem_strings(Algorithm::PS256, RSA_PRIVATE, RSA_PUBLIC).unwrap();
    assert_eq!(pss.algorithm(), Algorithm::PS256);

    let ec = KeyProvider::from_pem_strings(Algorithm::ES256, EC_PRIVATE, EC_PUBLIC).unwrap();
    assert_eq!(ec.algorithm(), Algorithm::ES256);
}

#[test]
fn test_rejects_symmetric_algorithms() {
    for name in ["HS256", "HS384", "HS512"] {
        assert!(matches!(
            parse_algorithm(name),
            Err(KeyError::UnsupportedAlgorithm { .. })
        ));
    }

    let result = KeyProvider::from_pem_strings(Algorithm::HS256, RSA_PRIVATE, RSA_PUBLIC);
    assert!(matches!(
        result,
        Err(DomainError::Key(KeyError::UnsupportedAlgorithm { .. }))
    ));
}

#[test]
fn test_parse_algorithm_names() {
    assert_eq!(parse_algorithm("RS256").unwrap(), Algorithm::RS256);
    assert_eq!(parse_algorithm(" EdDSA ").unwrap(), Algorithm::EdDSA);
    assert!(parse_algorithm("none").is_err());
    assert!(parse_algorithm("rs256x").is_err());
}

#[test]
fn test_mismatched_halves_fail_fast() {
    let result = KeyProvider::from_pem_strings(Algorithm::RS256, RSA_PRIVATE, OTHER_RSA_PUBLIC);
    assert!(matches!(result, Err(DomainError::Key(KeyError::KeyMismatch))));
}

#[test]
fn test_malformed_pem_is_load_error() {
    let result = KeyProvider::from_pem_strings(Algorithm::RS256, "not a key", RSA_PUBLIC);
    assert!(matches!(
        result,
        Err(DomainError::Key(KeyError::KeyLoadError { .. }))
    ));
}

#[test]
fn test_key_family_must_match_algorithm() {
    let result = KeyProvider::from_pem_strings(Algorithm::RS256, EC_PRIVATE, EC_PUBLIC);
    assert!(matches!(
        result,
        Err(DomainError::Key(KeyError::KeyLoadError { .. }))
    ));
}

#[test]
fn test_load_from_config_files() {
    let config = JwtConfig {
        key_id: Some("2024-01".to_string()),
        ..JwtConfig::new(fixture_path("rsa_private.pem"), fixture_path("rsa_public.pem"))
    };

    let keys = KeyProvider::load(&config).unwrap();
    assert_eq!(keys.algorithm(), Algorithm::RS256);
    assert_eq!(keys.key_id(), Some("2024-01"));
}

#[test]
fn test_load_missing_file() {
    let config = JwtConfig::new("/nonexistent/private.pem", "/nonexistent/public.pem");
    let err = KeyProvider::load(&config).unwrap_err();

    assert!(matches!(err, DomainError::Key(KeyError::KeyLoadError { .. })));
    assert!(err.to_string().contains("/nonexistent/private.pem"));
}

#[test]
fn test_load_rejects_unknown_algorithm_before_reading_files() {
    let config = JwtConfig::new("/nonexistent/a.pem", "/nonexistent/b.pem").with_algorithm("HS256");
    assert!(matches!(
        KeyProvider::load(&config),
        Err(DomainError::Key(KeyError::UnsupportedAlgorithm { .. }))
    ));
}

#[test]
fn test_sign_and_verify() {
    let keys = ed_keys();
    let signature = keys.sign(b"payload").unwrap();

    assert!(keys.verify(&signature, b"payload"));
    assert!(!keys.verify(&signature, b"other payload"));
    assert!(!keys.verify("bogus", b"payload"));
}

#[test]
fn test_debug_hides_key_material() {
    let debug = format!("{:?}", rsa_keys().with_key_id("k1"));

    assert!(debug.contains("RS256"));
    assert!(debug.contains("k1"));
    assert!(!debug.contains("PRIVATE"));
    assert!(!debug.contains("encoding_key"));
}

#[test]
fn test_debug_names_key_files() {
    let private_path = fixture_path("rsa_private.pem");
    let public_path = fixture_path("rsa_public.pem");
    let keys = KeyProvider::from_files(Algorithm::RS256, &private_path, &public_path).unwrap();

    let debug = format!("{:?}", keys);
    assert!(debug.contains("Files"));
    assert!(debug.contains(&private_path));
    assert!(debug.contains(&public_path));

    assert!(format!("{:?}", rsa_keys()).contains("Memory"));
}

#[test]
fn test_clones_share_material() {
    let keys = rsa_keys();
    let clone = keys.clone();
    let signature = keys.sign(b"shared").unwrap();

    assert!(clone.verify(&signature, b"shared"));
}
