mod key_provider_tests;

pub(super) mod fixtures {
    use jsonwebtoken::Algorithm;

    use crate::services::token::KeyProvider;

    pub const RSA_PRIVATE: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rsa_private.pem"));
    pub const RSA_PUBLIC: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rsa_public.pem"));
    pub const OTHER_RSA_PUBLIC: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/other_rsa_public.pem"));
    pub const EC_PRIVATE: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ec_private.pem"));
    pub const EC_PUBLIC: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ec_public.pem"));
    pub const ED_PRIVATE: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ed25519_private.pem"));
    pub const ED_PUBLIC: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ed25519_public.pem"));

    pub fn rsa_keys() -> KeyProvider {
        KeyProvider::from_pem_strings(Algorithm::RS256, RSA_PRIVATE, RSA_PUBLIC).unwrap()
    }

    pub fn ed_keys() -> KeyProvider {
        KeyProvider::from_pem_strings(Algorithm::EdDSA, ED_PRIVATE, ED_PUBLIC).unwrap()
    }

    pub fn fixture_path(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }
}
