use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use serde::Serialize;
use thiserror::Error;

use crate::config::TokenAlgorithm;

/// Fixed key id published in JWT headers and the JWKS document. Only one
/// active key exists, so the id never varies.
pub const KEY_ID: &str = "sst";

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid private key for {algorithm}: {detail}")]
    InvalidPrivateKey {
        algorithm: &'static str,
        detail: String,
    },

    #[error("invalid public key for {algorithm}: {detail}")]
    InvalidPublicKey {
        algorithm: &'static str,
        detail: String,
    },

    #[error("no public jwk exists for a symmetric signing key")]
    NoPublicJwk,
}

/// Public half of an RSA signing key in JWK form.
#[derive(Debug, Clone, Serialize)]
pub struct PublicJwk {
    pub kty: &'static str,
    pub n: String,
    pub e: String,
}

/// Process-lifetime signing key material with explicit algorithm binding.
///
/// Loaded once at startup; construction fails on a malformed key or an
/// algorithm/key-type mismatch so the process never serves auth endpoints
/// with unusable keys. The public JWK is derived here once — there is no
/// rotation mechanism that could invalidate it.
pub struct KeyMaterial {
    algorithm: TokenAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_jwk: Option<PublicJwk>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl KeyMaterial {
    /// `private_key_pem` is a PKCS#8 PEM for RS256 or the shared secret for
    /// HS256. `public_key_pem` (SPKI PEM) is required for RS256.
    pub fn new(
        algorithm: TokenAlgorithm,
        private_key_pem: &str,
        public_key_pem: Option<&str>,
    ) -> Result<Self, KeyError> {
        match algorithm {
            TokenAlgorithm::Rs256 => {
                let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
                    .map_err(|e| KeyError::InvalidPrivateKey {
                        algorithm: "RS256",
                        detail: e.to_string(),
                    })?;

                let public_pem = public_key_pem.ok_or(KeyError::InvalidPublicKey {
                    algorithm: "RS256",
                    detail: "public key is required".to_string(),
                })?;
                let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| {
                    KeyError::InvalidPublicKey {
                        algorithm: "RS256",
                        detail: e.to_string(),
                    }
                })?;

                let public_jwk = Some(derive_rsa_jwk(public_pem)?);

                Ok(Self {
                    algorithm,
                    encoding_key,
                    decoding_key,
                    public_jwk,
                })
            }
            TokenAlgorithm::Hs256 => Ok(Self {
                algorithm,
                encoding_key: EncodingKey::from_secret(private_key_pem.as_bytes()),
                decoding_key: DecodingKey::from_secret(private_key_pem.as_bytes()),
                public_jwk: None,
            }),
        }
    }

    pub fn algorithm(&self) -> TokenAlgorithm {
        self.algorithm
    }

    pub fn jwt_algorithm(&self) -> Algorithm {
        match self.algorithm {
            TokenAlgorithm::Rs256 => Algorithm::RS256,
            TokenAlgorithm::Hs256 => Algorithm::HS256,
        }
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// The startup-derived public JWK; fails for symmetric keys, which have
    /// nothing publishable.
    pub fn public_jwk(&self) -> Result<&PublicJwk, KeyError> {
        self.public_jwk.as_ref().ok_or(KeyError::NoPublicJwk)
    }
}

// Project the SPKI PEM into JWK fields: base64url modulus/exponent without
// padding, big-endian bytes.
fn derive_rsa_jwk(public_key_pem: &str) -> Result<PublicJwk, KeyError> {
    let public_key =
        RsaPublicKey::from_public_key_pem(public_key_pem).map_err(|e| KeyError::InvalidPublicKey {
            algorithm: "RS256",
            detail: e.to_string(),
        })?;

    Ok(PublicJwk {
        kty: "RSA",
        n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
    })
}
