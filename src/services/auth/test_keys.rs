//! Shared RSA test keys. Generated once per test binary; 2048-bit keygen is
//! slow enough in debug builds to be worth sharing.

use std::sync::{Arc, LazyLock};

use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

use crate::config::TokenAlgorithm;
use crate::services::auth::jwt::TokenCodec;
use crate::services::auth::keys::KeyMaterial;

pub(crate) static TEST_RSA_PEMS: LazyLock<(String, String)> = LazyLock::new(|| {
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, 2048).expect("generate test rsa key");
    let public = private.to_public_key();
    (
        private
            .to_pkcs8_pem(LineEnding::LF)
            .expect("encode test private key")
            .to_string(),
        public
            .to_public_key_pem(LineEnding::LF)
            .expect("encode test public key"),
    )
});

pub(crate) fn rs256_key_material() -> Arc<KeyMaterial> {
    let (private_pem, public_pem) = &*TEST_RSA_PEMS;
    Arc::new(
        KeyMaterial::new(TokenAlgorithm::Rs256, private_pem, Some(public_pem))
            .expect("test key material"),
    )
}

pub(crate) fn rs256_codec(issuer: &str, audience: &str) -> TokenCodec {
    TokenCodec::new(
        rs256_key_material(),
        issuer.to_string(),
        audience.to_string(),
    )
}
