//! Stored-secret verification via bcrypt.

/// bcrypt cost factor used when hashes are written.
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, BCRYPT_COST)
}

/// Compare a presented secret against a stored bcrypt hash.
///
/// Only called when a hash exists; federated principals have no stored
/// secret and skip this check by policy.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}
