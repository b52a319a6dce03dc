//! Credential digests required by the SLID endpoints
//!
//! MD5 and SHA-1 are fixed by the upstream protocol. These are wire
//! encodings, not a security measure of this crate.

use md5::Md5;
use sha1::{Digest, Sha1};

/// Secret sent to `getCode`: hex MD5 of the application secret
pub fn app_code_secret(secret: &str) -> String {
    md5_hex(secret.as_bytes())
}

/// Secret sent to `getToken`: hex MD5 of the application secret followed
/// by the application code
pub fn app_token_secret(secret: &str, code: &str) -> String {
    let mut input = String::with_capacity(secret.len() + code.len());
    input.push_str(secret);
    input.push_str(code);
    md5_hex(input.as_bytes())
}

/// Password field sent to `user/login`: hex SHA-1 of the password
pub fn password_digest(password: &str) -> String {
    let mut h = Sha1::new();
    h.update(password.as_bytes());
    hex::encode(h.finalize())
}

fn md5_hex(data: &[u8]) -> String {
    let mut h = Md5::new();
    h.update(data);
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_code_secret() {
        assert_eq!(
            app_code_secret("secret key"),
            "a7656fafe94dae72b1e1487670148412"
        );
        assert_eq!(app_code_secret(""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_app_token_secret_appends_code() {
        assert_eq!(
            app_token_secret("secret key", "C1"),
            "b0d46686d79ee5739d1ea10b49e51c68"
        );
        assert_eq!(
            app_token_secret("s3cr3t", "C1"),
            "96684047f9ab1b9582fa116e9985a565"
        );
    }

    #[test]
    fn test_password_digest() {
        assert_eq!(
            password_digest("password"),
            "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8"
        );
        assert_eq!(
            password_digest("hunter2"),
            "f3bbbd66a63d4bf1747940578ec3d0103530e21d"
        );
    }
}
