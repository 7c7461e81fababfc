use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Fixed salt the login endpoint expects.
const SALT: [u8; 16] = [83, 71, 26, 58, 54, 35, 22, 11, 83, 71, 26, 58, 54, 35, 22, 11];
const PBKDF2_ITERATIONS: u32 = 1000;
const KEY_LENGTH: usize = 32;
const IV_LENGTH: usize = 16;

// ── Login field encryption (PBKDF2-SHA1 + AES-256-CBC) ─────────────
// Format: base64(ciphertext), PKCS7 padded. Key and IV both come out of
// one 48-byte derivation from the app's encryption key.

pub fn encrypt(encryption_key: &str, plaintext: &str) -> Result<String> {
    let mut derived = [0u8; KEY_LENGTH + IV_LENGTH];
    pbkdf2_hmac::<Sha1>(
        encryption_key.as_bytes(),
        &SALT,
        PBKDF2_ITERATIONS,
        &mut derived,
    );
    let (key, iv) = derived.split_at(KEY_LENGTH);

    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| anyhow::anyhow!("initialising cipher: {e}"))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    Ok(STANDARD.encode(ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ciphertexts() {
        assert_eq!(
            encrypt("ekey", "user@example.com").unwrap(),
            "EC8YRrP5Os/M/ojyf+g0nNnMhqP8zY92js4a28xK1Sg="
        );
        assert_eq!(encrypt("ekey", "secret").unwrap(), "YhSif1xDVi5NeaDYqHz8Gg==");
        assert_eq!(encrypt("ekey", "19900101").unwrap(), "iwfzjNDhMOQ+zTry48ZXhA==");
    }

    #[test]
    fn test_empty_input_is_one_padding_block() {
        assert_eq!(encrypt("ekey", "").unwrap(), "3ouUGCM8etgAMzGUzyP+cA==");
    }

    #[test]
    fn test_key_changes_output() {
        assert_ne!(
            encrypt("ekey", "secret").unwrap(),
            encrypt("other", "secret").unwrap()
        );
    }
}
