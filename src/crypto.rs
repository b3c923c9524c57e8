//! Encryption of the web nonce for the legacy `AuthenticateUser` login.

use crate::error::{Error, Result};
use aes::Aes256;
use aes::cipher::{BlockEncrypt, KeyInit, generic_array::GenericArray};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rsa::{Oaep, RsaPublicKey};
use rsa::pkcs8::DecodePublicKey;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Steam's public key for the public universe.
const STEAM_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIGdMA0GCSqGSIb3DQEBAQUAA4GLADCBhwKBgQDf7BrWLBBmLBc1OhSwfFkRf53T
2Ct64+AVzRkeRuh7h3SiGEYxqQMUeYKO6UWiSRKpI2hzic9pobFhRr3Bvr/WARvY
gdTckPv+T1JzZsuVcNfFjrocejN1oWI0Rrtgt4Bo+hOneoo3S57G9F1fOpn5nsQ6
6WOiu4gZKODnFMBCiQIBEQ==
-----END PUBLIC KEY-----";

/// A random AES-256 key along with the same key encrypted for Steam.
pub struct SessionKey {
    /// The key used to encrypt the login key.
    pub plain: [u8; 32],
    /// `plain` encrypted with Steam's public key, sent as the `sessionkey` field.
    pub encrypted: Vec<u8>,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

/// Generates a fresh session key. Never reuse one across requests.
pub fn generate_session_key() -> Result<SessionKey> {
    let mut rng = rand::thread_rng();
    let mut plain = [0u8; 32];

    rng.fill_bytes(&mut plain);

    let public_key = RsaPublicKey::from_public_key_pem(STEAM_PUBLIC_KEY)
        .map_err(|error| Error::Crypto(error.to_string()))?;
    let encrypted = public_key.encrypt(&mut rng, Oaep::new::<Sha1>(), &plain)?;

    Ok(SessionKey {
        plain,
        encrypted,
    })
}

/// Encrypts `input` with AES-256-CBC using an IV derived from an HMAC of the input.
///
/// The IV is the first 13 bytes of `HMAC-SHA1(key[..16], random ++ input)` followed by the 3
/// random bytes. The output is the IV encrypted with AES-256-ECB followed by the ciphertext.
pub fn symmetric_encrypt_with_hmac_iv(input: &[u8], key: &[u8; 32]) -> Result<Vec<u8>> {
    let mut random = [0u8; 3];

    rand::thread_rng().fill_bytes(&mut random);

    let mut mac = <HmacSha1 as Mac>::new_from_slice(&key[..16])
        .map_err(|error| Error::Crypto(error.to_string()))?;

    mac.update(&random);
    mac.update(input);

    let digest = mac.finalize().into_bytes();
    let mut iv = [0u8; 16];

    iv[..13].copy_from_slice(&digest[..13]);
    iv[13..].copy_from_slice(&random);

    Ok(symmetric_encrypt(input, key, &iv))
}

fn symmetric_encrypt(input: &[u8], key: &[u8; 32], iv: &[u8; 16]) -> Vec<u8> {
    let mut block = GenericArray::clone_from_slice(iv);

    <Aes256 as KeyInit>::new(GenericArray::from_slice(key)).encrypt_block(&mut block);

    let ciphertext = Aes256CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(input);
    let mut output = Vec::with_capacity(block.len() + ciphertext.len());

    output.extend_from_slice(&block);
    output.extend_from_slice(&ciphertext);
    output
}
