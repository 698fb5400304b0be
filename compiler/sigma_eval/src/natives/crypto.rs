//! `Crypto`: SHA-2 digests and AES-256-CBC.
//!
//! Ciphertexts are `iv || ciphertext` with a random 16-byte IV and PKCS#7
//! padding. Keys are 32-byte binary values.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};

use super::{Args, NativeLibrary};
use crate::errors::{native_error, EvalError};
use crate::value::Value;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

pub(crate) fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

pub(crate) fn sha512_hex(text: &str) -> String {
    hex::encode(Sha512::digest(text.as_bytes()))
}

pub(crate) fn generate_key() -> Vec<u8> {
    let mut key = vec![0u8; KEY_LEN];
    rand::thread_rng().fill_bytes(&mut key);
    key
}

fn check_key(function: &'static str, key: &[u8]) -> Result<(), EvalError> {
    if key.len() == KEY_LEN {
        Ok(())
    } else {
        Err(native_error(
            function,
            format!("key must be {KEY_LEN} bytes, got {}", key.len()),
        ))
    }
}

pub(crate) fn encrypt(plaintext: &str, key: &[u8]) -> Result<Vec<u8>, EvalError> {
    check_key("AES256Encrypt", key)?;
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);
    let cipher = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|e| native_error("AES256Encrypt", e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub(crate) fn decrypt(data: &[u8], key: &[u8]) -> Result<String, EvalError> {
    check_key("AES256Decrypt", key)?;
    if data.len() < IV_LEN {
        return Err(native_error("AES256Decrypt", "ciphertext is shorter than the IV"));
    }
    let (iv, ciphertext) = data.split_at(IV_LEN);
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| native_error("AES256Decrypt", e.to_string()))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| native_error("AES256Decrypt", "wrong key or corrupted ciphertext"))?;
    String::from_utf8(plaintext)
        .map_err(|_| native_error("AES256Decrypt", "plaintext is not valid UTF-8"))
}

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Crypto")
        .with_fn("SHA256", |interp, args| {
            let text = Args::new("SHA256", args).string(interp, 0)?;
            Ok(Some(interp.alloc(Value::Str(sha256_hex(&text)))))
        })
        .with_fn("SHA512", |interp, args| {
            let text = Args::new("SHA512", args).string(interp, 0)?;
            Ok(Some(interp.alloc(Value::Str(sha512_hex(&text)))))
        })
        .with_fn("AES256Encrypt", |interp, args| {
            let args = Args::new("AES256Encrypt", args);
            let plaintext = args.string(interp, 0)?;
            let key = args.binary(interp, 1)?;
            let sealed = encrypt(&plaintext, &key)?;
            Ok(Some(interp.alloc(Value::Binary(sealed))))
        })
        .with_fn("AES256Decrypt", |interp, args| {
            let args = Args::new("AES256Decrypt", args);
            let sealed = args.binary(interp, 0)?;
            let key = args.binary(interp, 1)?;
            let plaintext = decrypt(&sealed, &key)?;
            Ok(Some(interp.alloc(Value::Str(plaintext))))
        })
        .with_fn("AES256GenKey", |interp, _args| {
            Ok(Some(interp.alloc(Value::Binary(generate_key()))))
        })
}
