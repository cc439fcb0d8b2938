#![no_main]

use aesgcm::aes::{AesGcm, NONCE_SIZE, TAG_SIZE};
use aesgcm::error::CryptoError;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct AesGcmFuzzInput {
    key: Vec<u8>,
    plaintext: Vec<u8>,
    ciphertext_hex: String,
    associated_data: Option<Vec<u8>>,
    flip: Option<(usize, u8)>,
}

fuzz_target!(|input: AesGcmFuzzInput| {
    // Arbitrary key lengths must be rejected cleanly
    let cipher = match AesGcm::new(&input.key) {
        Ok(cipher) => cipher,
        Err(CryptoError::InvalidKeySize { .. }) => return,
        Err(e) => panic!("unexpected construction error: {}", e),
    };

    // Untrusted ciphertext text must never panic
    let _ = cipher.decrypt(&input.ciphertext_hex);

    let aad = input.associated_data.as_deref();
    let Ok(ciphertext) = cipher.encrypt_with_aad(&input.plaintext, aad) else {
        return;
    };
    assert_eq!(
        ciphertext.len(),
        2 * (NONCE_SIZE + input.plaintext.len() + TAG_SIZE)
    );

    let decrypted = cipher.decrypt_with_aad(&ciphertext, aad).expect("round trip");
    assert_eq!(decrypted, input.plaintext);

    if let Some((position, mask)) = input.flip.filter(|&(_, mask)| mask != 0) {
        let mut raw = hex::decode(&ciphertext).expect("valid hex");
        let index = position % raw.len();
        raw[index] ^= mask;
        assert!(cipher.decrypt_with_aad(&hex::encode(raw), aad).is_err());
    }
});
