/*!
 * AES-GCM authenticated encryption with hex-encoded ciphertext
 *
 * [`AesGcm`] is a handle bound to one AES-128, AES-192 or AES-256 key.
 * Every encryption draws a fresh random 96-bit nonce, and the output is
 * `hex(nonce || ciphertext || tag)`. The [`service`] module offers the
 * same operations over a single process-wide handle.
 */

mod cipher;
mod keygen;
pub mod service;

pub use cipher::*;
pub use keygen::*;
