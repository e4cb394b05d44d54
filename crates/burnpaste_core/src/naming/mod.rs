//! Utilities for generating short, unguessable paste ids.

use crate::constants::{PASTE_ID_LEN, PASTE_KEY_PREFIX};
use rand::Rng;

/// URL-safe alphabet (64 symbols, 6 bits of entropy per character).
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Produces public identifiers for new pastes.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random ids drawn from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        generate_paste_id()
    }
}

/// Generate a fresh random paste id of [`PASTE_ID_LEN`] characters.
pub fn generate_paste_id() -> String {
    let mut rng = rand::thread_rng();
    (0..PASTE_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Whether `id` could have been produced by [`generate_paste_id`].
pub fn is_valid_paste_id(id: &str) -> bool {
    id.len() == PASTE_ID_LEN && id.bytes().all(|b| ID_ALPHABET.contains(&b))
}

/// Store key for a paste id.
pub fn paste_key(id: &str) -> String {
    format!("{}{}", PASTE_KEY_PREFIX, id)
}
