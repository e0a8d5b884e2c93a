//! Key material supplied to the expression builders.

use rand::{CryptoRng, RngCore};

use crate::gf::sbox;

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

/// AES-128 cipher key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aes128Key(pub [u8; 16]);

impl From<[u8; 16]> for Aes128Key {
    fn from(value: [u8; 16]) -> Self {
        Self(value)
    }
}

/// One 128-bit round key, embedded in the tree as an XOR constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundKey(pub [u8; 16]);

impl RoundKey {
    /// Draws a round key from `rng`.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl From<[u8; 16]> for RoundKey {
    fn from(value: [u8; 16]) -> Self {
        Self(value)
    }
}

/// The 11 round keys of AES-128.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundKeys(pub [RoundKey; 11]);

impl RoundKeys {
    /// Returns the round key at the requested index (0..=10).
    #[inline]
    pub fn get(&self, round: usize) -> &RoundKey {
        &self.0[round]
    }

    /// All round keys in order.
    pub fn as_slice(&self) -> &[RoundKey] {
        &self.0
    }
}

fn sub_word(word: u32) -> u32 {
    u32::from_be_bytes(word.to_be_bytes().map(sbox))
}

/// Expands a 128-bit key into 11 round keys.
pub fn expand_key(key: &Aes128Key) -> RoundKeys {
    let mut w = [0u32; 44];
    for (word, chunk) in w.iter_mut().zip(key.0.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for i in 4..44 {
        let mut temp = w[i - 1];
        if i % 4 == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ (u32::from(RCON[(i / 4) - 1]) << 24);
        }
        w[i] = w[i - 4] ^ temp;
    }

    let mut round_keys = [RoundKey([0u8; 16]); 11];
    for (round, key) in round_keys.iter_mut().enumerate() {
        for (word_idx, bytes) in key.0.chunks_exact_mut(4).enumerate() {
            bytes.copy_from_slice(&w[round * 4 + word_idx].to_be_bytes());
        }
    }

    RoundKeys(round_keys)
}
