//! GF(2^8) arithmetic and the substitution tables derived from it.

/// Doubles `byte` in GF(2^8) modulo the AES polynomial.
#[inline]
pub fn xtime(byte: u8) -> u8 {
    let shifted = byte << 1;
    if byte & 0x80 != 0 {
        shifted ^ 0x1b
    } else {
        shifted
    }
}

/// Multiplies two field elements.
pub fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    product
}

/// Multiplicative inverse, with `0` mapped to `0`.
pub fn inverse(a: u8) -> u8 {
    // a^254 = a^-1 since the multiplicative group has order 255.
    let mut result = 1u8;
    let mut base = a;
    let mut exp = 254u8;
    while exp != 0 {
        if exp & 1 != 0 {
            result = gmul(result, base);
        }
        base = gmul(base, base);
        exp >>= 1;
    }
    result
}

/// AES S-box: field inversion followed by the FIPS-197 affine map.
pub fn sbox(x: u8) -> u8 {
    let b = inverse(x);
    b ^ b.rotate_left(1) ^ b.rotate_left(2) ^ b.rotate_left(3) ^ b.rotate_left(4) ^ 0x63
}

/// The full S-box as a substitution table.
pub fn sbox_table() -> Vec<usize> {
    (0..=255u8).map(|x| usize::from(sbox(x))).collect()
}

/// Table for multiplication by `k`.
///
/// Only invertible for `k != 0`; the zero table is not a permutation but is
/// still a valid 8-bit substitution.
pub fn mul_table(k: u8) -> Vec<usize> {
    (0..=255u8).map(|x| usize::from(gmul(x, k))).collect()
}
