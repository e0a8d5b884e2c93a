//! Builds one AES round, resolves its width and prints the tree.
//!
//! Run with `RUST_LOG=debug` to see the deferred block parameters commit.

use bitfunc_aes::{RoundKey, RoundLayers, BLOCK_BITS};
use bitfunc_core::NodeKind;
use env_logger::Env;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    // Deterministic key for reproducible output.
    let key = RoundKey::random(&mut ChaCha20Rng::from_seed([1u8; 32]));
    let layers = RoundLayers::new()?;
    let round = layers.round(&key)?;

    let width = round.width()?;
    assert_eq!(width, Some(BLOCK_BITS));

    if let NodeKind::Map(map) = layers.sub_bytes().kind() {
        println!("sub_bytes blocks: {:?}", map.blocks());
    }
    if let NodeKind::Perm(perm) = layers.shift_rows().kind() {
        println!("shift_rows block factor: {:?}", perm.block());
    }
    println!("round width: {width:?}");
    println!("{round}");
    Ok(())
}
