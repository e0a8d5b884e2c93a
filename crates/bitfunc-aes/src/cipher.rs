//! Whole-cipher expression assembly.

use bitfunc_core::Node;
use log::debug;

use crate::error::{Error, Result};
use crate::key::{expand_key, Aes128Key, RoundKey};
use crate::round::{add_round_key, RoundLayers};

/// Width of one cipher block in bits.
pub const BLOCK_BITS: usize = 128;

/// Shape of the cipher tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherConfig {
    /// Number of rounds after the initial key addition (10 for AES-128).
    pub rounds: usize,
    /// Whether the last round keeps MixColumns.
    pub final_mix_columns: bool,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            final_mix_columns: false,
        }
    }
}

/// Builds cipher trees from caller-supplied round keys.
#[derive(Clone, Debug)]
pub struct CipherBuilder {
    layers: RoundLayers,
    config: CipherConfig,
}

impl CipherBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(CipherConfig::default())
    }

    /// Creates a builder with explicit configuration.
    pub fn with_config(config: CipherConfig) -> Result<Self> {
        Ok(Self {
            layers: RoundLayers::new()?,
            config,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Layers shared by every tree this builder produces.
    pub fn layers(&self) -> &RoundLayers {
        &self.layers
    }

    /// Assembles the cipher tree; `keys` holds one key per round plus the
    /// initial whitening key.
    pub fn build(&self, keys: &[RoundKey]) -> Result<Node> {
        let expected = self.config.rounds + 1;
        let Some((first, rest)) = keys.split_first().filter(|_| keys.len() == expected) else {
            return Err(Error::KeyCount {
                expected,
                found: keys.len(),
            });
        };

        let mut stages = Vec::with_capacity(expected);
        stages.push(add_round_key(first)?);
        for (idx, key) in rest.iter().enumerate() {
            let last = idx + 1 == self.config.rounds;
            let round = if last && !self.config.final_mix_columns {
                self.layers.final_round(key)?
            } else {
                self.layers.round(key)?
            };
            stages.push(round);
        }
        Ok(Node::seq(stages))
    }

    /// Like [`build`](Self::build), then checks the tree against
    /// [`BLOCK_BITS`].
    pub fn build_checked(&self, keys: &[RoundKey]) -> Result<Node> {
        let cipher = self.build(keys)?;
        let width = cipher.resolve(Some(BLOCK_BITS))?;
        debug!(
            "cipher tree: rounds={} width={:?}",
            self.config.rounds, width
        );
        Ok(cipher)
    }
}

/// Width-checked AES-128 tree for `key`.
pub fn aes128(key: &Aes128Key) -> Result<Node> {
    CipherBuilder::new()?.build_checked(expand_key(key).as_slice())
}
