//! Configuration for the witness engine.

use serde::{Deserialize, Serialize};

/// Configuration for witness generation.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The catch-up distance, in blocks, beyond which witness generation
    /// jumps the accumulator to a precomputed checkpoint instead of folding
    /// in every intervening mint.
    ///
    /// This is a performance/latency trade-off, not a correctness setting:
    /// smaller values commit progress more often, larger values recompute
    /// less. It also bounds the size of each jump segment, so a request
    /// interrupted mid-jump only loses one segment of work.
    pub checkpoint_jump_threshold: u32,

    /// The maximum number of mint events one witness request may process.
    ///
    /// A request that hits this bound reports partial progress so the
    /// caller can re-enqueue a follow-up, rather than blocking the worker
    /// indefinitely. Must comfortably exceed the number of mints in one
    /// `checkpoint_jump_threshold` span, or a long jump segment can make no
    /// progress at all.
    pub max_folds_per_request: u64,
}

// we like our default configs to be explicit
#[allow(unknown_lints)]
#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            checkpoint_jump_threshold: 100,
            max_folds_per_request: 60 * 24 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();

        assert_eq!(config.checkpoint_jump_threshold, 100);
        assert_eq!(config.max_folds_per_request, 86_400);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        assert!(toml::from_str::<Config>("checkpoint_jump_threshold = 10").is_ok());
        assert!(toml::from_str::<Config>("no_such_field = true").is_err());
    }
}
