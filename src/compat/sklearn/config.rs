//! Conversion options.
//!
//! ```
//! use boosters_pmml::compat::sklearn::EncoderConfig;
//! use boosters_pmml::utils::Parallelism;
//!
//! // Defaults: sequential, predicates interned
//! let config = EncoderConfig::default();
//!
//! let config = EncoderConfig::builder()
//!     .parallelism(Parallelism::Parallel)
//!     .intern_predicates(false)
//!     .build();
//! assert!(config.parallelism.is_parallel());
//! ```

use bon::Builder;

use crate::utils::Parallelism;

/// Options for tree and ensemble conversion.
///
/// None of the options change what a converted model predicts.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug))]
pub struct EncoderConfig {
    /// Encode the trees of an ensemble on the rayon pool. Default: sequential.
    ///
    /// Member order is round order either way. In parallel mode each tree
    /// interns predicates in its own cache.
    #[builder(default)]
    pub parallelism: Parallelism,

    /// Share structurally identical predicates between nodes. Default: true.
    #[builder(default = true)]
    pub intern_predicates: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
