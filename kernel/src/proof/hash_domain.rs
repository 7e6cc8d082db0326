//! Typed domain separators for canonical hashing.
//!
//! Every hash computed by the workspace selects a domain via [`HashDomain`].
//! The enum, `as_bytes()`, `ALL`, and `Display` come from one macro
//! invocation, so adding a domain is a single change here.

macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used as
        /// a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    // -----------------------------------------------------------------------
    // Kernel
    // -----------------------------------------------------------------------

    /// Pattern fingerprint (variables + edges); used to deduplicate top-K.
    Pattern => b"GES::PATTERN::V1\0",

    /// Resolved background knowledge snapshot.
    Knowledge => b"GES::KNOWLEDGE::V1\0",

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search policy snapshot.
    SearchPolicy => b"GES::SEARCH_POLICY::V1\0",

    /// Search trace (accepted steps + phase counters).
    SearchTrace => b"GES::SEARCH_TRACE::V1\0",

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    /// Run configuration.
    RunConfig => b"GES::RUN_CONFIG::V1\0",

    /// Covariance input (dimension, sample size, value bits).
    CovarianceInput => b"GES::COVARIANCE_INPUT::V1\0",

    /// Bundle artifact content hashing.
    BundleArtifact => b"GES::BUNDLE_ARTIFACT::V1\0",

    /// Bundle digest (normative projection).
    BundleDigest => b"GES::BUNDLE_DIGEST::V1\0",

    // -----------------------------------------------------------------------
    // Benchmarks
    // -----------------------------------------------------------------------

    /// Benchmark determinism guard.
    BenchGuard => b"GES::BENCH_GUARD::V1\0",
}
