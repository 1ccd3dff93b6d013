//! Validation and classification of multiplexed streaming API frames.
//!
//! # Crate Structure
//!
//! - [`schema`]: schema registry, decoder and error summaries
//! - [`envelope`]: `snapshot`/`data` envelope validators and error policies
//! - [`classify`]: structural message classification

/// Re-export schema types.
pub mod schema {
    pub use streamguard_schema::*;
}

/// Re-export envelope validation types.
pub mod envelope {
    pub use streamguard_envelope::*;
}

/// Re-export classification types.
pub mod classify {
    pub use streamguard_classify::*;
}
