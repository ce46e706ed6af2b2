//! Core functionality used across the crate.

pub mod strand;

pub use strand::Strand;

/// A genomic position.
///
/// Positions are 0-based, as in BED files.
pub type Number = u64;
