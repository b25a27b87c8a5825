//! Repositories
//!
//! Validation, document mapping and metrics for each collection, on top of a
//! generic `DocumentStore`.

pub mod asset;
pub mod score;

pub use asset::AssetRepository;
pub use score::ScoreRepository;

/// Apply the configured cap to a requested listing size.
///
/// Zero stays zero; the repositories answer it without a store round-trip.
pub(crate) fn effective_limit(requested: Option<usize>, cap: usize) -> usize {
    requested.map_or(cap, |n| n.min(cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_clamps_to_cap() {
        assert_eq!(effective_limit(None, 100), 100);
        assert_eq!(effective_limit(Some(10), 100), 10);
        assert_eq!(effective_limit(Some(1000), 100), 100);
        assert_eq!(effective_limit(Some(0), 100), 0);
    }
}
