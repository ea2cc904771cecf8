//! The fetch engine: envelope decoding, pagination, normalization, and the
//! identifier cache.

pub mod cache;
pub mod envelope;
pub mod normalize;
pub(crate) mod paginate;
