//! Level-of-detail management: distance table and distance-based LOD selection.

mod selector;

pub use selector::{LodError, LodLevel, LodSelector, LodTable};
