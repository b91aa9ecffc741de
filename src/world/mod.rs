//! Game-world reference data.

pub mod surface;

pub use surface::{SurfaceResolution, SurfaceTable, SurfaceTableError, TyreType};
