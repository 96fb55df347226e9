//! Curated internal API (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for the CLI and
//!   benches. Breaking changes are allowed and expected.

// Geodesy and projection
pub use crate::geodesic::{Ellipsoid, Geodesic, GeodesicCfg, GeodesicError, Inverse};
pub use crate::projection::{Projection, ProjectionError, WebMercator};
// Geometry capability
pub use crate::kernel::{
    BufferParams, CapStyle, GeoKernel, GeometryKernel, JoinStyle, KernelError,
};
// Symbol construction
pub use crate::registry::{CodeMatching, SymbolKind};
pub use crate::symbol::{
    compile_oaf, compile_olagm, compile_olags, HeadSegment, InputError, SymbolCfg, SymbolContext,
    SymbolError,
};
// Batch glue
pub use crate::pipeline::{
    compile_batch, compile_batch_par, compile_record, BatchOutcome, CompiledSymbol,
    CorridorRecord, FailurePolicy, RecordError,
};
pub use crate::GeoPoint;
