//! Batch glue: corridor records in, one geometry collection out.
//!
//! Purpose
//! - Parse each record's base line, dispatch on its symbol code, and collect
//!   the compiled geometries in input order.
//! - Unknown codes are skipped (logged at debug). Records that fail to compile
//!   are kept with their id and error; `FailurePolicy` decides whether they
//!   abort the batch when the output is assembled.
//!
//! Records are independent, so `compile_batch_par` fans out with rayon. The
//! indexed collect keeps the output order identical to `compile_batch`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::{Geometry, GeometryKernel};
use crate::registry::SymbolKind;
use crate::symbol::{base_line, SymbolContext, SymbolError};

/// One input row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorridorRecord {
    pub id: i64,
    /// Symbol identification code (SIDC).
    pub sidc: String,
    /// Corridor width in meters.
    pub width: f64,
    /// Base line as WKT, lon/lat degrees.
    pub wkt: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledSymbol {
    pub id: i64,
    pub kind: SymbolKind,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("record {id}: {source}")]
pub struct RecordError {
    pub id: i64,
    #[source]
    pub source: SymbolError,
}

/// What to do with failed records when assembling the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave failed records out of the collection.
    #[default]
    SkipAndLog,
    /// Refuse to build the collection if any record failed.
    AbortAll,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutcome {
    pub compiled: Vec<CompiledSymbol>,
    /// Ids of records whose code selects no symbol.
    pub skipped: Vec<i64>,
    pub failed: Vec<RecordError>,
}

impl BatchOutcome {
    /// Single output collection, one member per compiled record, in input order.
    ///
    /// With `AbortAll` the first failure (in input order) is returned instead.
    pub fn into_collection(
        self,
        kernel: &dyn GeometryKernel,
        policy: FailurePolicy,
    ) -> Result<Geometry, RecordError> {
        if policy == FailurePolicy::AbortAll {
            if let Some(first) = self.failed.into_iter().next() {
                return Err(first);
            }
        }
        Ok(kernel.collection(self.compiled.into_iter().map(|c| c.geometry).collect()))
    }
}

/// Compile one record; `Ok(None)` when its code is not supported.
pub fn compile_record(
    ctx: &SymbolContext<'_>,
    record: &CorridorRecord,
) -> Result<Option<CompiledSymbol>, RecordError> {
    let Some(kind) = SymbolKind::lookup(&record.sidc, ctx.cfg.code_matching) else {
        return Ok(None);
    };
    let build = || -> Result<Geometry, SymbolError> {
        let parsed = ctx.kernel.read_wkt(&record.wkt)?;
        let line = base_line(&parsed)?;
        kind.compile(ctx, line, record.width)
    };
    match build() {
        Ok(geometry) => Ok(Some(CompiledSymbol {
            id: record.id,
            kind,
            geometry,
        })),
        Err(source) => Err(RecordError {
            id: record.id,
            source,
        }),
    }
}

pub fn compile_batch(ctx: &SymbolContext<'_>, records: &[CorridorRecord]) -> BatchOutcome {
    let results = records.iter().map(|r| compile_record(ctx, r));
    tally(records, results)
}

pub fn compile_batch_par(ctx: &SymbolContext<'_>, records: &[CorridorRecord]) -> BatchOutcome {
    let results: Vec<_> = records
        .par_iter()
        .map(|r| compile_record(ctx, r))
        .collect();
    tally(records, results)
}

fn tally<I>(records: &[CorridorRecord], results: I) -> BatchOutcome
where
    I: IntoIterator<Item = Result<Option<CompiledSymbol>, RecordError>>,
{
    let mut out = BatchOutcome::default();
    for (record, result) in records.iter().zip(results) {
        match result {
            Ok(Some(symbol)) => out.compiled.push(symbol),
            Ok(None) => {
                tracing::debug!(id = record.id, sidc = %record.sidc, "skipped_unknown_code");
                out.skipped.push(record.id);
            }
            Err(e) => {
                tracing::warn!(id = e.id, error = %e.source, "record_failed");
                out.failed.push(e);
            }
        }
    }
    tracing::info!(
        records = records.len(),
        compiled = out.compiled.len(),
        skipped = out.skipped.len(),
        failed = out.failed.len(),
        "batch"
    );
    out
}
