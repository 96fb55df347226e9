use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tacarrow::api::BatchOutcome;

/// Metadata used to generate a provenance sidecar.
pub struct Payload {
    pub params: Value,
    pub batch: Value,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            batch: Value::Null,
        }
    }

    /// Attach counts, skipped ids and failures of a compiled batch.
    pub fn with_outcome(mut self, records: usize, outcome: &BatchOutcome) -> Self {
        let failed: Vec<Value> = outcome
            .failed
            .iter()
            .map(|e| json!({ "id": e.id, "error": e.source.to_string() }))
            .collect();
        self.batch = json!({
            "records": records,
            "compiled": outcome.compiled.len(),
            "skipped": outcome.skipped,
            "failed": failed,
        });
        self
    }
}

/// Write `<artifact>.provenance.json` containing the git commit, versions, params and batch summary.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let doc = json!({
        "code_rev": current_git_rev(),
        "version": tacarrow::VERSION,
        "params": payload.params,
        "batch": payload.batch,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    let mut name = stem;
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tacarrow::api::{RecordError, SymbolError};
    use tempfile::tempdir;

    #[test]
    fn provenance_path_rewrites_extension() {
        let base = Path::new("/tmp/output/arrows.wkt");
        let derived = provenance_path(base);
        assert_eq!(derived, Path::new("/tmp/output/arrows.provenance.json"));
    }

    #[test]
    fn write_sidecar_records_batch_summary() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("a.wkt");
        fs::write(&artifact, "GEOMETRYCOLLECTION EMPTY").unwrap();
        let outcome = BatchOutcome {
            compiled: Vec::new(),
            skipped: vec![3, 5],
            failed: vec![RecordError {
                id: 9,
                source: SymbolError::DegenerateGeometry("zero-length head".into()),
            }],
        };
        let payload = Payload::new(json!({"input": "in.csv"})).with_outcome(3, &outcome);
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        assert!(prov_path.exists());
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["params"]["input"], "in.csv");
        assert_eq!(parsed["batch"]["records"], 3);
        assert_eq!(parsed["batch"]["skipped"], json!([3, 5]));
        assert_eq!(parsed["batch"]["failed"][0]["id"], 9);
        assert!(parsed["batch"]["failed"][0]["error"]
            .as_str()
            .unwrap()
            .contains("zero-length head"));
    }
}
