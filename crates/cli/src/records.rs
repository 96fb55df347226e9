//! Record sources (CSV via polars, JSON via serde_json) and the WKT sink.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tacarrow::api::CorridorRecord;

/// Read corridor records; the format follows the file extension.
pub fn read_records(path: &Path) -> Result<Vec<CorridorRecord>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => read_csv(path),
        Some(ext) if ext.eq_ignore_ascii_case("json") => read_json(path),
        _ => bail!(
            "unsupported input {}: expected a .csv or .json file",
            path.display()
        ),
    }
}

fn read_json(path: &Path) -> Result<Vec<CorridorRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing records from {}", path.display()))
}

/// Columns `id, sidc, width, wkt`; extra columns are ignored.
fn read_csv(path: &Path) -> Result<Vec<CorridorRecord>> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .select([
            col("id").cast(DataType::Int64),
            col("sidc").cast(DataType::String),
            col("width").cast(DataType::Float64),
            col("wkt").cast(DataType::String),
        ])
        .collect()
        .with_context(|| format!("reading columns id, sidc, width, wkt from {}", path.display()))?;
    tracing::debug!(rows = df.height(), cols = df.width(), "input_csv_shape");

    let ids = df.column("id")?.i64()?;
    let sidcs = df.column("sidc")?.str()?;
    let widths = df.column("width")?.f64()?;
    let wkts = df.column("wkt")?.str()?;

    let mut records = Vec::with_capacity(df.height());
    for (row, (((id, sidc), width), wkt)) in ids
        .into_iter()
        .zip(sidcs.into_iter())
        .zip(widths.into_iter())
        .zip(wkts.into_iter())
        .enumerate()
    {
        match (id, sidc, width, wkt) {
            (Some(id), Some(sidc), Some(width), Some(wkt)) => records.push(CorridorRecord {
                id,
                sidc: sidc.to_string(),
                width,
                wkt: wkt.to_string(),
            }),
            _ => bail!("{}: row {row} has an empty field", path.display()),
        }
    }
    Ok(records)
}

/// Write WKT to `out`, or to stdout when `out` is `-`.
pub fn write_wkt(out: &str, wkt: &str) -> Result<()> {
    if out == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{wkt}")?;
        return Ok(());
    }
    let out_path = Path::new(out);
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out_path, format!("{wkt}\n")).with_context(|| format!("writing {out}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CSV: &str = "id,sidc,width,wkt\n\
        1,GFGPOLAGM-,400,\"LINESTRING (13.30 52.50, 13.40 52.55)\"\n\
        2,GFGPOLAR--,250.5,\"LINESTRING (0 0, 0 1)\"\n";

    #[test]
    fn reads_csv_records_in_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, CSV).unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].wkt, "LINESTRING (13.30 52.50, 13.40 52.55)");
        assert_eq!(records[1].sidc, "GFGPOLAR--");
        assert_eq!(records[1].width, 250.5);
    }

    #[test]
    fn reads_json_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(
            &path,
            r#"[{"id": 4, "sidc": "GFGPOAF---", "width": 250.5, "wkt": "LINESTRING (0 0, 0 1)"}]"#,
        )
        .unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(
            records,
            vec![CorridorRecord {
                id: 4,
                sidc: "GFGPOAF---".into(),
                width: 250.5,
                wkt: "LINESTRING (0 0, 0 1)".into(),
            }]
        );
    }

    #[test]
    fn rejects_unknown_extension_and_missing_columns() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("in.txt");
        fs::write(&txt, CSV).unwrap();
        assert!(read_records(&txt).is_err());

        let csv = dir.path().join("bad.csv");
        fs::write(&csv, "id,sidc\n1,GFGPOAF---\n").unwrap();
        assert!(read_records(&csv).is_err());
    }

    #[test]
    fn write_wkt_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested/out.wkt");
        write_wkt(out.to_str().unwrap(), "GEOMETRYCOLLECTION EMPTY").unwrap();
        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "GEOMETRYCOLLECTION EMPTY\n"
        );
    }
}
