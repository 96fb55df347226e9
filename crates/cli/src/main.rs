use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tacarrow::api::{
    compile_batch, compile_batch_par, CodeMatching, FailurePolicy, GeoKernel, GeometryKernel,
    SymbolCfg, SymbolContext, SymbolKind, WebMercator,
};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod records;

#[derive(Parser)]
#[command(name = "tacarrow")]
#[command(about = "Compile tactical corridor arrows (OLAGM, OLAGS, OAF) to WKT")]
struct Cmd {
    /// Log at debug level (skipped records, input shape)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compile a batch of corridor records into one GEOMETRYCOLLECTION
    Compile {
        /// Records as .csv (columns id, sidc, width, wkt) or .json (array)
        #[arg(long)]
        input: PathBuf,
        /// Output WKT file, or `-` for stdout
        #[arg(long, default_value = "-")]
        out: String,
        /// Compile records on the rayon thread pool
        #[arg(long)]
        parallel: bool,
        /// Fail without output if any record fails to compile
        #[arg(long)]
        abort_on_error: bool,
        /// Segments per quarter circle for round joins
        #[arg(long)]
        quad_segs: Option<u32>,
        /// Arrowhead length as a fraction of the width
        #[arg(long)]
        arrow_ratio: Option<f64>,
        /// Match concrete SIDCs (identity/status wildcards, first 10 chars, any case)
        #[arg(long)]
        sidc_wildcards: bool,
    },
    /// List the supported symbol codes
    Codes,
    /// Print a small provenance JSON block
    Report,
}

struct CompileArgs {
    input: PathBuf,
    out: String,
    parallel: bool,
    policy: FailurePolicy,
    cfg: SymbolCfg,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Compile {
            input,
            out,
            parallel,
            abort_on_error,
            quad_segs,
            arrow_ratio,
            sidc_wildcards,
        } => {
            let args = compile_args(
                input,
                out,
                parallel,
                abort_on_error,
                quad_segs,
                arrow_ratio,
                sidc_wildcards,
            )?;
            compile(&args)
        }
        Action::Codes => {
            codes();
            Ok(())
        }
        Action::Report => report(),
    }
}

fn compile_args(
    input: PathBuf,
    out: String,
    parallel: bool,
    abort_on_error: bool,
    quad_segs: Option<u32>,
    arrow_ratio: Option<f64>,
    sidc_wildcards: bool,
) -> Result<CompileArgs> {
    let mut cfg = SymbolCfg::default();
    if let Some(q) = quad_segs {
        if q == 0 {
            bail!("--quad-segs must be at least 1");
        }
        cfg.quad_segs = q;
    }
    if let Some(r) = arrow_ratio {
        if !(r.is_finite() && r > 0.0) {
            bail!("--arrow-ratio must be positive, got {r}");
        }
        cfg.arrow_length_ratio = r;
    }
    if sidc_wildcards {
        cfg.code_matching = CodeMatching::Sidc;
    }
    let policy = if abort_on_error {
        FailurePolicy::AbortAll
    } else {
        FailurePolicy::SkipAndLog
    };
    Ok(CompileArgs {
        input,
        out,
        parallel,
        policy,
        cfg,
    })
}

fn compile(args: &CompileArgs) -> Result<()> {
    tracing::info!(
        input = %args.input.display(),
        out = %args.out,
        parallel = args.parallel,
        "compile"
    );
    let records = records::read_records(&args.input)?;

    let kernel = GeoKernel::new();
    let projection = WebMercator::default();
    let ctx = SymbolContext::new(&kernel, &projection).with_cfg(args.cfg);
    let outcome = if args.parallel {
        compile_batch_par(&ctx, &records)
    } else {
        compile_batch(&ctx, &records)
    };

    let payload = provenance::Payload::new(serde_json::json!({
        "input": args.input.to_string_lossy(),
        "parallel": args.parallel,
        "policy": format!("{:?}", args.policy),
        "arrow_length_ratio": args.cfg.arrow_length_ratio,
        "quad_segs": args.cfg.quad_segs,
        "code_matching": format!("{:?}", args.cfg.code_matching),
    }))
    .with_outcome(records.len(), &outcome);

    let collection = outcome.into_collection(&kernel, args.policy)?;
    records::write_wkt(&args.out, &kernel.write_wkt(&collection))?;

    if args.out == "-" {
        tracing::debug!("stdout output, no provenance sidecar");
    } else {
        let prov = provenance::write_sidecar(&args.out, payload)?;
        tracing::info!(provenance = %prov.display(), "wrote");
    }
    Ok(())
}

fn codes() {
    for kind in SymbolKind::ALL {
        println!("{kind}\t{kind:?}");
    }
}

fn report() -> Result<()> {
    let codes: Vec<_> = SymbolKind::ALL
        .iter()
        .map(|k| k.canonical_code())
        .collect();
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "version": tacarrow::VERSION,
        "codes": codes,
        "defaults": {
            "arrow_length_ratio": SymbolCfg::default().arrow_length_ratio,
            "quad_segs": SymbolCfg::default().quad_segs,
        }
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    const JSON: &str = r#"[
        {"id": 1, "sidc": "G*G*OLAGM-", "width": 400, "wkt": "LINESTRING (13.30 52.50, 13.35 52.52, 13.40 52.55)"},
        {"id": 2, "sidc": "GFGPOLAGM-", "width": 400, "wkt": "LINESTRING (13.30 52.50, 13.40 52.55)"},
        {"id": 3, "sidc": "G*G*OAF---", "width": 400, "wkt": "LINESTRING (13.30 52.50, 13.40 52.55)"},
        {"id": 4, "sidc": "G*G*OLAGS-", "width": 400, "wkt": "POINT (13.30 52.50)"}
    ]"#;

    fn args(dir: &std::path::Path, abort: bool, parallel: bool) -> CompileArgs {
        args_with(dir, abort, parallel, false)
    }

    fn args_with(dir: &std::path::Path, abort: bool, parallel: bool, wildcards: bool) -> CompileArgs {
        let input = dir.join("in.json");
        fs::write(&input, JSON).unwrap();
        let out = dir.join("out/arrows.wkt").to_string_lossy().into_owned();
        compile_args(input, out, parallel, abort, None, None, wildcards).unwrap()
    }

    #[test]
    fn clap_parses_compile_flags() {
        let cmd = Cmd::try_parse_from([
            "tacarrow",
            "-v",
            "compile",
            "--input",
            "in.csv",
            "--out",
            "x.wkt",
            "--parallel",
            "--quad-segs",
            "8",
            "--sidc-wildcards",
        ])
        .unwrap();
        assert!(cmd.verbose);
        match cmd.action {
            Action::Compile {
                parallel,
                quad_segs,
                abort_on_error,
                sidc_wildcards,
                ..
            } => {
                assert!(parallel);
                assert!(sidc_wildcards);
                assert!(!abort_on_error);
                assert_eq!(quad_segs, Some(8));
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn compile_args_validate_overrides() {
        let input = PathBuf::from("in.csv");
        assert!(
            compile_args(input.clone(), "-".into(), false, false, Some(0), None, false).is_err()
        );
        assert!(
            compile_args(input.clone(), "-".into(), false, false, None, Some(-0.5), false).is_err()
        );
        let ok = compile_args(input, "-".into(), false, true, Some(4), Some(0.5), false).unwrap();
        assert_eq!(ok.cfg.quad_segs, 4);
        assert_eq!(ok.cfg.arrow_length_ratio, 0.5);
        assert_eq!(ok.cfg.code_matching, CodeMatching::Exact);
        assert_eq!(ok.policy, FailurePolicy::AbortAll);
    }

    #[test]
    fn compile_writes_collection_and_sidecar() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), false, true);
        compile(&args).unwrap();

        let wkt = fs::read_to_string(&args.out).unwrap();
        assert!(wkt.starts_with("GEOMETRYCOLLECTION"));
        let parsed = GeoKernel::new().read_wkt(wkt.trim()).unwrap();
        match parsed {
            tacarrow::kernel::Geometry::GeometryCollection(gc) => assert_eq!(gc.0.len(), 2),
            _ => panic!("expected collection"),
        }

        let prov = dir.path().join("out/arrows.provenance.json");
        let doc: Value = serde_json::from_slice(&fs::read(prov).unwrap()).unwrap();
        assert_eq!(doc["batch"]["records"], 4);
        assert_eq!(doc["batch"]["compiled"], 2);
        assert_eq!(doc["batch"]["skipped"], serde_json::json!([2]));
        assert_eq!(doc["batch"]["failed"][0]["id"], 4);
        assert_eq!(doc["params"]["parallel"], true);
        assert_eq!(doc["params"]["code_matching"], "Exact");
    }

    #[test]
    fn sidc_wildcards_compile_concrete_codes() {
        let dir = tempdir().unwrap();
        let args = args_with(dir.path(), false, false, true);
        assert_eq!(args.cfg.code_matching, CodeMatching::Sidc);
        compile(&args).unwrap();

        let prov = dir.path().join("out/arrows.provenance.json");
        let doc: Value = serde_json::from_slice(&fs::read(prov).unwrap()).unwrap();
        assert_eq!(doc["batch"]["compiled"], 3);
        assert_eq!(doc["batch"]["skipped"], serde_json::json!([]));
        assert_eq!(doc["batch"]["failed"][0]["id"], 4);
        assert_eq!(doc["params"]["code_matching"], "Sidc");
    }

    #[test]
    fn abort_on_error_writes_nothing() {
        let dir = tempdir().unwrap();
        let args = args(dir.path(), true, false);
        let err = compile(&args).unwrap_err();
        assert!(err.to_string().contains("record 4"));
        assert!(!std::path::Path::new(&args.out).exists());
    }
}
