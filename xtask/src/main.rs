//! Developer tasks (schema generation, fixture upkeep).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(manifest_dir)
    } else {
        manifest_dir
    }
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(capguard_types::CapguardReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(capguard_settings::CapguardConfigV1)
}

/// The subset of the capslock document capguard reads.
fn generate_capslock_schema() -> schemars::Schema {
    schema_for!(capguard_types::CapabilityReport)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "capguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "capguard.config.v1.json",
            generate: generate_config_schema,
        },
        SchemaSpec {
            filename: "capslock.input.json",
            generate: generate_capslock_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut stale = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        let expected = serialize_schema(&(spec.generate)())?;
        match fs::read_to_string(&path) {
            Ok(actual) if actual == expected => {}
            Ok(_) => stale.push(format!("{} (out of date)", spec.filename)),
            Err(_) => stale.push(format!("{} (missing)", spec.filename)),
        }
    }

    if stale.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &stale {
        eprintln!("  - {}", name);
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn compile(schema: schemars::Schema) -> anyhow::Result<jsonschema::Validator> {
    let value = serde_json::to_value(&schema).context("schema to JSON")?;
    jsonschema::validator_for(&value).map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))
}

/// Locations must stay repo-relative: no absolute paths, no `..`, forward slashes only.
fn is_clean_path(path: &str) -> bool {
    !path.starts_with('/')
        && !path.contains('\\')
        && !path.contains(':')
        && !path.split('/').any(|seg| seg == "..")
}

/// Check every fixture: inputs match the capslock schema, golden reports match the report
/// schema and carry clean locations.
fn conform() -> anyhow::Result<()> {
    let report_schema = compile(generate_report_schema())?;
    let capslock_schema = compile(generate_capslock_schema())?;

    let mut errors = Vec::new();
    let mut checked = 0usize;

    for fixture in fixture_dirs()? {
        let name = fixture_name(&fixture);

        for input in ["capslock.json", "baseline.json"] {
            let path = fixture.join(input);
            if !path.exists() {
                continue;
            }
            let value = read_json(&path)?;
            for err in capslock_schema.iter_errors(&value) {
                errors.push(format!("{name}/{input}: {err}"));
            }
        }

        let expected = fixture.join("expected.report.json");
        let value = read_json(&expected)?;
        for err in report_schema.iter_errors(&value) {
            errors.push(format!("{name}/expected.report.json: {err}"));
        }
        let findings = value["findings"].as_array().cloned().unwrap_or_default();
        for (i, finding) in findings.iter().enumerate() {
            if let Some(path) = finding["location"]["path"].as_str()
                && !is_clean_path(path)
            {
                errors.push(format!("{name}: findings[{i}].location.path is not clean: {path}"));
            }
        }
        checked += 1;
    }

    if errors.is_empty() {
        println!("{checked} fixtures conform.");
        return Ok(());
    }
    for err in &errors {
        eprintln!("  - {err}");
    }
    bail!("Conformance failed with {} errors", errors.len())
}

/// Re-run the capguard binary on every fixture and rewrite its golden report.
fn bless_fixtures() -> anyhow::Result<()> {
    let bin = project_root().join("target").join("debug").join("capguard");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");

    if !bin.exists() {
        bail!(
            "capguard binary not found at {}.\nRun `cargo build -p capguard-cli` first.",
            bin.display()
        );
    }

    for fixture in fixture_dirs()? {
        let args = fixture_args(&fixture)?;
        let (global, check) = match args.iter().position(|a| a == "check") {
            Some(idx) => (&args[..idx], &args[idx + 1..]),
            None => (&args[..], &[][..]),
        };

        let temp = tempfile::tempdir().context("Failed to create temp dir")?;
        let report_out = temp.path().join("report.json");

        let status = std::process::Command::new(&bin)
            .arg("--repo-root")
            .arg(&fixture)
            .args(global)
            .arg("check")
            .arg("--input")
            .arg(fixture.join("capslock.json"))
            .arg("--report-out")
            .arg(&report_out)
            .args(check)
            .status()
            .context("run capguard")?;
        if status.code() == Some(1) {
            bail!("capguard failed on fixture {}", fixture_name(&fixture));
        }

        let report = capguard_test_util::normalize_nondeterministic(read_json(&report_out)?);
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        let expected = fixture.join("expected.report.json");
        fs::write(&expected, json)
            .with_context(|| format!("Failed to write {}", expected.display()))?;
        println!("Blessed {}", fixture_name(&fixture));
    }

    Ok(())
}

/// Fixture directories that carry a capslock document, sorted.
fn fixture_dirs() -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(fixtures_dir()).context("Failed to read tests/fixtures/")? {
        let path = entry?.path();
        if path.join("capslock.json").is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Extra CLI arguments from the fixture's `args` file, one per line.
fn fixture_args(fixture: &Path) -> anyhow::Result<Vec<String>> {
    let path = fixture.join("args");
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn fixture_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate fixtures against the generated schemas");
    eprintln!("  bless-fixtures    Regenerate expected.report.json files from target/debug/capguard");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "bless-fixtures" => bless_fixtures(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
