//! Subcommand handlers. Each returns the process exit code; hard failures
//! (unreadable input, bad profile, I/O) propagate as errors.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{info, warn};

use manual_core::Config;
use manual_ingest::{
    load_chunks, parse_structure, run_pipeline, BoundaryDiagnostics, ManualStore,
};
use manual_profile::{load_and_compile, load_dir, load_file, CompiledProfile, LoadResult, LoadStatus};
use manual_qa::{run_validation_suite, ValidationReport};

use crate::input::read_document;

fn compile_profile(config: &Config, profile: &str) -> Result<CompiledProfile> {
    let path = config.resolve_profile(profile);
    load_and_compile(&path).with_context(|| format!("failed to load profile {}", path.display()))
}

fn print_report_summary(report: &ValidationReport) {
    println!(
        "QA: {} chunks, {} errors, {} warnings ({})",
        report.total_chunks,
        report.error_count,
        report.warning_count,
        if report.passed { "passed" } else { "failed" }
    );
    for issue in &report.issues {
        println!("  {issue}");
    }
}

// ── process ───────────────────────────────────────────────────

pub fn process(
    config: &Config,
    profile: &str,
    input: &Path,
    output_dir: Option<PathBuf>,
) -> Result<ExitCode> {
    let profile = compile_profile(config, profile)?;
    let doc = read_document(input)?;
    let output = run_pipeline(&doc, &profile)
        .with_context(|| format!("chunk assembly failed for {}", profile.manual_id))?;

    let store = ManualStore::new(output_dir.unwrap_or_else(|| config.output_dir.clone()));
    store
        .save(&output.structure.manifest, &output.chunks)
        .with_context(|| format!("failed to write output under {}", store.base_dir().display()))?;

    let report = run_validation_suite(&output.chunks, &profile);
    println!(
        "{}: {} boundaries ({} detected), {} entries, {} chunks",
        profile.manual_id,
        output.structure.boundaries.len(),
        output.structure.detected,
        output.structure.manifest.entries.len(),
        output.chunks.len()
    );
    println!("  manifest: {}", store.manifest_path(&profile.manual_id).display());
    println!("  chunks:   {}", store.chunks_path(&profile.manual_id).display());
    print_report_summary(&report);

    // QA findings are advisory for process; validate-chunks is the gate.
    Ok(ExitCode::SUCCESS)
}

// ── validate ──────────────────────────────────────────────────

pub fn validate(config: &Config, profile: &str, input: &Path, diagnostics: bool) -> Result<ExitCode> {
    let profile = compile_profile(config, profile)?;
    let doc = read_document(input)?;
    let structure = parse_structure(&doc, &profile);

    println!(
        "{}: {} lines over {} pages",
        profile.manual_id,
        doc.len(),
        doc.page_count()
    );
    println!(
        "  boundaries: {} detected, {} kept",
        structure.detected,
        structure.boundaries.len()
    );
    println!("  manifest entries: {}", structure.manifest.entries.len());
    for warning in &structure.warnings {
        println!("  warning: {warning}");
    }

    if diagnostics {
        let report = BoundaryDiagnostics::compute(&structure.boundaries, &doc);
        let json = serde_json::to_string_pretty(&report)?;
        println!("{json}");
    }
    Ok(ExitCode::SUCCESS)
}

// ── validate-chunks ───────────────────────────────────────────

pub fn validate_chunks(config: &Config, profile: &str, chunks: &Path, json: bool) -> Result<ExitCode> {
    let profile = compile_profile(config, profile)?;
    let chunks = load_chunks(chunks)
        .with_context(|| format!("failed to read chunks from {}", chunks.display()))?;
    let report = run_validation_suite(&chunks, &profile);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report_summary(&report);
    }

    if report.passed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ── check-profile ─────────────────────────────────────────────

fn print_load_result(result: &LoadResult) -> bool {
    let path = result.path.display();
    match &result.status {
        LoadStatus::Loaded {
            manual_id,
            validation,
        } => {
            println!("ok      {path} ({manual_id})");
            for w in &validation.warnings {
                println!("  warning: {}: {}", w.path, w.message);
            }
            true
        }
        LoadStatus::Invalid { validation } => {
            println!("invalid {path}");
            for message in validation.error_messages() {
                println!("  error: {message}");
            }
            false
        }
        LoadStatus::Failed { error } => {
            println!("failed  {path}: {error}");
            false
        }
    }
}

pub fn check_profile(path: &Path) -> Result<ExitCode> {
    let results = if path.is_dir() {
        load_dir(path).with_context(|| format!("failed to scan {}", path.display()))?
    } else {
        vec![load_file(path)]
    };

    let mut all_valid = true;
    for result in &results {
        all_valid &= print_load_result(result);
    }
    info!(profiles = results.len(), all_valid, "checked profiles");
    if !all_valid {
        warn!("one or more profiles failed validation");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
