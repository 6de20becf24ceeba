use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use plateread_core::{parse_languages, EngineKind, NameplateRecord, RotationMode, RunFailure};
use plateread_export as export;
use plateread_ocr::{normalize, NameplatePipeline, OcrBackend};

/// Batch OCR for water heater nameplates: HEIC→PNG conversion, image
/// preprocessing, rotation-aware OCR, field extraction, CSV/JSON output.
#[derive(Debug, Parser)]
#[command(name = "plateread", version)]
struct Args {
    /// Input folder containing .heic/.heif/.jpg/.png images.
    #[arg(short, long)]
    input: PathBuf,

    /// Output folder.
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// OCR engine to use: `ocrs` or `tesseract`.
    #[arg(long, default_value = "ocrs")]
    engine: String,

    /// Comma-separated language codes for OCR.
    #[arg(long, default_value = "en")]
    languages: String,

    /// Write extracted records to extracted.json.
    #[arg(long)]
    write_json: bool,

    /// Write extracted records to extracted.csv.
    #[arg(long)]
    write_csv: bool,

    /// Save preprocessed images under preprocessed/ for inspection.
    #[arg(long)]
    save_preprocessed: bool,

    /// Rotation policy: `auto` tries 0/90/180/270 and keeps the best
    /// result, `none` only the image as captured.
    #[arg(long, default_value = "auto")]
    rotation: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if !args.input.is_dir() {
        bail!("Input folder not found: {}", args.input.display());
    }
    let engine = EngineKind::from_str(&args.engine).map_err(|e| anyhow!(e))?;
    let rotation = RotationMode::from_str(&args.rotation).map_err(|e| anyhow!(e))?;
    let languages = parse_languages(&args.languages);

    let converted_dir = args.output.join("converted");
    let ocr_raw_dir = args.output.join("ocr_raw");
    let preprocessed_dir = args
        .save_preprocessed
        .then(|| args.output.join("preprocessed"));
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output folder {}", args.output.display()))?;

    // Stage inputs (HEIC → PNG, everything else copied) before touching OCR.
    let mut failures: Vec<RunFailure> = Vec::new();
    let ready = normalize::prepare_images(&args.input, &converted_dir, &mut failures)
        .context("Failed to stage input images")?;
    if ready.is_empty() {
        println!("No images found in input folder.");
        report_failures(&failures);
        return Ok(());
    }

    // Engine construction failures are fatal before any image is processed.
    let backend = build_backend(engine, &languages)?;
    let pipeline = NameplatePipeline::new(backend, preprocessed_dir, rotation);
    info!(engine = %engine, rotation = %rotation, "Processing {} image(s)", ready.len());

    let bar = ProgressBar::new(ready.len() as u64).with_style(progress_style());
    bar.set_prefix("Processing images");

    let mut records: Vec<NameplateRecord> = Vec::new();
    for path in &ready {
        match pipeline.process_image(path) {
            Ok(done) => {
                export::write_text(&ocr_raw_dir.join(format!("{}.txt", done.stem)), &done.ocr_text)
                    .with_context(|| format!("Failed to write raw OCR text for {}", path.display()))?;
                records.push(done.record);
            }
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                failures.push(RunFailure::new(path, e.failure_kind(), e.to_string()));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if args.write_csv {
        export::write_csv_records(&args.output.join("extracted.csv"), &records)
            .context("Failed to write extracted.csv")?;
    }
    if args.write_json {
        export::write_json_records(&args.output.join("extracted.json"), &records)
            .context("Failed to write extracted.json")?;
    }

    println!(
        "Done. Processed {} image(s). Output: {}",
        records.len(),
        args.output.display()
    );
    report_failures(&failures);
    Ok(())
}

fn report_failures(failures: &[RunFailure]) {
    if failures.is_empty() {
        return;
    }
    println!("{} file(s) skipped:", failures.len());
    for failure in failures {
        println!("  {failure}");
    }
}

fn build_backend(engine: EngineKind, languages: &[String]) -> Result<Box<dyn OcrBackend>> {
    match engine {
        #[cfg(feature = "ocrs")]
        EngineKind::Ocrs => {
            if languages.iter().any(|l| l.as_str() != "en") {
                warn!("The ocrs engine has no per-language models; ignoring language codes");
            }
            let recognizer = plateread_ocr::OcrsRecognizer::with_defaults()
                .context("Failed to initialize the ocrs engine")?;
            Ok(Box::new(recognizer))
        }
        #[cfg(not(feature = "ocrs"))]
        EngineKind::Ocrs => bail!("ocrs engine not compiled in — rebuild with the `ocrs` feature"),
        #[cfg(feature = "tesseract")]
        EngineKind::Tesseract => Ok(Box::new(plateread_ocr::TesseractRecognizer::new(
            None, languages,
        ))),
        #[cfg(not(feature = "tesseract"))]
        EngineKind::Tesseract => {
            bail!("tesseract engine not compiled in — rebuild with the `tesseract` feature")
        }
    }
}

/// Default progress style shared across the run.
fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix} {pos:>4}/{len:4} {wide_bar:.cyan/blue} {eta_precise}")
        .expect("bad progress bar template")
}
