use anyhow::{Context, Result, anyhow};
use clap::Parser;
use ppe_inspector::audio::queue::SpeechQueue;
use ppe_inspector::audio::speaker::CommandSpeaker;
use ppe_inspector::config::InspectorConfig;
use ppe_inspector::inspection::pipeline::Pipeline;
use ppe_inspector::object_detection::yolo::YoloDetector;
use ppe_inspector::service::InspectionService;
use ppe_inspector::storage::ResultStore;
use ppe_inspector::upload::{UploadPolicy, allowed_file};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect site photos for missing PPE")]
struct Args {
    /// Image to inspect, or a directory whose images are inspected one by one.
    #[arg(long)]
    image: PathBuf,
    /// ONNX export of the PPE detector.
    #[arg(long, env = "PPE_MODEL")]
    model: Option<PathBuf>,
    /// JSON config file.
    #[arg(long, env = "PPE_CONFIG")]
    config: Option<PathBuf>,
    /// Speak the safety message.
    #[arg(long)]
    audio: bool,
    /// Override the reporting confidence threshold.
    #[arg(long)]
    threshold: Option<f32>,
    #[arg(long)]
    results_dir: Option<PathBuf>,
    #[arg(long)]
    uploads_dir: Option<PathBuf>,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = InspectorConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(model) = args.model.clone() {
        cfg.model.path = model;
    }
    if let Some(threshold) = args.threshold {
        cfg.confidence_threshold = threshold;
    }
    if let Some(dir) = args.results_dir.clone() {
        cfg.storage.results_dir = dir;
    }
    if let Some(dir) = args.uploads_dir.clone() {
        cfg.storage.uploads_dir = dir;
    }
    cfg.speech.enabled |= args.audio;
    cfg.validate()?;

    if !cfg.model.path.exists() {
        return Err(anyhow!(
            "Model path does not exist, or cannot be read: {:?}",
            cfg.model.path
        ));
    }
    let detector = YoloDetector::new(&cfg.model.path, cfg.model.input_size, cfg.model.input_size)
        .with_context(|| format!("loading detector {}", cfg.model.path.display()))?
        .with_confidence(cfg.model.confidence)
        .with_iou_threshold(cfg.model.nms_iou);

    let speech = if cfg.speech.enabled {
        let speaker =
            CommandSpeaker::new(cfg.speech.program.clone()).with_args(cfg.speech.args.clone());
        Some(Arc::new(SpeechQueue::spawn(speaker).context("starting speech worker")?))
    } else {
        None
    };

    let mut pipeline = Pipeline::new(detector, cfg.pipeline_settings());
    if let Some(queue) = &speech {
        pipeline = pipeline.with_announcer(queue.clone());
    }
    let store = ResultStore::new(&cfg.storage.results_dir, &cfg.storage.uploads_dir)
        .with_jpeg_quality(cfg.storage.jpeg_quality);
    let policy = UploadPolicy {
        max_bytes: cfg.storage.max_upload_bytes,
    };
    let service = InspectionService::new(pipeline, store, policy);

    let mut failures = 0usize;
    for path in collect_inputs(&args.image)? {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        match service.handle_upload(&filename, &bytes, speech.is_some()) {
            Ok(report) => emit(&report, args.pretty)?,
            Err(err) => {
                failures += 1;
                log::error!("{}: {err}", path.display());
                emit(&err.to_report(), args.pretty)?;
            }
        }
    }

    // Let queued announcements finish before the process exits.
    drop(service);
    if let Some(queue) = speech {
        match Arc::try_unwrap(queue) {
            Ok(queue) => queue.shutdown(),
            Err(_) => log::warn!("speech queue still shared at exit, not waiting for it"),
        }
    }

    if failures > 0 {
        return Err(anyhow!("{failures} image(s) could not be inspected"));
    }
    Ok(())
}

/// A single file is passed through as-is so the upload policy can reject it; directories
/// contribute only files with an accepted extension.
fn collect_inputs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut inputs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if entry.file_type().is_file() && allowed_file(&entry.file_name().to_string_lossy()) {
            inputs.push(entry.into_path());
        }
    }
    Ok(inputs)
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
