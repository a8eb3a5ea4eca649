use crate::audio::speaker::DEFAULT_SPEECH_PROGRAM;
use crate::error::ConfigError;
use crate::inspection::classifier::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::inspection::pipeline::PipelineSettings;
use crate::inspection::renderer::RenderStyle;
use crate::object_detection::detection_adapter::{CANONICAL_HEIGHT, CANONICAL_WIDTH};
use crate::object_detection::yolo::{
    DEFAULT_DETECTOR_CONFIDENCE, DEFAULT_INPUT_SIZE, DEFAULT_NMS_IOU,
};
use crate::storage::{DEFAULT_JPEG_QUALITY, DEFAULT_RESULTS_DIR, DEFAULT_UPLOADS_DIR};
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PPE_CONFIG";
const DEFAULT_MODEL_PATH: &str = "best.onnx";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct InspectorConfigFile {
    model: Option<ModelConfigFile>,
    inspection: Option<InspectionConfigFile>,
    storage: Option<StorageConfigFile>,
    speech: Option<SpeechConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ModelConfigFile {
    path: Option<PathBuf>,
    input_size: Option<u32>,
    confidence: Option<f32>,
    nms_iou: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct InspectionConfigFile {
    confidence_threshold: Option<f32>,
    canonical_width: Option<u32>,
    canonical_height: Option<u32>,
    text_scale: Option<u32>,
    line_thickness: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct StorageConfigFile {
    results_dir: Option<PathBuf>,
    uploads_dir: Option<PathBuf>,
    jpeg_quality: Option<u8>,
    max_upload_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SpeechConfigFile {
    enabled: Option<bool>,
    program: Option<String>,
    args: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub input_size: u32,
    pub confidence: f32,
    pub nms_iou: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    pub results_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub jpeg_quality: u8,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectorConfig {
    pub model: ModelSettings,
    pub confidence_threshold: f32,
    pub canonical_width: u32,
    pub canonical_height: u32,
    pub text_scale: u32,
    pub line_thickness: u32,
    pub storage: StorageSettings,
    pub speech: SpeechSettings,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self::from_file(InspectorConfigFile::default())
    }
}

impl InspectorConfig {
    /// Loads `path` (or the file named by `PPE_CONFIG`), applies `PPE_*` environment overrides,
    /// and validates the result. Every setting has a default, so no file is required.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let file_cfg = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => read_config_file(&path)?,
            None => InspectorConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a JSON config document without consulting the environment.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let file: InspectorConfigFile =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        let cfg = Self::from_file(file);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: InspectorConfigFile) -> Self {
        let model = file.model.unwrap_or_default();
        let inspection = file.inspection.unwrap_or_default();
        let storage = file.storage.unwrap_or_default();
        let speech = file.speech.unwrap_or_default();
        InspectorConfig {
            model: ModelSettings {
                path: model.path.unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
                input_size: model.input_size.unwrap_or(DEFAULT_INPUT_SIZE),
                confidence: model.confidence.unwrap_or(DEFAULT_DETECTOR_CONFIDENCE),
                nms_iou: model.nms_iou.unwrap_or(DEFAULT_NMS_IOU),
            },
            confidence_threshold: inspection
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            canonical_width: inspection.canonical_width.unwrap_or(CANONICAL_WIDTH),
            canonical_height: inspection.canonical_height.unwrap_or(CANONICAL_HEIGHT),
            text_scale: inspection.text_scale.unwrap_or(2),
            line_thickness: inspection.line_thickness.unwrap_or(2),
            storage: StorageSettings {
                results_dir: storage
                    .results_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR)),
                uploads_dir: storage
                    .uploads_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR)),
                jpeg_quality: storage.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY),
                max_upload_bytes: storage.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
            speech: SpeechSettings {
                enabled: speech.enabled.unwrap_or(false),
                program: speech
                    .program
                    .unwrap_or_else(|| DEFAULT_SPEECH_PROGRAM.to_string()),
                args: speech.args.unwrap_or_default(),
            },
        }
    }

    /// Applies `PPE_*` overrides read through `lookup`. Blank values are ignored.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(path) = get("PPE_MODEL") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(value) = get("PPE_CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = parse_env("PPE_CONFIDENCE_THRESHOLD", value)?;
        }
        if let Some(dir) = get("PPE_RESULTS_DIR") {
            self.storage.results_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("PPE_UPLOADS_DIR") {
            self.storage.uploads_dir = PathBuf::from(dir);
        }
        if let Some(value) = get("PPE_MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = parse_env("PPE_MAX_UPLOAD_BYTES", value)?;
        }
        if let Some(value) = get("PPE_AUDIO") {
            self.speech.enabled = parse_env("PPE_AUDIO", value)?;
        }
        if let Some(program) = get("PPE_SPEECH_PROGRAM") {
            self.speech.program = program;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("model.confidence", self.model.confidence),
            ("model.nms_iou", self.model.nms_iou),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.canonical_width == 0 || self.canonical_height == 0 || self.model.input_size == 0 {
            return Err(ConfigError::Invalid(
                "image dimensions must be greater than zero".to_string(),
            ));
        }
        if self.text_scale == 0 || self.line_thickness == 0 {
            return Err(ConfigError::Invalid(
                "text_scale and line_thickness must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&self.storage.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.storage.jpeg_quality
            )));
        }
        Ok(())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            canonical_width: self.canonical_width,
            canonical_height: self.canonical_height,
            confidence_threshold: self.confidence_threshold,
            style: RenderStyle {
                text_scale: self.text_scale,
                line_thickness: self.line_thickness,
                ..RenderStyle::default()
            },
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

fn read_config_file(path: &Path) -> Result<InspectorConfigFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_the_deployed_policy() {
        let cfg = InspectorConfig::default();
        assert_eq!(cfg.confidence_threshold, 0.3);
        assert_eq!((cfg.canonical_width, cfg.canonical_height), (1020, 600));
        assert_eq!(cfg.storage.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.model.path, PathBuf::from("best.onnx"));
        assert!(!cfg.speech.enabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn loads_partial_file_and_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "model": {{ "path": "models/ppe.onnx", "input_size": 416 }},
                "inspection": {{ "confidence_threshold": 0.5 }},
                "storage": {{ "results_dir": "/tmp/ppe-results" }},
                "speech": {{ "enabled": true, "program": "say" }}
            }}"#
        )
        .unwrap();
        let cfg = InspectorConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.model.path, PathBuf::from("models/ppe.onnx"));
        assert_eq!(cfg.model.input_size, 416);
        assert_eq!(cfg.model.nms_iou, DEFAULT_NMS_IOU);
        assert_eq!(cfg.confidence_threshold, 0.5);
        assert_eq!(cfg.storage.results_dir, PathBuf::from("/tmp/ppe-results"));
        assert_eq!(cfg.storage.uploads_dir, PathBuf::from("uploads"));
        assert!(cfg.speech.enabled);
        assert_eq!(cfg.speech.program, "say");
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PPE_CONFIDENCE_THRESHOLD", "0.45"),
            ("PPE_AUDIO", "true"),
            ("PPE_RESULTS_DIR", "  "),
        ]);
        let mut cfg = InspectorConfig::default();
        cfg.apply_env(|key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.confidence_threshold, 0.45);
        assert!(cfg.speech.enabled);
        assert_eq!(cfg.storage.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn malformed_env_value_is_rejected() {
        let mut cfg = InspectorConfig::default();
        let err = cfg
            .apply_env(|key| (key == "PPE_MAX_UPLOAD_BYTES").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PPE_MAX_UPLOAD_BYTES", .. }));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let too_high = r#"{"inspection": {"confidence_threshold": 1.5}}"#;
        assert!(InspectorConfig::from_json_str(too_high).is_err());
        let zero_width = r#"{"inspection": {"canonical_width": 0}}"#;
        assert!(InspectorConfig::from_json_str(zero_width).is_err());
        assert!(InspectorConfig::from_json_str(r#"{"storage": {"jpeg_quality": 0}}"#).is_err());
        assert!(matches!(
            InspectorConfig::from_json_str(r#"{"unexpected": 1}"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn pipeline_settings_follow_config() {
        let cfg = InspectorConfig::from_json_str(
            r#"{"inspection": {"confidence_threshold": 0.6, "text_scale": 3}}"#,
        )
        .unwrap();
        let settings = cfg.pipeline_settings();
        assert_eq!(settings.confidence_threshold, 0.6);
        assert_eq!(settings.style.text_scale, 3);
        assert_eq!(settings.canonical_width, 1020);
    }
}
