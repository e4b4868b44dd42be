// vidsearch constants
// Defaults for config fields live here so the CLI, server and tests agree.

// Paths
pub const DB_FILENAME: &str = "video.db";
pub const UPLOADS_FOLDER: &str = "uploads";
pub const CONFIG_FILENAME: &str = "vidsearch.json";

// Server
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024; // 2 GiB
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const ROOT_MESSAGE: &str = "Video Search API is running";

// Sampling
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 2.0;
pub const TIMESTAMP_DECIMALS: i32 = 2;

// Detection model
pub const DEFAULT_MODEL_PATH: &str = "yolov8n.onnx";
pub const MODEL_INPUT_SIZE: u32 = 640;
pub const LETTERBOX_FILL: u8 = 114;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;
pub const DETECTOR_INTRA_THREADS: usize = 2;

// Translation
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TRANSLATE_TIMEOUT_SECS: u64 = 10;

// Fallback extension when neither the filename nor the content type tells us
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

// Video extensions (containers ffmpeg decodes natively)
pub const VIDEO_EXTENSIONS: [&str; 20] = [
    "mp4", "mov", "avi", "mkv", "mts", "m2ts", "mxf", "mpg", "mpeg",
    "wmv", "flv", "webm", "3gp", "m4v", "ts", "vob", "mod", "tod",
    "dv", "ogv"
];
