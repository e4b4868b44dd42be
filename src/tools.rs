// Locating the ffmpeg/ffprobe executables
//
// Lookup: VIDSEARCH_<TOOL>_PATH override, then next to our own executable,
// then its bin/ folder, then whatever PATH resolves.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }

    fn env_key(self) -> &'static str {
        match self {
            Tool::Ffmpeg => "VIDSEARCH_FFMPEG_PATH",
            Tool::Ffprobe => "VIDSEARCH_FFPROBE_PATH",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ffmpeg" => Some(Tool::Ffmpeg),
            "ffprobe" => Some(Tool::Ffprobe),
            _ => None,
        }
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Candidate locations beside the running binary, in priority order
fn bundled_candidates(name: &str) -> Vec<PathBuf> {
    let Some(dir) = env::current_exe().ok().and_then(|p| p.parent().map(PathBuf::from)) else {
        return Vec::new();
    };
    let file = executable_name(name);
    vec![dir.join(&file), dir.join("bin").join(&file)]
}

fn resolve(env_key: &str, name: &str) -> PathBuf {
    if let Some(value) = env::var_os(env_key) {
        let path = PathBuf::from(&value);
        if path.exists() {
            return path;
        }
        log::warn!("{} is set to {} but nothing is there; ignoring it", env_key, path.display());
    }

    bundled_candidates(name)
        .into_iter()
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from(name))
}

pub fn tool_path(tool: Tool) -> PathBuf {
    resolve(tool.env_key(), tool.name())
}

pub fn ffprobe_path() -> PathBuf {
    tool_path(Tool::Ffprobe)
}

pub fn ffmpeg_path() -> PathBuf {
    tool_path(Tool::Ffmpeg)
}

/// True when the named tool resolves to something that runs `-version`
pub fn is_tool_available(name: &str) -> bool {
    let Some(tool) = Tool::from_name(name) else {
        return false;
    };

    std::process::Command::new(tool_path(tool))
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
