use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AnimError, AnimResult};
use crate::model::frame_id::DEFAULT_PADDING;

/// Per-driver playback settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// Seconds between frames. Zero means "derive from `fps`".
    pub update_interval: f64,
    pub fps: u32,
    pub looping: bool,
    /// When set, frame ids are file stems under this folder.
    pub folder: Option<PathBuf>,
    pub image_type: String,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            update_interval: 0.0,
            fps: 30,
            looping: true,
            folder: None,
            image_type: "png".to_string(),
        }
    }
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, seconds: f64) -> Self {
        self.update_interval = seconds;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_image_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = image_type.into();
        self
    }

    /// The tick interval, or a configuration error. The interval must be
    /// representable as a non-zero `Duration`.
    pub fn interval(&self) -> AnimResult<Duration> {
        let seconds = self.update_interval;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(AnimError::InvalidInterval(seconds));
        }
        let seconds = if seconds > 0.0 {
            seconds
        } else if self.fps == 0 {
            return Err(AnimError::InvalidFps);
        } else {
            1.0 / self.fps as f64
        };
        match Duration::try_from_secs_f64(seconds) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(AnimError::InvalidInterval(seconds)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub prefix: String,
    pub start: u32,
    pub padding: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            start: 0,
            padding: DEFAULT_PADDING,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    pub prefix: String,
    pub start: u32,
    /// Inclusive. `None` discovers frames until the first missing one.
    pub end: Option<u32>,
    pub padding: usize,
    pub interval_ms: u64,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            start: 0,
            end: None,
            padding: DEFAULT_PADDING,
            interval_ms: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub frames_dir: PathBuf,
    pub preload: bool,
    pub animation: AnimationOptions,
    pub sequences: Vec<SequenceConfig>,
    pub dock: Option<DockConfig>,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("."),
            preload: true,
            animation: AnimationOptions::default(),
            sequences: Vec::new(),
            dock: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("framecycle").join("config.toml"))
    }

    /// Directory holding the frame files: the animation folder when one is
    /// set, `frames_dir` otherwise.
    pub fn scan_dir(&self) -> &Path {
        self.animation.folder.as_deref().unwrap_or(&self.frames_dir)
    }

    /// Frame file extension, shared by the folder scan, the cache and
    /// folder-mode drivers.
    pub fn extension(&self) -> &str {
        &self.animation.image_type
    }

    /// Falls back to `Info` for an unknown level name.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AnimResult<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| AnimError::Config(e.to_string()))?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> AnimResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content).map_err(|e| AnimError::Config(e.to_string()))?;
        config.animation.interval()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_interval_from_fps_and_explicit() {
        let opts = AnimationOptions::new();
        assert_eq!(opts.interval().unwrap(), Duration::from_secs_f64(1.0 / 30.0));

        let opts = AnimationOptions::new().with_fps(30).with_interval(0.25);
        assert_eq!(opts.interval().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_interval_rejects_bad_values() {
        assert!(matches!(
            AnimationOptions::new().with_fps(0).interval(),
            Err(AnimError::InvalidFps)
        ));
        assert!(matches!(
            AnimationOptions::new().with_interval(-1.0).interval(),
            Err(AnimError::InvalidInterval(_))
        ));
        assert!(matches!(
            AnimationOptions::new().with_interval(f64::NAN).interval(),
            Err(AnimError::InvalidInterval(_))
        ));
        // an explicit interval makes fps irrelevant
        assert!(AnimationOptions::new().with_fps(0).with_interval(0.1).interval().is_ok());
    }

    #[test]
    fn test_interval_rejects_unrepresentable_durations() {
        assert!(matches!(
            AnimationOptions::new().with_interval(1e30).interval(),
            Err(AnimError::InvalidInterval(s)) if s == 1e30
        ));
        assert!(matches!(
            AnimationOptions::new().with_interval(1e-12).interval(),
            Err(AnimError::InvalidInterval(_))
        ));
        // 1 / u32::MAX seconds is below one nanosecond
        assert!(matches!(
            AnimationOptions::new().with_fps(u32::MAX).interval(),
            Err(AnimError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_load_rejects_huge_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[animation]\nupdate_interval = 1e30\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(AnimError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = Config::load_from_file(dir.path().join("missing").join("config.toml"));
        match result {
            Err(AnimError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected an io error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_animation_image_type_drives_folder_scan() {
        let frames = tempdir().unwrap();
        for name in ["run_00000.jpg", "run_00001.jpg", "stray.png"] {
            fs::write(frames.path().join(name), b"").unwrap();
        }
        let toml = format!(
            "frames_dir = \"unused\"\n[animation]\nimage_type = \"jpg\"\nfolder = {:?}\n",
            frames.path().to_string_lossy()
        );
        let config = Config::from_toml_str(&toml).unwrap();

        assert_eq!(config.scan_dir(), frames.path());
        assert_eq!(config.extension(), "jpg");
        let names = crate::model::catalog::frame_names(config.scan_dir(), config.extension()).unwrap();
        assert_eq!(names, vec!["run_00000".to_string(), "run_00001".to_string()]);

        let without_folder = Config::default();
        assert_eq!(without_folder.scan_dir(), Path::new("."));
        assert_eq!(without_folder.extension(), "png");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            frames_dir = "assets/frames"

            [animation]
            fps = 12
            looping = false

            [[sequences]]
            prefix = "walk_"

            [dock]
            prefix = "badge_"
            end = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.frames_dir, PathBuf::from("assets/frames"));
        assert_eq!(config.animation.fps, 12);
        assert!(!config.animation.looping);
        assert_eq!(config.animation.image_type, "png");
        assert_eq!(config.sequences[0].padding, DEFAULT_PADDING);
        let dock = config.dock.as_ref().unwrap();
        assert_eq!(dock.end, Some(7));
        assert_eq!(dock.interval_ms, 100);
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_log_level_filter() {
        let config = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };
        assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);

        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sequences.push(SequenceConfig {
            prefix: "spin_".to_string(),
            start: 1,
            padding: 3,
        });
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_zero_fps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[animation]\nfps = 0\n").unwrap();
        assert!(matches!(Config::load_from_file(&path), Err(AnimError::InvalidFps)));
    }
}
