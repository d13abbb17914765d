use directories::ProjectDirs;
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::io;
use std::num::{ParseFloatError, ParseIntError};
use std::path::{Path, PathBuf};

pub const FRAME_RATE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Whether the seconds left in the current leg are printed inside the circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    #[default]
    Off,
    /// Text in the box color
    On,
    CustomColor(Rgb),
}

impl TextMode {
    /// Resolve the text color, or None when text is disabled
    pub fn color(&self, box_color: Rgb) -> Option<Rgb> {
        match self {
            TextMode::Off => None,
            TextMode::On => Some(box_color),
            TextMode::CustomColor(rgb) => Some(*rgb),
        }
    }
}

/// Where the circle's center runs relative to the drawn box
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum MotionMode {
    /// Follow the centerline of the border stroke
    #[default]
    Inset,
    /// Follow the raw rectangle edges, ignoring thickness
    Corner,
}

/// Seconds for the top, right, bottom and left legs. Every entry is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegDurations([u32; 4]);

impl LegDurations {
    pub fn new(secs: [u32; 4]) -> Result<Self, ValueError> {
        match secs.iter().find(|s| **s == 0) {
            Some(zero) => Err(ValueError::NotPositive(i64::from(*zero))),
            None => Ok(Self(secs)),
        }
    }

    /// Map 1, 2 or 4 positional arguments onto the four legs.
    ///
    /// One value applies to every leg, two values are (horizontal, vertical).
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        if !matches!(args.len(), 1 | 2 | 4) {
            return Err(ConfigError::ArgumentCount(args.len()));
        }

        let secs = args
            .iter()
            .map(|arg| parse_leg_arg(arg.as_ref()))
            .collect::<Result<Vec<u32>, _>>()?;

        let legs = match secs[..] {
            [all] => [all; 4],
            [horizontal, vertical] => [horizontal, vertical, horizontal, vertical],
            [top, right, bottom, left] => [top, right, bottom, left],
            _ => return Err(ConfigError::ArgumentCount(secs.len())),
        };

        Ok(Self(legs))
    }

    pub fn seconds(&self) -> [u32; 4] {
        self.0
    }
}

impl Default for LegDurations {
    fn default() -> Self {
        Self([2; 4])
    }
}

fn parse_leg_arg(arg: &str) -> Result<u32, ConfigError> {
    let n: i64 = arg
        .trim()
        .parse()
        .map_err(|_| ConfigError::NotAnInteger(arg.to_string()))?;
    if n <= 0 {
        return Err(ConfigError::NonPositive(arg.to_string()));
    }
    u32::try_from(n).map_err(|_| ConfigError::TooLarge(arg.to_string()))
}

/// Fully resolved settings. Built once before the session starts and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub leg_durations: LegDurations,
    pub frame_rate: u32,
    pub background_color: Rgb,
    pub box_color: Rgb,
    pub circle_color: Rgb,
    pub box_width_ratio: f64,
    pub box_height_ratio: f64,
    pub box_thickness: u32,
    pub circle_start_radius: f64,
    pub circle_end_radius: f64,
    pub circle_text: TextMode,
    pub countdown_secs: Option<u32>,
    pub countdown_color: Rgb,
    pub motion_mode: MotionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leg_durations: LegDurations::default(),
            frame_rate: FRAME_RATE,
            background_color: Rgb::WHITE,
            box_color: Rgb::BLACK,
            circle_color: Rgb::RED,
            box_width_ratio: 0.5,
            box_height_ratio: 0.5,
            box_thickness: 2,
            // radii are in braille dots, two per terminal column
            circle_start_radius: 3.0,
            circle_end_radius: 9.0,
            circle_text: TextMode::Off,
            countdown_secs: None,
            countdown_color: Rgb::BLACK,
            motion_mode: MotionMode::Inset,
        }
    }
}

impl Config {
    /// Parse a `key=value` config file body on top of the defaults.
    ///
    /// Any bad line rejects the whole file. Unknown keys are skipped.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut cfg = Config::default();
        let mut legs = cfg.leg_durations.seconds();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (key, value) =
                trimmed
                    .split_once('=')
                    .ok_or_else(|| ConfigError::MalformedLine {
                        line,
                        text: trimmed.to_string(),
                    })?;
            let key = key.trim().to_lowercase();
            let value = value.trim();
            let invalid = |source: ValueError| ConfigError::InvalidValue {
                line,
                key: key.clone(),
                value: value.to_string(),
                source,
            };

            match key.as_str() {
                "leg1_time" => legs[0] = parse_positive_int(value).map_err(invalid)?,
                "leg2_time" => legs[1] = parse_positive_int(value).map_err(invalid)?,
                "leg3_time" => legs[2] = parse_positive_int(value).map_err(invalid)?,
                "leg4_time" => legs[3] = parse_positive_int(value).map_err(invalid)?,
                "background_color" => cfg.background_color = parse_rgb(value).map_err(invalid)?,
                "box_color" => cfg.box_color = parse_rgb(value).map_err(invalid)?,
                "circle_color" => cfg.circle_color = parse_rgb(value).map_err(invalid)?,
                "timer_color" => cfg.countdown_color = parse_rgb(value).map_err(invalid)?,
                "box_width_percent" => cfg.box_width_ratio = parse_ratio(value).map_err(invalid)?,
                "box_height_percent" => {
                    cfg.box_height_ratio = parse_ratio(value).map_err(invalid)?
                }
                "box_thickness" => cfg.box_thickness = parse_thickness(value).map_err(invalid)?,
                "circle_start_radius" => {
                    cfg.circle_start_radius = parse_positive_float(value).map_err(invalid)?
                }
                "circle_end_radius" => {
                    cfg.circle_end_radius = parse_positive_float(value).map_err(invalid)?
                }
                "display_text" => cfg.circle_text = parse_text_mode(value).map_err(invalid)?,
                "timer_duration" => cfg.countdown_secs = Some(parse_clock(value).map_err(invalid)?),
                "motion_mode" => cfg.motion_mode = parse_motion_mode(value).map_err(invalid)?,
                _ => tracing::debug!(%key, line, "ignoring unrecognized config key"),
            }
        }

        // each leg was checked on assignment
        cfg.leg_durations = LegDurations(legs);
        Ok(cfg)
    }

    /// Frames per leg at the configured frame rate
    pub fn leg_frames(&self) -> [u64; 4] {
        self.leg_durations
            .seconds()
            .map(|secs| u64::from(secs) * u64::from(self.frame_rate))
    }

    pub fn countdown_frames(&self) -> Option<u64> {
        self.countdown_secs
            .map(|secs| u64::from(secs) * u64::from(self.frame_rate))
    }
}

/// Pick the configuration source: an explicit file, positional leg seconds,
/// or the default config file when it exists.
pub fn resolve<S: AsRef<str>>(
    config_path: Option<&Path>,
    times: &[S],
) -> Result<Config, ConfigError> {
    if let Some(path) = config_path {
        return FileConfigStore::with_path(path).load();
    }

    if !times.is_empty() {
        return Ok(Config {
            leg_durations: LegDurations::from_args(times)?,
            ..Config::default()
        });
    }

    let store = FileConfigStore::new();
    if store.exists() {
        store.load()
    } else {
        tracing::debug!(path = %store.path().display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "box-breather") {
            pd.config_dir().join("config.txt")
        } else {
            PathBuf::from("box_breather.txt")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let cfg = Config::parse(&text)?;
        tracing::info!(path = %self.path().display(), "loaded config file");
        Ok(cfg)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a single value failed to parse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("not an integer ({0})")]
    Integer(#[from] ParseIntError),
    #[error("not a number ({0})")]
    Float(#[from] ParseFloatError),
    #[error("must be positive, got {0}")]
    NotPositive(i64),
    #[error("must not be negative, got {0}")]
    Negative(i64),
    #[error("must be a positive number, got {0}")]
    NotPositiveFloat(f64),
    #[error("{0} is too large")]
    TooLarge(i64),
    #[error("expected three channels `r,g,b`, got {0}")]
    ColorComponents(usize),
    #[error("color channel {0} is outside 0-255")]
    ChannelRange(i64),
    #[error("ratio {0} is outside (0, 1]")]
    Ratio(f64),
    #[error("expected `true`, `false` or an RGB value `r,g,b`")]
    TextMode,
    #[error("expected a duration `mm:ss` with seconds below 60")]
    ClockFormat,
    #[error("expected `inset` or `corner`")]
    MotionMode,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error reading config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: expected `key=value`, found {text:?}")]
    MalformedLine { line: usize, text: String },
    #[error("line {line}: invalid value {value:?} for `{key}`: {source}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        #[source]
        source: ValueError,
    },
    #[error("expected 1, 2 or 4 leg durations, got {0}")]
    ArgumentCount(usize),
    #[error("please provide positive integers for seconds: {0:?} is not an integer")]
    NotAnInteger(String),
    #[error("please provide positive integers for seconds: got {0}")]
    NonPositive(String),
    #[error("{0} seconds is too long for a leg")]
    TooLarge(String),
}

fn parse_int(value: &str) -> Result<i64, ValueError> {
    Ok(value.parse::<i64>()?)
}

fn parse_positive_int(value: &str) -> Result<u32, ValueError> {
    let n = parse_int(value)?;
    if n <= 0 {
        return Err(ValueError::NotPositive(n));
    }
    u32::try_from(n).map_err(|_| ValueError::TooLarge(n))
}

fn parse_thickness(value: &str) -> Result<u32, ValueError> {
    let n = parse_int(value)?;
    if n < 0 {
        return Err(ValueError::Negative(n));
    }
    u32::try_from(n).map_err(|_| ValueError::TooLarge(n))
}

fn parse_positive_float(value: &str) -> Result<f64, ValueError> {
    let f: f64 = value.parse()?;
    if f.is_finite() && f > 0.0 {
        Ok(f)
    } else {
        Err(ValueError::NotPositiveFloat(f))
    }
}

fn parse_ratio(value: &str) -> Result<f64, ValueError> {
    let f: f64 = value.parse()?;
    if f > 0.0 && f <= 1.0 {
        Ok(f)
    } else {
        Err(ValueError::Ratio(f))
    }
}

fn parse_channel(channel: &str) -> Result<u8, ValueError> {
    let n = parse_int(channel)?;
    u8::try_from(n).map_err(|_| ValueError::ChannelRange(n))
}

fn parse_rgb(value: &str) -> Result<Rgb, ValueError> {
    let channels: Vec<&str> = value.split(',').map(str::trim).collect();
    let (r, g, b) = channels
        .iter()
        .map(|c| parse_channel(c))
        .collect_tuple()
        .ok_or(ValueError::ColorComponents(channels.len()))?;
    Ok(Rgb::new(r?, g?, b?))
}

fn parse_text_mode(value: &str) -> Result<TextMode, ValueError> {
    match value.to_lowercase().as_str() {
        "true" => Ok(TextMode::On),
        "false" => Ok(TextMode::Off),
        _ => parse_rgb(value)
            .map(TextMode::CustomColor)
            .map_err(|_| ValueError::TextMode),
    }
}

fn parse_motion_mode(value: &str) -> Result<MotionMode, ValueError> {
    match value.to_lowercase().as_str() {
        "inset" => Ok(MotionMode::Inset),
        "corner" => Ok(MotionMode::Corner),
        _ => Err(ValueError::MotionMode),
    }
}

/// Parse a `mm:ss` duration into whole seconds. Zero is rejected.
pub fn parse_clock(value: &str) -> Result<u32, ValueError> {
    let (mm, ss) = value.trim().split_once(':').ok_or(ValueError::ClockFormat)?;
    let minutes: u32 = mm.trim().parse()?;
    let seconds: u32 = ss.trim().parse()?;
    if seconds >= 60 {
        return Err(ValueError::ClockFormat);
    }
    let total = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or(ValueError::TooLarge(i64::from(minutes)))?;
    if total == 0 {
        return Err(ValueError::NotPositive(0));
    }
    Ok(total)
}
