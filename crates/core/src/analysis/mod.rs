mod analyzer;
mod frames;
mod words;

use serde::{Deserialize, Serialize};

pub use analyzer::EnvelopeAnalyzer;
pub use frames::{frames, Frame};
pub use words::word_at_byte_index;

pub const DEFAULT_FRAME_MS: u32 = 30;
pub const DEFAULT_MOUTH_RMS_THRESHOLD: f64 = 800.0;
pub const DEFAULT_TAIL_PEAK_THRESHOLD: i32 = 25_000;
pub const DEFAULT_MOUTH_DEBOUNCE_MS: i64 = 180;
pub const DEFAULT_TAIL_COOLDOWN_MS: i64 = 350;
pub const DEFAULT_HEAD_TURN_PADDING_MS: i64 = 150;

/// Thresholds and timing knobs for one analyzer instance. Fixed for the
/// lifetime of the analyzer; never mutated during a scan.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalyzerConfig {
    pub frame_ms: u32,
    pub mouth_rms_threshold: f64,
    pub tail_peak_threshold: i32,
    pub mouth_debounce_ms: i64,
    pub tail_cooldown_ms: i64,
    pub head_turn_padding_ms: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_ms: DEFAULT_FRAME_MS,
            mouth_rms_threshold: DEFAULT_MOUTH_RMS_THRESHOLD,
            tail_peak_threshold: DEFAULT_TAIL_PEAK_THRESHOLD,
            mouth_debounce_ms: DEFAULT_MOUTH_DEBOUNCE_MS,
            tail_cooldown_ms: DEFAULT_TAIL_COOLDOWN_MS,
            head_turn_padding_ms: DEFAULT_HEAD_TURN_PADDING_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotorAction {
    MouthOpen,
    MouthClose,
    TailFlap,
    HeadTurnForward,
    HeadTurnBack,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventReason {
    VolumeAboveThreshold,
    VolumeBelowThreshold,
    PeakDetected,
    SpeechStart,
    SpeechEnd,
}

/// One timestamped actuator instruction. `analyzed_word` is attached to
/// frame-driven events (possibly as an empty string) and omitted from the
/// wire format on head-turn events.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MotorEvent {
    pub timestamp_ms: i64,
    pub action: MotorAction,
    pub reason: EventReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_word: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub source_text: String,
    pub audio_duration_ms: f64,
    pub motor_events: Vec<MotorEvent>,
}
