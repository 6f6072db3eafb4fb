use crate::analysis::{
    frames, word_at_byte_index, AnalysisResult, AnalyzerConfig, EventReason, Frame, MotorAction,
    MotorEvent,
};
use crate::decode::Waveform;

/// Turns a waveform plus its reference text into a sorted motor-event list.
/// One instance holds fixed configuration only; every `analyze` call owns its
/// own scan state, so independent calls may run concurrently.
#[derive(Clone, Debug, Default)]
pub struct EnvelopeAnalyzer {
    config: AnalyzerConfig,
}

/// Running state for a single scan: the mouth flag and the two timers.
/// Both timers start one full window in the past so the first frame is
/// never suppressed.
#[derive(Clone, Copy, Debug)]
struct ScanState {
    mouth_open: bool,
    last_mouth_close_ms: i64,
    last_tail_flap_ms: i64,
}

impl ScanState {
    fn new(config: &AnalyzerConfig) -> Self {
        Self {
            mouth_open: false,
            last_mouth_close_ms: -config.mouth_debounce_ms,
            last_tail_flap_ms: -config.tail_cooldown_ms,
        }
    }

    /// At most one transition per frame. A loud frame inside the debounce
    /// window after a close is suppressed entirely.
    fn mouth_transition(
        &mut self,
        frame: &Frame,
        config: &AnalyzerConfig,
    ) -> Option<(MotorAction, EventReason)> {
        if !self.mouth_open
            && frame.rms > config.mouth_rms_threshold
            && frame.timestamp_ms - self.last_mouth_close_ms > config.mouth_debounce_ms
        {
            self.mouth_open = true;
            return Some((MotorAction::MouthOpen, EventReason::VolumeAboveThreshold));
        }
        if self.mouth_open && frame.rms <= config.mouth_rms_threshold {
            self.mouth_open = false;
            self.last_mouth_close_ms = frame.timestamp_ms;
            return Some((MotorAction::MouthClose, EventReason::VolumeBelowThreshold));
        }
        None
    }

    /// Cooldown-gated peak detector; fires at most once per cooldown window.
    fn tail_triggered(&mut self, frame: &Frame, config: &AnalyzerConfig) -> bool {
        if frame.peak > config.tail_peak_threshold
            && frame.timestamp_ms - self.last_tail_flap_ms > config.tail_cooldown_ms
        {
            self.last_tail_flap_ms = frame.timestamp_ms;
            return true;
        }
        false
    }
}

impl EnvelopeAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Single pass over the frames (mouth logic before tail logic in each
    /// frame), then the head-turn post-pass, then a stable sort by timestamp
    /// so same-frame ties keep their emission order. Never fails: degenerate
    /// input produces a well-formed result with an empty event list.
    pub fn analyze(&self, waveform: &Waveform, source_text: &str) -> AnalysisResult {
        let duration_ms = waveform.duration_ms();
        // The +1 avoids division by zero for empty audio at the cost of a
        // slight under-estimate.
        let chars_per_ms = source_text.len() as f64 / (duration_ms + 1.0);

        let mut state = ScanState::new(&self.config);
        let mut events = Vec::new();

        for frame in frames(waveform, self.config.frame_ms) {
            let estimated_index = (frame.timestamp_ms as f64 * chars_per_ms) as usize;
            let analyzed_word = word_at_byte_index(source_text, estimated_index);

            if let Some((action, reason)) = state.mouth_transition(&frame, &self.config) {
                events.push(MotorEvent {
                    timestamp_ms: frame.timestamp_ms,
                    action,
                    reason,
                    analyzed_word: Some(analyzed_word.clone()),
                });
            }
            if state.tail_triggered(&frame, &self.config) {
                events.push(MotorEvent {
                    timestamp_ms: frame.timestamp_ms,
                    action: MotorAction::TailFlap,
                    reason: EventReason::PeakDetected,
                    analyzed_word: Some(analyzed_word),
                });
            }
        }

        self.push_head_turns(&mut events);
        events.sort_by_key(|event| event.timestamp_ms);

        AnalysisResult {
            source_text: source_text.to_owned(),
            audio_duration_ms: duration_ms,
            motor_events: events,
        }
    }

    /// Derive head framing once from the completed event set: turn forward
    /// just before the first mouth opening, back just after the last close.
    fn push_head_turns(&self, events: &mut Vec<MotorEvent>) {
        let first_open = events
            .iter()
            .filter(|e| e.action == MotorAction::MouthOpen)
            .map(|e| e.timestamp_ms)
            .min();
        let last_close = events
            .iter()
            .filter(|e| e.action == MotorAction::MouthClose)
            .map(|e| e.timestamp_ms)
            .max();

        if let Some(ts) = first_open {
            events.push(MotorEvent {
                timestamp_ms: (ts - self.config.head_turn_padding_ms).max(0),
                action: MotorAction::HeadTurnForward,
                reason: EventReason::SpeechStart,
                analyzed_word: None,
            });
        }
        if let Some(ts) = last_close {
            events.push(MotorEvent {
                timestamp_ms: ts + self.config.head_turn_padding_ms,
                action: MotorAction::HeadTurnBack,
                reason: EventReason::SpeechEnd,
                analyzed_word: None,
            });
        }
    }
}
