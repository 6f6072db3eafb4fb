use crate::analysis::{AnalysisResult, EnvelopeAnalyzer};
use crate::chat::{ChatClient, ChatError};
use crate::config::{DEFAULT_LANGUAGE, DEFAULT_OUTPUT_DIR, DEFAULT_SPEAKER_ID};
use crate::decode::{self, DecodeError};
use crate::stt::{SttClient, SttError};
use crate::tts::{TtsClient, TtsError};
use bytes::Bytes;
use std::path::{Path, PathBuf};

pub const RESPONSE_WAV_FILENAME: &str = "response.wav";
pub const INSTRUCTIONS_FILENAME: &str = "instructions.json";

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcription failed: {0}")]
    Stt(#[from] SttError),

    #[error("reply generation failed: {0}")]
    Chat(#[from] ChatError),

    #[error("speech synthesis failed: {0}")]
    Tts(#[from] TtsError),

    #[error("synthesized audio unreadable: {0}")]
    Decode(#[from] DecodeError),

    #[error("could not serialize instructions: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub language: String,
    pub speaker_id: String,
    pub output_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            speaker_id: DEFAULT_SPEAKER_ID.to_owned(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// The full question-to-motor-instructions flow: transcribe the recorded
/// question, generate a reply, synthesize it, then analyze the synthesized
/// audio against the reply text. Strictly sequential; a failed step aborts
/// the run and nothing partial is written past the failure.
pub struct Pipeline<S, C, T> {
    pub stt: S,
    pub chat: C,
    pub tts: T,
    pub analyzer: EnvelopeAnalyzer,
    pub options: PipelineOptions,
}

impl<S, C, T> Pipeline<S, C, T>
where
    S: SttClient,
    C: ChatClient,
    T: TtsClient,
{
    pub async fn run(&self, input_wav: &Path) -> Result<AnalysisResult, PipelineError> {
        tracing::info!(path = %input_wav.display(), "transcribing input audio");
        let input = tokio::fs::read(input_wav).await?;
        let transcript = self
            .stt
            .transcribe(Bytes::from(input), self.options.language.clone())
            .await?;
        tracing::info!(text = %transcript.text, "transcript received");

        let reply = self.chat.reply(transcript.text.clone()).await?;
        tracing::info!(text = %reply, "reply generated");

        let wav = self
            .tts
            .synthesize(reply.clone(), self.options.speaker_id.clone())
            .await?;
        tokio::fs::create_dir_all(&self.options.output_dir).await?;
        let response_path = self.options.output_dir.join(RESPONSE_WAV_FILENAME);
        tokio::fs::write(&response_path, &wav).await?;
        tracing::info!(path = %response_path.display(), bytes = wav.len(), "reply audio saved");

        let waveform = decode::waveform_from_wav_bytes(&wav)?;
        let result = self.analyzer.analyze(&waveform, &reply);

        let instructions_path = self.options.output_dir.join(INSTRUCTIONS_FILENAME);
        tokio::fs::write(&instructions_path, serde_json::to_vec_pretty(&result)?).await?;
        tracing::info!(
            path = %instructions_path.display(),
            events = result.motor_events.len(),
            "motor instructions written"
        );

        Ok(result)
    }
}
