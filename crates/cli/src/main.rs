#![deny(warnings)]

use anyhow::Context;
use bassbot_core::analysis::{AnalyzerConfig, EnvelopeAnalyzer};
use bassbot_core::chat::GeminiChatClient;
use bassbot_core::config::{
    resolve_api_key, resolve_string_with_default, AppConfig, Env, ServiceUrl, StdEnv,
    DEFAULT_LANGUAGE, DEFAULT_OUTPUT_DIR, DEFAULT_SPEAKER_ID, DEFAULT_STT_URL, DEFAULT_TTS_URL,
    ENV_GOOGLE_API_KEY, ENV_STT_URL, ENV_TTS_URL,
};
use bassbot_core::decode;
use bassbot_core::pipeline::{Pipeline, PipelineOptions};
use bassbot_core::stt::WhisperHttpClient;
use bassbot_core::tts::CoquiTtsClient;
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bassbot")]
#[command(about = "Animatronic fish voice pipeline (STT->chat->TTS->motor analysis)")]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(false)
        .args(["input", "analyze"])
))]
struct Args {
    /// Recorded question WAV; runs the full pipeline.
    #[arg(long)]
    input: Option<PathBuf>,

    /// WAV to analyze locally against --text, without calling any service.
    #[arg(long, requires = "text")]
    analyze: Option<PathBuf>,

    /// Reference text for --analyze.
    #[arg(long)]
    text: Option<String>,

    #[arg(long)]
    stt_url: Option<String>,

    #[arg(long)]
    tts_url: Option<String>,

    #[arg(long, env = ENV_GOOGLE_API_KEY)]
    google_api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    #[arg(long, default_value = DEFAULT_SPEAKER_ID)]
    speaker_id: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    if let Some(wav_path) = &args.analyze {
        let text = args.text.as_deref().unwrap_or_default();
        return run_analyze(wav_path, text);
    }

    let env = StdEnv;
    let Some(input) = args.input.clone() else {
        anyhow::bail!("either --input or --analyze must be provided");
    };
    let cfg = build_config(args, &env)?;

    tracing::info!(
        stt = %cfg.stt_url.as_url(),
        tts = %cfg.tts_url.as_url(),
        language = %cfg.language,
        "config loaded"
    );

    run_pipeline(cfg, &input).await
}

fn run_analyze(wav_path: &Path, text: &str) -> anyhow::Result<()> {
    let waveform = decode::read_wav(wav_path)
        .with_context(|| format!("could not read {}", wav_path.display()))?;
    let analyzer = EnvelopeAnalyzer::default();
    let result = analyzer.analyze(&waveform, text);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_pipeline(cfg: AppConfig, input: &Path) -> anyhow::Result<()> {
    let api_key = cfg
        .google_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("{ENV_GOOGLE_API_KEY} is required for the full pipeline"))?;

    let pipeline = Pipeline {
        stt: WhisperHttpClient::new(cfg.stt_url.clone()),
        chat: GeminiChatClient::new(api_key),
        tts: CoquiTtsClient::new(cfg.tts_url.clone()),
        analyzer: EnvelopeAnalyzer::new(cfg.analyzer),
        options: PipelineOptions {
            language: cfg.language.clone(),
            speaker_id: cfg.speaker_id.clone(),
            output_dir: cfg.output_dir.clone(),
        },
    };

    let result = pipeline.run(input).await?;
    tracing::info!(events = result.motor_events.len(), "pipeline finished");
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let stt_url = ServiceUrl::new(resolve_string_with_default(
        args.stt_url,
        ENV_STT_URL,
        env,
        DEFAULT_STT_URL,
    ))?;
    let tts_url = ServiceUrl::new(resolve_string_with_default(
        args.tts_url,
        ENV_TTS_URL,
        env,
        DEFAULT_TTS_URL,
    ))?;
    let google_api_key = resolve_api_key(args.google_api_key, ENV_GOOGLE_API_KEY, env)?;

    Ok(AppConfig {
        stt_url,
        tts_url,
        google_api_key,
        language: args.language,
        speaker_id: args.speaker_id,
        output_dir: args.output_dir,
        analyzer: AnalyzerConfig::default(),
    })
}
