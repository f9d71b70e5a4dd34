use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use voicechat::api::{ApiServer, ApiState};
use voicechat::voice::{
    AudioCapture, AudioPlayback, PLAYBACK_SAMPLE_RATE, SAMPLE_RATE, SegmentState, SpeechSegmenter,
    TextToSpeech, calculate_energy,
};
use voicechat::{App, Config, LanguageMode, locale};

/// voicechat - Bilingual Urdu/English voice chat
#[derive(Parser)]
#[command(name = "voicechat", version, about)]
struct Cli {
    /// Language to start in ("urdu" or "english")
    #[arg(short, long, env = "VOICECHAT_LANGUAGE")]
    language: Option<String>,

    /// Port for the session API
    #[arg(long, env = "VOICECHAT_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable microphone input and spoken replies
    #[arg(long, env = "VOICECHAT_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Serve the session API (default)
    Serve,
    /// Chat in the terminal
    Chat,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output in the active language's voice
    TestTts {
        /// Text to speak (defaults to the language's farewell)
        text: Option<String>,
    },
    /// Print the localization bundles
    Strings,
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voicechat=info",
        1 => "info,voicechat=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Serve);

    match command {
        Command::Setup => return voicechat::setup::run_setup(),
        Command::Strings => return print_strings(),
        Command::TestMic { duration } => return test_mic(duration).await,
        Command::TestSpeaker => return test_speaker().await,
        Command::Serve | Command::Chat | Command::TestTts { .. } => {}
    }

    let mut config = Config::load_with_options(cli.disable_voice)?;
    if let Some(language) = &cli.language {
        config.language = language.parse::<LanguageMode>()?;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    match command {
        Command::TestTts { text } => test_tts(&config, text.as_deref()).await,
        Command::Chat => {
            let app = App::from_config(&config)?;
            tracing::info!(language = %config.language, "starting terminal chat");
            voicechat::terminal::run_chat(&app.turns, app.microphone(), config.language).await
        }
        _ => serve(&config).await,
    }
}

/// Run the session API until interrupted
async fn serve(config: &Config) -> anyhow::Result<()> {
    let app = App::from_config(config)?;

    tracing::info!(
        port = config.port,
        language = %config.language,
        voice_enabled = config.voice_enabled,
        session_idle_secs = config.session_idle.as_secs(),
        "starting voicechat"
    );

    let state = Arc::new(
        ApiState::new(
            app.turns.clone(),
            app.input.clone(),
            app.voice_enabled,
            config.language,
        )
        .with_session_idle(config.session_idle),
    );

    ApiServer::new(state, config.port).run().await?;
    Ok(())
}

/// Print both bundles side by side
fn print_strings() -> anyhow::Result<()> {
    locale::validate()?;

    let urdu = locale::resolve(LanguageMode::Urdu).entries();
    let english = locale::resolve(LanguageMode::English).entries();

    for ((field, ur), (_, en)) in urdu.iter().zip(english.iter()) {
        println!("{field}");
        println!("  urdu:    {ur}");
        println!("  english: {en}");
    }

    Ok(())
}

/// Report per-second input level and whether the segmenter hears speech
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Listening on the default input at {SAMPLE_RATE} Hz for {duration}s.");
    println!("Say a sentence in Urdu or English.\n");

    let heard = tokio::task::spawn_blocking(move || -> anyhow::Result<u32> {
        let mut capture = AudioCapture::new()?;
        capture.start()?;

        let mut segmenter = SpeechSegmenter::new();
        let mut segments = 0;

        for second in 1..=duration {
            std::thread::sleep(Duration::from_secs(1));

            let samples = capture.take_buffer();
            let level = calculate_energy(&samples);
            let state = segmenter.process(&samples);
            if state == SegmentState::Complete {
                segments += 1;
                segmenter.take_segment();
            }

            println!("{second:>3}s  level {level:.3}  {state:?}");
        }

        capture.stop();
        Ok(segments)
    })
    .await??;

    if heard == 0 {
        println!("\nNo complete utterance was detected; microphone turns will come back empty.");
    } else {
        println!("\nDetected {heard} utterance(s); the microphone is usable for chat.");
    }

    Ok(())
}

/// Play a short tone through the default output
async fn test_speaker() -> anyhow::Result<()> {
    const TONE_HZ: f32 = 440.0;
    const SECONDS: usize = 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..PLAYBACK_SAMPLE_RATE as usize * SECONDS)
        .map(|i| {
            let t = i as f32 / PLAYBACK_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * TONE_HZ * t).sin() * 0.3
        })
        .collect();

    println!("Playing a {TONE_HZ} Hz tone for {SECONDS}s at {PLAYBACK_SAMPLE_RATE} Hz.");
    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play(samples)).await??;
    println!("Done. Spoken replies use the same output device.");

    Ok(())
}

/// Test TTS output via Azure Speech
async fn test_tts(config: &Config, text: Option<&str>) -> anyhow::Result<()> {
    let bundle = locale::resolve(config.language);
    let text = text.unwrap_or(bundle.farewell);
    println!("Testing TTS with text: \"{text}\" ({})\n", bundle.voice);

    let key = config
        .speech
        .azure_key
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("AZURE_SPEECH_KEY is not configured"))?;
    let tts = TextToSpeech::new_azure(key.expose_secret(), &config.speech.azure_region)?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text, bundle.voice).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_mp3(&mp3_data)).await??;

    println!("Done.");

    Ok(())
}
