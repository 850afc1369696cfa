use std::env;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tokio::fs;

use volc_speech::{DirectoryUploader, SpeechClient, SpeechConfig, install_crypto_provider};

const USAGE: &str = "Usage:
  volc-speech [--config <file.yaml>] recognize <audio-file> [--format <tag>]
  volc-speech [--config <file.yaml>] synthesize <text> [--instruction <label>]
              [--output <file> | --store <dir>]";

enum Command {
    Recognize {
        audio: PathBuf,
        format: Option<String>,
    },
    Synthesize {
        text: String,
        instruction: String,
        output: Option<PathBuf>,
        store: Option<PathBuf>,
    },
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> anyhow::Result<(Option<PathBuf>, Command)> {
    let mut config_path = None;

    let command = loop {
        let arg = args.next().ok_or_else(|| anyhow!("Missing command\n{USAGE}"))?;
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => break arg,
        }
    };

    match command.as_str() {
        "recognize" => {
            let audio = args
                .next()
                .ok_or_else(|| anyhow!("recognize requires an audio file"))?;
            let mut format = None;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "-f" | "--format" => {
                        format = Some(
                            args.next()
                                .ok_or_else(|| anyhow!("--format requires a value (e.g. wav)"))?,
                        );
                    }
                    other => anyhow::bail!("Unknown option '{other}' for recognize"),
                }
            }

            Ok((
                config_path,
                Command::Recognize {
                    audio: PathBuf::from(audio),
                    format,
                },
            ))
        }
        "synthesize" => {
            let text = args
                .next()
                .ok_or_else(|| anyhow!("synthesize requires the text to speak"))?;
            let mut instruction = String::new();
            let mut output = None;
            let mut store = None;

            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "-i" | "--instruction" => {
                        instruction = args
                            .next()
                            .ok_or_else(|| anyhow!("--instruction requires a label"))?;
                    }
                    "-o" | "--output" => {
                        let path = args
                            .next()
                            .ok_or_else(|| anyhow!("--output requires a file path"))?;
                        output = Some(PathBuf::from(path));
                    }
                    "--store" => {
                        let path = args
                            .next()
                            .ok_or_else(|| anyhow!("--store requires a directory"))?;
                        store = Some(PathBuf::from(path));
                    }
                    other => anyhow::bail!("Unknown option '{other}' for synthesize"),
                }
            }

            if output.is_some() && store.is_some() {
                anyhow::bail!("--output and --store cannot be combined");
            }

            Ok((
                config_path,
                Command::Synthesize {
                    text,
                    instruction,
                    output,
                    store,
                },
            ))
        }
        other => {
            anyhow::bail!("Unknown command '{other}'. Supported commands: recognize, synthesize")
        }
    }
}

/// Format tag derived from the file extension, defaulting to wav
fn format_from_path(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "wav".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Must happen before any wss:// connection
    install_crypto_provider();

    let mut args = env::args();
    let _ = args.next();
    let (config_path, command) = parse_args(args)?;

    let config = match &config_path {
        Some(path) => SpeechConfig::from_file(path),
        None => SpeechConfig::from_env(),
    }
    .map_err(|e| anyhow!(e.to_string()))?;
    let client = SpeechClient::new(config);

    match command {
        Command::Recognize { audio, format } => {
            let format = format.unwrap_or_else(|| format_from_path(&audio));
            let bytes = fs::read(&audio)
                .await
                .map_err(|e| anyhow!("Failed to read {}: {}", audio.display(), e))?;

            let text = client.recognize(bytes, &format).await?;
            println!("{text}");
        }
        Command::Synthesize {
            text,
            instruction,
            output,
            store,
        } => {
            if let Some(dir) = store {
                let uploader = DirectoryUploader::new(dir);
                match client
                    .synthesize_to_storage(&text, &instruction, &uploader)
                    .await?
                {
                    Some(url) => println!("{url}"),
                    None => anyhow::bail!("The service returned no audio"),
                }
                return Ok(());
            }

            let audio = client
                .synthesize(&text, &instruction)
                .await?
                .ok_or_else(|| anyhow!("The service returned no audio"))?;
            let output = output.unwrap_or_else(|| PathBuf::from("output.mp3"));
            fs::write(&output, &audio)
                .await
                .map_err(|e| anyhow!("Failed to write to {}: {}", output.display(), e))?;
            println!("Wrote {} bytes to {}", audio.len(), output.display());
        }
    }

    Ok(())
}
