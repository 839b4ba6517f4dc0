use anyhow::{Context, Result};
use clap::Parser;
use gemini_cli_client::mime::detect_image_mime;
use gemini_cli_client::{ChatContentPart, ChatMessage, ChatRole, ClientConfig, GeminiClient};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-cli-client")]
#[command(about = "Send a chat prompt to the Gemini CLI and print the answer")]
struct CliArgs {
    /// User message to send.
    #[arg(value_name = "PROMPT", default_value = "Hello World!")]
    prompt: String,

    /// Model passed to `gemini -m` (defaults to GEMINI_MODEL or gemini-2.5-pro).
    #[arg(short, long)]
    model: Option<String>,

    /// Gemini CLI executable (defaults to GEMINI_CMD or `gemini`).
    #[arg(long = "cmd", value_name = "PATH")]
    command: Option<String>,

    /// Timeout in seconds (defaults to GEMINI_TIMEOUT_SECS or 60).
    #[arg(long, value_name = "SECS", value_parser = parse_timeout_arg)]
    timeout: Option<Duration>,

    /// Directory for inline image files (defaults to GEMINI_TMP_DIR or .gemini_tmp).
    #[arg(long, value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// Optional system message sent before the prompt.
    #[arg(long)]
    system: Option<String>,

    /// Image to attach: a local file (embedded as base64) or a URL.
    #[arg(long = "image", value_name = "PATH_OR_URL")]
    images: Vec<String>,

    /// JSON file with an array of chat messages; replaces PROMPT, --system and --image.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["system", "images"])]
    messages: Option<PathBuf>,
}

fn parse_timeout_arg(input: &str) -> std::result::Result<Duration, String> {
    input
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| format!("Invalid timeout '{}'. Expected seconds, e.g. 30 or 2.5", input))
}

fn image_part(source: &str) -> Result<ChatContentPart> {
    let path = Path::new(source);
    if !path.is_file() {
        return Ok(ChatContentPart::image_url(source));
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ChatContentPart::data_uri(detect_image_mime(&bytes), &bytes))
}

fn build_messages(args: &CliArgs) -> Result<Vec<ChatMessage>> {
    if let Some(file) = &args.messages {
        let raw = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read messages file {}", file.display()))?;
        let messages: Vec<ChatMessage> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid messages file {}", file.display()))?;
        return Ok(messages);
    }

    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(ChatMessage::system(system.as_str()));
    }

    if args.images.is_empty() {
        messages.push(ChatMessage::user(args.prompt.as_str()));
    } else {
        let mut parts = vec![ChatContentPart::text(args.prompt.as_str())];
        for image in &args.images {
            parts.push(image_part(image)?);
        }
        messages.push(ChatMessage::with_parts(ChatRole::User, parts));
    }

    Ok(messages)
}

fn apply_overrides(mut config: ClientConfig, args: &CliArgs) -> ClientConfig {
    if let Some(command) = &args.command {
        config.command = command.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Some(tmp_dir) = &args.tmp_dir {
        config.temp_dir = tmp_dir.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    config
}

async fn run(args: CliArgs) -> Result<String> {
    let config = apply_overrides(ClientConfig::from_env()?, &args);
    let messages = build_messages(&args)?;

    info!(
        "Sending {} message(s) to {} (model: {})",
        messages.len(),
        config.command,
        config.model
    );

    let client = GeminiClient::from_config(&config);
    Ok(client.generate(&messages, &config.model).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_cli_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
