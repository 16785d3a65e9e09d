use {
    clap::Parser,
    drawkit_genimage::{GenerateRequest, GenerationOutcome, ImageGenerator, SiteAttribution},
    drawkit_routing::{OutboundMessage, classify_reply, fallback_image_url, parse_draw_command},
    std::path::PathBuf,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "drawkit", about = "Drawkit — prompt-to-image generation")]
struct Cli {
    /// The prompt, or a full chat command like "/p a red fox".
    #[arg(required = true, trailing_var_arg = true)]
    prompt: Vec<String>,

    /// Output file path (overrides the configured output directory).
    #[arg(short, long, env = "DRAWKIT_OUT")]
    out: Option<PathBuf>,

    /// Model identifier (overrides config value).
    #[arg(long, env = "DRAWKIT_MODEL")]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = drawkit_config::discover_and_load();

    // The prompt may arrive bare or as a full chat command; accept both so
    // the binary can be wired directly behind a chat bot.
    let raw = cli.prompt.join(" ");
    let prompt =
        parse_draw_command(&config.command_prefix, &raw).unwrap_or_else(|| raw.trim().to_string());
    if prompt.is_empty() {
        anyhow::bail!("empty prompt");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "drawkit starting");

    let out_path = cli.out.clone().unwrap_or_else(|| {
        PathBuf::from(&config.storage.output_dir)
            .join(format!("drawer_{}.png", uuid::Uuid::new_v4().simple()))
    });

    let reply = build_reply(&cli, &config, &prompt, &out_path).await?;

    match classify_reply(&reply) {
        OutboundMessage::LocalImage(path) => println!("image generated: {}", path.display()),
        OutboundMessage::RemoteImage(url) => println!("{url}"),
        OutboundMessage::Plain(text) => println!("{text}"),
    }

    Ok(())
}

/// Run one generation attempt and render it as a reply line. Falls back to
/// the secondary image provider when the primary is disabled, has no
/// credential, or yields no image.
async fn build_reply(
    cli: &Cli,
    config: &drawkit_config::DrawkitConfig,
    prompt: &str,
    out_path: &std::path::Path,
) -> anyhow::Result<String> {
    let fallback_reply = || {
        if config.fallback.enabled {
            Some(fallback_image_url(prompt))
        } else {
            None
        }
    };

    if !config.openrouter.enabled {
        return fallback_reply()
            .ok_or_else(|| anyhow::anyhow!("openrouter is disabled and no fallback is enabled"));
    }

    let Some(api_key) = config.openrouter.resolve_api_key() else {
        warn!("no API credential configured");
        return fallback_reply().ok_or_else(|| {
            anyhow::anyhow!(
                "no API credential configured (set OPENROUTER_API_KEY or openrouter.api_key)"
            )
        });
    };

    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| config.openrouter.model.clone());
    let generator = ImageGenerator::new(
        Some(api_key),
        model,
        config.openrouter.base_url.clone(),
        SiteAttribution {
            url: config.openrouter.site_url.clone(),
            title: config.openrouter.site_title.clone(),
        },
    )?
    .with_diagnostics_dir(PathBuf::from(&config.storage.output_dir).join("diagnostics"));

    let outcome = generator
        .generate(GenerateRequest {
            prompt,
            out_path,
            size_hint: None,
        })
        .await?;

    match outcome {
        GenerationOutcome::Saved { path } => Ok(format!("image generated: {}", path.display())),
        GenerationOutcome::Failed {
            diagnostic_excerpt,
            raw_dump_path,
        } => {
            warn!(
                excerpt = %diagnostic_excerpt,
                dump = ?raw_dump_path,
                "generation yielded no image"
            );
            if let Some(url) = fallback_reply() {
                return Ok(url);
            }
            Ok(format!("no image in response: {diagnostic_excerpt}"))
        },
    }
}
