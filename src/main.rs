use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use consent_banner::banner::BannerConfig;
use consent_banner::codegen::TextEscaping;
use consent_banner::config::GeneratorSettings;
use consent_banner::server::run_http_server;
use consent_banner::studio::{GeneratorSession, OutputTab};

const LOG_FILE_PREFIX: &str = "consent_banner.log";

#[derive(Debug, Parser)]
#[command(name = "consent_banner", about = "Cookie consent banner code generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate banner code and print it (or write it to --output).
    Generate {
        /// Banner config (.json, .yaml, .yml, or `-` for JSON on stdin).
        /// Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Artifact to emit: complete, html, js or css.
        #[arg(long, default_value = "complete")]
        tab: OutputTab,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Interpolate banner text without HTML escaping.
        #[arg(long)]
        verbatim_text: bool,
    },
    /// Write every artifact into a directory.
    Bundle {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long)]
        verbatim_text: bool,
    },
    /// Print the default banner config.
    Defaults {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
        format: ConfigFormat,
    },
    /// Serve the generator over HTTP.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = GeneratorSettings::from_env().context("failed to load configuration")?;
    let _file_log_guard = init_tracing(&settings)?;

    match cli.command {
        Commands::Generate {
            config,
            tab,
            output,
            verbatim_text,
        } => {
            apply_verbatim_flag(&mut settings, verbatim_text);
            let mut session = load_session(config.as_deref(), &settings)?;
            session.select_tab(tab);
            session.generate().await;
            write_generated(&session, output.as_deref())?;
        }
        Commands::Bundle {
            config,
            out_dir,
            verbatim_text,
        } => {
            apply_verbatim_flag(&mut settings, verbatim_text);
            let mut session = load_session(config.as_deref(), &settings)?;
            session.generate().await;
            fs::create_dir_all(&out_dir).with_context(|| {
                format!("failed to create output directory `{}`", out_dir.display())
            })?;
            for tab in OutputTab::ALL {
                let notification = session.download_tab(&out_dir, tab);
                if notification.is_error() {
                    bail!(notification.message);
                }
                eprintln!("{}", notification.message);
            }
        }
        Commands::Defaults { format } => {
            let config = BannerConfig::default();
            let rendered = match format {
                ConfigFormat::Json => serde_json::to_string_pretty(&config)
                    .context("failed to serialize default config as JSON")?,
                ConfigFormat::Yaml => serde_yaml::to_string(&config)
                    .context("failed to serialize default config as YAML")?,
            };
            println!("{}", rendered.trim_end());
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.http_bind.clone());
            run_http_server(&settings, &bind).await?;
        }
    }

    Ok(())
}

fn apply_verbatim_flag(settings: &mut GeneratorSettings, verbatim_text: bool) {
    if verbatim_text {
        settings.text_escaping = TextEscaping::Verbatim;
    }
}

fn load_session(path: Option<&Path>, settings: &GeneratorSettings) -> Result<GeneratorSession> {
    let config = match path {
        None => BannerConfig::default(),
        Some(path) if path.as_os_str() == "-" => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read banner config from stdin")?;
            BannerConfig::from_json_str(&raw)?
        }
        Some(path) => BannerConfig::load(path)?,
    };
    info!(
        position = %config.position,
        text_escaping = %settings.text_escaping,
        "loaded banner config"
    );

    // No one is watching a spinner on the command line.
    Ok(GeneratorSession::from_settings(config, settings).with_generate_delay(Duration::ZERO))
}

fn write_generated(session: &GeneratorSession, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, session.displayed())
            .with_context(|| format!("failed to write `{}`", path.display())),
        None => {
            let notification = session.copy_to(&mut io::stdout().lock());
            if notification.is_error() {
                bail!(notification.message);
            }
            println!();
            Ok(())
        }
    }
}

fn init_tracing(settings: &GeneratorSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,consent_banner=debug"));
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    let (file_layer, guard) = match &settings.file_log_filter {
        Some(filter) => {
            let file_filter = EnvFilter::try_new(filter)
                .with_context(|| format!("invalid BANNER_FILE_LOG filter `{filter}`"))?;
            let appender = tracing_appender::rolling::daily(&settings.log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(guard)
}
