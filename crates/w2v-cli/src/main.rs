use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use opentelemetry_otlp::WithExportConfig;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use w2v_client::{HttpVectorClient, VectorService, Words};
use w2v_common::config::{Flags, Method, Phases, W2vConfig};
use w2v_mock::{MockConfig, MockService, Reply};

#[derive(Parser, Debug)]
#[command(name = "w2v", version, about = "Word-vector service latency benchmark")]
struct Cli {
    /// Defaults to `bench` with the configured settings.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Time many single-word requests against one batched request
    Bench(BenchArgs),
    /// Send one request and print the reply
    Convert(ConvertArgs),
    /// Run a local stand-in for the word-vector service
    ServeMock(ServeMockArgs),
    Version,
}

#[derive(Args, Debug, Default)]
struct BenchArgs {
    #[arg(short, long)]
    url: Option<String>,
    /// Requests in the multi-request phase
    #[arg(short = 'n', long)]
    loops: Option<usize>,
    /// Words in the single-request batch
    #[arg(short, long)]
    entries: Option<usize>,
    #[arg(short, long)]
    word: Option<String>,
    /// multi, single or both
    #[arg(short, long)]
    phase: Option<Phases>,
    #[command(flatten)]
    http: HttpArgs,
}

#[derive(Args, Debug, Default)]
struct HttpArgs {
    /// get or post
    #[arg(short, long)]
    method: Option<Method>,
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[arg(required = true)]
    words: Vec<String>,
    #[arg(short, long)]
    url: Option<String>,
    #[command(flatten)]
    http: HttpArgs,
}

#[derive(Args, Debug)]
struct ServeMockArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(short, long, default_value_t = 3030)]
    port: u16,
    /// Vector dimension in replies
    #[arg(short, long, default_value_t = w2v_mock::DEFAULT_DIM)]
    dim: usize,
    /// Request body limit in bytes; the real service allows 16 KiB
    #[arg(long, default_value_t = 1024 * 1024)]
    body_limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or_else(|| Commands::Bench(BenchArgs::default())) {
        Commands::Bench(args) => bench(args).await,
        Commands::Convert(args) => convert(args).await,
        Commands::ServeMock(args) => serve_mock(args).await,
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

impl BenchArgs {
    fn flags(self) -> Flags {
        Flags {
            endpoint: self.url,
            method: self.http.method,
            timeout_ms: self.http.timeout_ms,
            word: self.word,
            loops: self.loops,
            entries: self.entries,
            phases: self.phase,
        }
    }
}

impl ConvertArgs {
    fn flags(&self) -> Flags {
        Flags {
            endpoint: self.url.clone(),
            method: self.http.method,
            timeout_ms: self.http.timeout_ms,
            ..Flags::default()
        }
    }
}

fn load_config(flags: &Flags) -> anyhow::Result<W2vConfig> {
    let mut cfg = W2vConfig::load().context("loading configuration")?;
    cfg.apply_flags(flags);
    cfg.validate()?;
    Ok(cfg)
}

async fn bench(args: BenchArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.flags())?;

    w2v_obs::init();
    let client = HttpVectorClient::new(cfg.client.clone())?;
    tracing::info!(
        target: "cli",
        endpoint = %cfg.client.endpoint,
        method = %cfg.client.method,
        loops = cfg.bench.loops,
        entries = cfg.bench.entries,
        "starting benchmark"
    );

    let summary = w2v_bench::run(&client, &cfg.bench)
        .await
        .with_context(|| format!("benchmark against {} failed", cfg.client.endpoint))?;
    print!("{}", summary);
    Ok(())
}

async fn convert(args: ConvertArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.flags())?;
    let words = match <[String; 1]>::try_from(args.words) {
        Ok([word]) => Words::from(word),
        Err(words) => Words::try_from(words)?,
    };
    let client = HttpVectorClient::new(cfg.client)?;
    let value = client.get_vector(&words).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn serve_mock(args: ServeMockArgs) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let service = MockService::new(MockConfig { reply: Reply::Vectors { dim: args.dim }, body_limit: args.body_limit });
    w2v_mock::serve_until(addr, service, wait_for_shutdown(tokio::signal::ctrl_c())).await?;
    Ok(())
}

/// Resolves when `signal` fires, or right away if it cannot be installed.
async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!(target: "cli", "shutdown signal received"),
        Err(e) => tracing::warn!(target: "cli", error = %e, "cannot listen for ctrl-c, shutting down"),
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );

    if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
            .install_simple()
            .ok();
        if let Some(tracer) = tracer {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(OpenTelemetryLayer::new(tracer))
                .init();
            return;
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
