use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::loader::{HttpSource, RecordSource};
use crate::refresh::{self, RefreshOutcome};
use crate::server::{self, ServerOptions};
use crate::store::DEFAULT_DATA_FILE;
use crate::view::{ConsultationView, Surface, ViewEvent};

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RefreshConfig {
    source_url: Option<String>,
    data_file: PathBuf,
    timeout: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ServeConfig {
    listen: SocketAddr,
    data_file: PathBuf,
    static_dir: Option<PathBuf>,
    refresh: Option<RefreshConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ViewConfig {
    backend_url: String,
    filter: Option<String>,
    detail: Option<String>,
    surface: Surface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum RunCommand {
    Serve(ServeConfig),
    Refresh(RefreshConfig),
    View(ViewConfig),
    InitConfig(PathBuf),
}

#[derive(Clone, Debug)]
struct RunConfig {
    verbose: u8,
    no_color: bool,
    command: RunCommand,
}

fn resolve_data_file(arg: Option<String>, cfg: &ConfigFile) -> PathBuf {
    config::expand_tilde(
        arg.or_else(|| cfg.data_file.clone())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
            .as_str(),
    )
}

fn resolve_refresh(
    source: Option<String>,
    timeout: Option<u64>,
    data_file: PathBuf,
    cfg: &ConfigFile,
) -> Result<RefreshConfig, String> {
    let source_url = source.or_else(|| cfg.source_url.clone());
    if let Some(url) = source_url.as_deref() {
        validation::parse_http_url(url)?;
    }
    let timeout = timeout.or(cfg.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout == 0 {
        return Err("invalid timeout, expected a positive number of seconds".to_string());
    }
    Ok(RefreshConfig {
        source_url,
        data_file,
        timeout,
    })
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let command = match args.command {
        Command::Serve(serve) => {
            let listen_raw = serve
                .listen
                .or_else(|| cfg.listen.clone())
                .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
            let listen = validation::parse_listen_addr(&listen_raw)?;
            let data_file = resolve_data_file(serve.data_file, &cfg);
            let static_dir = serve
                .static_dir
                .or_else(|| cfg.static_dir.clone())
                .map(|p| config::expand_tilde(&p));
            let refresh = if serve.no_refresh {
                None
            } else {
                Some(resolve_refresh(
                    serve.source,
                    serve.timeout,
                    data_file.clone(),
                    &cfg,
                )?)
            };
            RunCommand::Serve(ServeConfig {
                listen,
                data_file,
                static_dir,
                refresh,
            })
        }
        Command::Refresh(refresh) => {
            let data_file = resolve_data_file(refresh.data_file, &cfg);
            RunCommand::Refresh(resolve_refresh(
                refresh.source,
                refresh.timeout,
                data_file,
                &cfg,
            )?)
        }
        Command::View(view) => {
            let backend_url = view
                .backend
                .or_else(|| cfg.backend_url.clone())
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
            validation::parse_http_url(&backend_url)?;
            let surface = match view.format.or_else(|| cfg.format.clone()) {
                Some(raw) => validation::parse_format(&raw)?,
                None => Surface::Terminal,
            };
            RunCommand::View(ViewConfig {
                backend_url,
                filter: view.filter,
                detail: view.detail,
                surface,
            })
        }
        Command::InitConfig => {
            let path = match args.config.as_deref() {
                Some(p) => config::expand_tilde(p),
                None => config::default_config_path()
                    .ok_or_else(|| "cannot locate home directory for config".to_string())?,
            };
            RunCommand::InitConfig(path)
        }
    };

    Ok(RunConfig {
        verbose: args.verbose,
        no_color,
        command,
    })
}

fn init_tracing(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("consultlog={level},tower_http={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .try_init();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn refresh_source(refresh: &RefreshConfig) -> Result<RecordSource, String> {
    match refresh.source_url.as_deref() {
        Some(url) => HttpSource::endpoint(url, Some(Duration::from_secs(refresh.timeout)))
            .map(RecordSource::Http)
            .map_err(|e| e.to_string()),
        None => Ok(RecordSource::Inline(refresh::sample_records())),
    }
}

async fn run_refresh(refresh: &RefreshConfig) -> Result<RefreshOutcome, String> {
    let source = refresh_source(refresh)?;
    format_kv_line("Source", &source.describe());
    format_kv_line("Data file", &refresh.data_file.display().to_string());

    let pb = spinner(format!("refreshing from {}", source.describe()));
    let outcome = refresh::refresh_data_file(&source, &refresh.data_file).await;
    pb.finish_and_clear();

    let outcome = outcome.map_err(|e| e.to_string())?;
    match &outcome {
        RefreshOutcome::Updated { count } => {
            println!(
                "{} {} consultations written to {}",
                "::".green().bold(),
                count,
                refresh.data_file.display()
            );
        }
        RefreshOutcome::KeptLocal {
            reason,
            local_exists,
        } => {
            println!("{} refresh failed: {}", "::".yellow().bold(), reason);
            if *local_exists {
                println!("{} using existing data file", "::".yellow().bold());
            } else {
                println!(
                    "{} no data file at {}; /api/consultas will answer 404",
                    "::".red().bold(),
                    refresh.data_file.display()
                );
            }
        }
    }
    Ok(outcome)
}

async fn run_serve(serve: ServeConfig) -> Result<(), String> {
    if let Some(refresh) = serve.refresh.as_ref() {
        // A refresh that cannot write is reported but does not stop the server.
        if let Err(e) = run_refresh(refresh).await {
            println!("{} {}", "::".red().bold(), e);
        }
    }
    format_kv_line("Listen", &format!("http://{}", serve.listen));
    server::serve(ServerOptions {
        listen: serve.listen,
        data_file: serve.data_file,
        static_dir: serve.static_dir,
    })
    .await
    .map_err(|e| e.to_string())
}

async fn run_view(view_cfg: ViewConfig) -> Result<(), String> {
    let source = HttpSource::backend(&view_cfg.backend_url).map_err(|e| e.to_string())?;
    let source = RecordSource::Http(source);
    let mut view = ConsultationView::new(view_cfg.surface);

    let pb = spinner(format!("loading consultations from {}", source.describe()));
    let loaded = view.load(&source).await;
    pb.finish_and_clear();

    if let (Some(filter), Ok(())) = (view_cfg.filter, &loaded) {
        view.handle(ViewEvent::FilterChanged(filter));
    }
    print!("{}", view.table_body());
    if view_cfg.surface == Surface::Terminal && loaded.is_ok() {
        println!(
            "{}",
            format!(
                ":: showing {} of {} consultations",
                view.visible().len(),
                view.records().len()
            )
            .dimmed()
        );
    }

    if let Some(id) = view_cfg.detail {
        view.handle(ViewEvent::DetailRequested(Some(id)));
        println!();
        print!("{}", view.modal_body());
    }

    loaded
}

fn run_init_config(path: PathBuf) -> Result<(), String> {
    if config::ensure_default_config_file(&path)? {
        println!("{} wrote {}", "::".green().bold(), path.display());
    } else {
        println!("{} {} already exists", "::".yellow().bold(), path.display());
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    match run.command {
        RunCommand::Serve(serve) => run_serve(serve).await,
        RunCommand::Refresh(refresh) => match run_refresh(&refresh).await? {
            RefreshOutcome::Updated { .. } => Ok(()),
            RefreshOutcome::KeptLocal { reason, .. } => Err(reason),
        },
        RunCommand::View(view) => run_view(view).await,
        RunCommand::InitConfig(path) => run_init_config(path),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = match args.config.as_deref() {
        Some(path) if !matches!(args.command, Command::InitConfig) => {
            config::load_config(&config::expand_tilde(path), false)?
        }
        Some(_) => ConfigFile::default(),
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    if run.no_color {
        colored::control::set_override(false);
    }
    // The server is quiet otherwise; it always logs at info or above.
    let verbose = match run.command {
        RunCommand::Serve(_) => run.verbose.max(1),
        _ => run.verbose,
    };
    init_tracing(verbose, run.no_color);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
