//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, eyre};
use docsnap_core::{ParseRequest, ParseResult, ProgressReporter, run_pipeline};
use docsnap_fetcher::DocsClient;
use docsnap_shared::{
    AppConfig, DocsnapError, init_config, load_config, resolve_session_token,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docsnap: snapshot hosted documents as standalone HTML.
#[derive(Parser)]
#[command(
    name = "docsnap",
    version,
    about = "Snapshot hosted rich documents as standalone HTML with local images.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse a document and save JSON snapshots, HTML, and images to disk.
    Parse {
        /// Document URL (containing /i/nodes/<id>) or bare document id.
        url_or_id: String,

        /// Session cookie (overrides the env var named in config).
        #[arg(long)]
        cookie: Option<String>,

        /// Base output directory (defaults to `defaults.output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render a document to HTML on stdout without saving anything.
    Html {
        /// Document URL (containing /i/nodes/<id>) or bare document id.
        url_or_id: String,

        /// Session cookie (overrides the env var named in config).
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docsnap=info",
        1 => "docsnap=debug",
        _ => "docsnap=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse {
            url_or_id,
            cookie,
            out,
        } => cmd_parse(&url_or_id, cookie.as_deref(), out).await,
        Command::Html { url_or_id, cookie } => cmd_html(&url_or_id, cookie.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Prefix library errors with their stable code.
fn coded(err: DocsnapError) -> Report {
    eyre!("[{}] {err}", err.code())
}

const UNDECODABLE: &str = "content could not be decoded (possibly encrypted, unsupported)";

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_parse(url_or_id: &str, cookie: Option<&str>, out: Option<PathBuf>) -> Result<()> {
    let config = load_config().map_err(coded)?;
    let token = resolve_session_token(cookie, &config).map_err(coded)?;

    let output_root = match out {
        Some(dir) => dir,
        None => config.defaults.resolved_output_dir().map_err(coded)?,
    };

    let client = DocsClient::new(&config.service).map_err(coded)?;
    let request = ParseRequest {
        url_or_id: url_or_id.to_string(),
        token,
        output_root: Some(output_root),
    };

    info!(input = url_or_id, "parsing document");

    let reporter = CliProgress::new();
    let result = run_pipeline(&client, &request, &reporter)
        .await
        .map_err(coded)?;

    print_summary(&result);
    Ok(())
}

async fn cmd_html(url_or_id: &str, cookie: Option<&str>) -> Result<()> {
    let config = load_config().map_err(coded)?;
    let token = resolve_session_token(cookie, &config).map_err(coded)?;

    let client = DocsClient::new(&config.service).map_err(coded)?;
    let request = ParseRequest {
        url_or_id: url_or_id.to_string(),
        token,
        output_root: None,
    };

    let reporter = CliProgress::new();
    let result = run_pipeline(&client, &request, &reporter)
        .await
        .map_err(coded)?;

    match &result.html {
        Some(html) => print!("{html}"),
        None if result.content.is_none() => eprintln!("{UNDECODABLE}"),
        None => eprintln!("document has no main part, nothing rendered"),
    }

    Ok(())
}

fn print_summary(result: &ParseResult) {
    let meta = result.file_meta();

    println!();
    println!("  Document parsed.");
    println!("  ID:     {}", result.document_id);
    println!("  Title:  {}", result.title);
    if let Some(name) = &meta.name {
        println!("  File:   {name}");
    }
    if let Some(kind) = &meta.kind {
        println!("  Type:   {kind}");
    }

    if result.content.is_none() {
        println!("  Note:   {UNDECODABLE}");
    } else {
        println!("  Parts:  {}", result.part_count());
    }

    if let Some(assets) = &result.assets {
        println!("  Images: {}/{}", assets.len(), result.image_count);
    }

    if let Some(dir) = &result.output_dir {
        println!("  Path:   {}", dir.display());
    }
    for file in &result.files {
        println!("          - {}", file.display());
    }
    println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn assets_resolved(&self, resolved: usize, total: usize) {
        self.spinner
            .set_message(format!("Downloaded [{resolved}/{total}] images"));
    }

    fn done(&self, _result: &ParseResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config().map_err(coded)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config().map_err(coded)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_accepts_cookie_and_out() {
        let cli = Cli::try_parse_from([
            "docsnap", "-vv", "parse", "https://alidocs.dingtalk.com/i/nodes/abc",
            "--cookie", "k=v", "--out", "/tmp/docs",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Parse { url_or_id, cookie, out } => {
                assert_eq!(url_or_id, "https://alidocs.dingtalk.com/i/nodes/abc");
                assert_eq!(cookie.as_deref(), Some("k=v"));
                assert_eq!(out, Some(PathBuf::from("/tmp/docs")));
            }
            _ => panic!("expected parse"),
        }
    }

    #[test]
    fn html_takes_global_log_format() {
        let cli = Cli::try_parse_from(["docsnap", "html", "abc", "--log-format", "json"]).unwrap();
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Html { .. }));
    }

    #[test]
    fn errors_carry_their_code() {
        let report = coded(DocsnapError::config("no session token"));
        assert!(report.to_string().starts_with("[config_error]"));
    }
}
