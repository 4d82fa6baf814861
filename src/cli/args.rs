use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "consultlog",
    version,
    about = "dental-clinic consultation log",
    long_about = "consultlog serves a clinic's consultation records, renders the consultation history page, and browses records from the terminal.\n\nExamples:\n  consultlog serve --listen 127.0.0.1:5000\n  consultlog refresh --source https://api.clinic.tld/consultations\n  consultlog view --backend http://127.0.0.1:5000 --filter pending\n  consultlog view --detail C004 --format html\n\nTip: Use --config to persist settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.consultlog/config.yml)."
    )]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Refresh the data file, then serve the record API and pages.
    Serve(ServeArgs),
    /// Fetch consultations from the refresh source into the data file.
    Refresh(RefreshArgs),
    /// Load consultations from a backend and print the table or a detail view.
    View(ViewArgs),
    /// Write a default config file if none exists.
    InitConfig,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[arg(
        short = 'l',
        long = "listen",
        visible_alias = "bind",
        value_name = "ADDR",
        help_heading = "Server",
        help = "Socket address to listen on (e.g. 127.0.0.1:5000)."
    )]
    pub listen: Option<String>,

    #[arg(
        short = 'd',
        long = "data-file",
        value_name = "FILE",
        help_heading = "Data",
        help = "JSON data file served at /api/consultas."
    )]
    pub data_file: Option<String>,

    #[arg(
        short = 's',
        long = "static-dir",
        value_name = "DIR",
        help_heading = "Server",
        help = "Directory served for paths no route matches."
    )]
    pub static_dir: Option<String>,

    #[arg(
        long = "source",
        visible_alias = "upstream",
        value_name = "URL",
        help_heading = "Refresh",
        help = "Upstream URL returning the consultation list (defaults to the built-in dataset)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Refresh",
        help = "Upstream request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "no-refresh",
        help_heading = "Refresh",
        help = "Serve the existing data file without refreshing it first."
    )]
    pub no_refresh: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RefreshArgs {
    #[arg(
        long = "source",
        visible_alias = "upstream",
        value_name = "URL",
        help_heading = "Refresh",
        help = "Upstream URL returning the consultation list (defaults to the built-in dataset)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'd',
        long = "data-file",
        value_name = "FILE",
        help_heading = "Data",
        help = "JSON data file to write."
    )]
    pub data_file: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Refresh",
        help = "Upstream request timeout in seconds."
    )]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    #[arg(
        short = 'b',
        long = "backend",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Backend base URL; records are read from <URL>/api/consultas."
    )]
    pub backend: Option<String>,

    #[arg(
        short = 'f',
        long = "filter",
        value_name = "TEXT",
        help_heading = "View",
        help = "Case-insensitive filter over patient, ID, reason, status and date."
    )]
    pub filter: Option<String>,

    #[arg(
        short = 'D',
        long = "detail",
        value_name = "ID",
        help_heading = "View",
        help = "Show the detail view for this consultation ID."
    )]
    pub detail: Option<String>,

    #[arg(
        short = 'F',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (terminal or html)."
    )]
    pub format: Option<String>,
}
