use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "edutrain",
    version,
    about = "training catalog viewer",
    long_about = "edutrain fetches a training category from the catalog backend, groups its trainings by month and prints the schedule. A single training can be opened in the content view, and the schedule can be exported as PDF, HTML or JSON.\n\nExamples:\n  edutrain -k sd\n  edutrain -k sd --all\n  edutrain -k smp --show 3.1\n  edutrain -k sma --export\n  edutrain -k tk -o jadwal.html --data-file ./catalog.json\n\nTip: Use --init-config once and put base_url/api_key in ~/.edutrain/config.yml."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'k',
        long = "cat",
        visible_alias = "category",
        value_name = "ID",
        help_heading = "Input",
        help = "Category to open (e.g. tk, sd, smp, sma)."
    )]
    pub category: Option<String>,

    #[arg(
        short = 'D',
        long = "df",
        visible_alias = "data-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read categories and trainings from a local JSON file instead of the backend."
    )]
    pub data_file: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.edutrain/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'b',
        long = "bu",
        visible_alias = "base-url",
        value_name = "URL",
        help_heading = "Backend",
        help = "Base URL of the catalog backend."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'K',
        long = "key",
        visible_alias = "api-key",
        value_name = "KEY",
        help_heading = "Backend",
        help = "Project API key sent with every request."
    )]
    pub api_key: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Backend",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "Backend",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'e',
        long = "exp",
        visible_alias = "expand",
        value_name = "MONTH",
        action = ArgAction::Append,
        help_heading = "View",
        help = "Expand a month section (1-12, repeatable)."
    )]
    pub expand: Vec<usize>,

    #[arg(
        short = 'a',
        long = "all",
        visible_alias = "expand-all",
        help_heading = "View",
        help = "Expand every month section."
    )]
    pub expand_all: bool,

    #[arg(
        short = 's',
        long = "shw",
        visible_alias = "show",
        value_name = "MONTH.N",
        help_heading = "View",
        help = "Open the content view for the N-th training of a month (both 1-based, e.g. 3.1)."
    )]
    pub show: Option<String>,

    #[arg(
        short = 'x',
        long = "ex",
        visible_alias = "export",
        help_heading = "Export",
        help = "Export the schedule to '<title>.pdf' in the current directory."
    )]
    pub export: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Export",
        help = "Export the schedule to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Export",
        help = "Export format (pdf, html, json). Inferred from the file extension when omitted."
    )]
    pub output_format: Option<String>,
}
