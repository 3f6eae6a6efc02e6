use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use wolfram_ca_common::config::RenderConfig;
use wolfram_ca_common::display::{suggested_filename, GridEncoder, PngEncoder};
use wolfram_ca_common::init::{Pattern, Seed, StartType};
use wolfram_ca_common::page::{image_url, render_page};
use wolfram_ca_common::query::QueryParams;
use wolfram_ca_common::response::respond;
use wolfram_ca_common::state::RenderParams;
use wolfram_ca_common::Rule;

#[derive(Parser, Debug)]
#[command(name = "wolfram-ca", version, about = "Render elementary cellular automata")]
struct Cli {
    /// JSON file with limits, defaults, palette and endpoint.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more to stderr (repeat for trace output).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable logging.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the automaton as a PNG.
    Image(ImageArgs),
    /// Render an HTML page showing the automaton.
    Page(PageArgs),
    /// Print what a rule maps each neighborhood to.
    Describe(DescribeArgs),
    /// Answer the request in `QUERY_STRING` as a CGI script.
    Cgi,
}

#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Wolfram rule number (0-255).
    #[arg(long, allow_hyphen_values = true)]
    rule: Option<i64>,

    /// Number of cells per row.
    #[arg(long)]
    cells: Option<usize>,

    /// Number of generations after the initial row.
    #[arg(long)]
    steps: Option<usize>,

    /// Initial cells as 0s and 1s, repeated across the row.
    #[arg(long, value_parser = parse_pattern)]
    initial: Option<Pattern>,

    /// Seed for random initial cells; 0 picks a fresh one.
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i64>,

    /// How the initial row is built.
    #[arg(long, value_parser = parse_start_type)]
    start: Option<StartType>,
}

impl ParamArgs {
    fn resolve(&self, config: &RenderConfig) -> RenderParams {
        let defaults = &config.defaults;
        let requested = RenderParams {
            rule: self.rule.unwrap_or(defaults.rule),
            cells: self.cells.unwrap_or(defaults.cells),
            steps: self.steps.unwrap_or(defaults.steps),
            initial: self.initial.clone().or_else(|| defaults.initial.clone()),
            seed: self.seed.map_or(defaults.seed, Seed::new),
            start: self.start.unwrap_or(defaults.start),
        };
        let params = requested.clone().clamp(&config.limits);
        if params != requested {
            tracing::warn!(
                cells = params.cells,
                steps = params.steps,
                "size clamped to configured limits"
            );
        }
        params
    }
}

#[derive(Parser, Debug)]
struct ImageArgs {
    #[command(flatten)]
    params: ParamArgs,

    /// Output PNG path, `-` for stdout. Defaults to `rule<N>.png`.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PageArgs {
    #[command(flatten)]
    params: ParamArgs,

    /// Output HTML path. Defaults to `rule<N>.html`.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Point the image at this URL instead of writing the PNG next to the page.
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Parser, Debug)]
struct DescribeArgs {
    /// Wolfram rule number (0-255).
    #[arg(allow_hyphen_values = true)]
    rule: i64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => RenderConfig::default(),
    };

    match cli.cmd {
        Command::Image(args) => cmd_image(args, &config),
        Command::Page(args) => cmd_page(args, &config),
        Command::Describe(args) => cmd_describe(args),
        Command::Cgi => cmd_cgi(&config),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::INFO,
        (false, 1) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn cmd_image(args: ImageArgs, config: &RenderConfig) -> anyhow::Result<()> {
    let params = args.params.resolve(config);
    let rule = params.rule()?;
    let grid = params.render()?;
    let encoder = PngEncoder::new(config.palette);

    match args.out {
        Some(path) if path == Path::new("-") => {
            let mut out = io::stdout().lock();
            encoder.encode(&grid, &mut out)?;
            out.flush().context("write png to stdout")?;
        }
        out => {
            let path = out.unwrap_or_else(|| PathBuf::from(suggested_filename(rule, &encoder)));
            write_file(&path, &encoder.encode_to_vec(&grid)?)?;
        }
    }
    Ok(())
}

fn cmd_page(args: PageArgs, config: &RenderConfig) -> anyhow::Result<()> {
    let params = args.params.resolve(config);
    let rule = params.rule()?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("rule{rule}.html")));

    let endpoint = args
        .endpoint
        .or_else(|| (!config.endpoint.is_empty()).then(|| config.endpoint.clone()));
    let image_src = match endpoint {
        Some(endpoint) => image_url(&endpoint, &params),
        None => {
            let encoder = PngEncoder::new(config.palette);
            let name = suggested_filename(rule, &encoder);
            write_file(&out.with_file_name(&name), &encoder.encode_to_vec(&params.render()?)?)?;
            name
        }
    };

    write_file(&out, render_page(&params, &image_src)?.as_bytes())
}

fn cmd_describe(args: DescribeArgs) -> anyhow::Result<()> {
    let rule = Rule::try_from(args.rule)?;
    println!("{}", rule.describe());
    Ok(())
}

fn cmd_cgi(config: &RenderConfig) -> anyhow::Result<()> {
    let query = std::env::var("QUERY_STRING").unwrap_or_default();
    tracing::debug!(%query, "cgi request");
    let response = respond(&QueryParams::parse(&query), config);
    response
        .write_cgi(&mut io::stdout().lock())
        .context("write cgi response")
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote");
    Ok(())
}

fn parse_pattern(s: &str) -> Result<Pattern, String> {
    Pattern::parse(s).map_err(|err| err.to_string())
}

fn parse_start_type(s: &str) -> Result<StartType, String> {
    s.parse().map_err(|err: wolfram_ca_common::Error| err.to_string())
}
