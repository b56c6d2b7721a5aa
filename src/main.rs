use clap::{Parser, Subcommand};
use precompress_mk::config::{self, GeneratorConfig};
use precompress_mk::discovery::DiscoveryKind;
use precompress_mk::filter::{ExtensionSet, build_filter};
use precompress_mk::output::{self, OutputWriter};
use precompress_mk::rules;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Release builds report the crate version, others `dev@<commit>`.
fn version_string() -> &'static str {
    match (env!("ON_RELEASE_TAG"), env!("GIT_HASH")) {
        ("true", _) => env!("CARGO_PKG_VERSION"),
        (_, "") => "dev@unknown",
        // Built once for clap, which needs a 'static str.
        (_, hash) => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "precompress-mk")]
#[command(about = "Generate a Makefile that pre-compresses static assets")]
#[command(long_about = "\
Generate a Makefile that pre-compresses static assets

Every file whose name ends in a configured extension gets two rules:

  <file>.gz: <file>
  \tzopfli --i127 <file>

  <file>.br: <file>
  \tbrotli --quality 15 --input <file> --output <file>.br

plus an `all` target depending on every .gz and .br. Pipe the output
into make and let it schedule the work:

  precompress-mk | make -f - -j\"$(nproc)\"

make only rebuilds artifacts older than their source.

Run 'precompress-mk gen-config' to print a documented precompress.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory tree to scan
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/precompress.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extension to compress, without the dot; repeat to list several.
    /// Replaces the configured list.
    #[arg(long = "ext", value_name = "EXT", global = true)]
    extensions: Vec<String>,

    /// How to enumerate files
    #[arg(long, value_enum, global = true)]
    discovery: Option<DiscoveryKind>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the Makefile to stdout (default)
    Generate,
    /// Print the files that would be compressed
    List {
        /// Print a JSON array instead of one path per line
        #[arg(long)]
        json: bool,
    },
    /// Print a stock precompress.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    configure_logging(cli.verbose, cli.quiet);

    match cli.command.as_ref().unwrap_or(&Command::Generate) {
        Command::Generate => {
            let config = resolve_config(&cli)?;
            let extensions = config.extension_set()?;
            let filter = build_filter(&extensions);
            debug!(%filter, discovery = ?config.discovery, "generating rules");

            let discovery = config.discovery.backend();
            let mut out = OutputWriter::new(std::io::stdout().lock());
            match rules::generate(
                discovery.as_ref(),
                &cli.root,
                &filter,
                &config.compressors(),
                &mut out,
            ) {
                Ok(_) => {}
                // The reader went away (`| head`); what was written is whole.
                Err(e) if e.is_broken_pipe() => {}
                Err(e) => return Err(e.into()),
            }
        }
        Command::List { json } => {
            let config = resolve_config(&cli)?;
            let filter = build_filter(&config.extension_set()?);
            let discovery = config.discovery.backend();
            let sources = rules::collect_sources(discovery.as_ref(), &cli.root, &filter)?;
            match output::print_list(&sources, *json) {
                Ok(()) => {}
                Err(e) if output::is_broken_pipe(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = config::load_config(&cli.root, cli.config.as_deref())?;
    if !cli.extensions.is_empty() {
        // Validate the flag values with the same rules as the file.
        ExtensionSet::new(&cli.extensions)?;
        config.extensions = cli.extensions.clone();
    }
    if let Some(kind) = cli.discovery {
        config.discovery = kind;
    }
    ensure_root(&cli.root)?;
    Ok(config)
}

fn ensure_root(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !root.is_dir() {
        return Err(format!("root is not a directory: {}", root.display()).into());
    }
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
fn configure_logging(verbose: bool, quiet: bool) {
    use tracing::Level;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

    let log_level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
