use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use huffman_archiver::{ArchiveStats, Archiver, Properties, StatsFormat, VERSION};

#[derive(Parser, Debug)]
#[command(name = "huffman-archiver", version, about = "A Huffman compression tool for files and folders")]
struct Args {
    /// A .properties file with archiver settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Overwrite an existing archive
    #[arg(short, long, global = true, default_value_t = false)]
    force: bool,
    /// Print the statistics as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress files or folders into one archive
    Compress {
        /// Files and folders to archive
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// The archive to write, by default the first source plus the extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract an archive
    #[command(alias = "x")]
    Extract {
        /// The archive to read
        source: PathBuf,
        /// The folder to extract into, by default the archive name without its extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn print_stats(stats: &ArchiveStats, format: StatsFormat) -> huffman_archiver::Result<()> {
    match format {
        StatsFormat::Text => println!("{}", stats),
        StatsFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(stats).map_err(|e| huffman_archiver::Error::Config(e.to_string()))?
        ),
    }

    Ok(())
}

fn run(args: Args) -> huffman_archiver::Result<()> {
    let mut props = match &args.config {
        Some(path) => Properties::load(path)?,
        None => Properties::default(),
    };
    props.overwrite |= args.force;
    if args.json {
        props.stats_format = StatsFormat::Json;
    }

    let format = props.stats_format;
    let mut archiver = Archiver::new(props);
    let mut progress = |path: &str, index: usize, total: usize| log::info!("[{}/{}] {}", index, total, path);

    let stats = match &args.command {
        Command::Compress { sources, output } => {
            archiver.compress_to_file(sources.as_slice(), output.as_deref(), Some(&mut progress))?
        }
        Command::Extract { source, output } => {
            archiver.extract_file(source, output.as_deref(), Some(&mut progress))?
        }
    };

    print_stats(stats, format)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("huffman-archiver {}", VERSION);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
