use clap::Parser as ClapParser;
use jw_parser::config::ParserConfig;
use jw_parser::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

/// Extracts weekly meeting schedules from Meeting Workbook (mwb) and
/// Watchtower Study edition (w) publication files.
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more .jwpub / .epub files to parse. Independent calls, so
    /// more than one input is fanned out across threads.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write one `<stem>.json` result file per input. If
    /// omitted, results are printed to stdout instead.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable enhanced (language-aware) date/duration/type extraction.
    #[arg(long)]
    no_enhanced_parsing: bool,

    #[arg(long, default_value_t = 200_000_000)]
    max_total_bytes: u64,

    #[arg(long, default_value_t = 10_000)]
    max_entries: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir)?;
    }

    let config = ParserConfig {
        strict: false,
        enable_enhanced_parsing: !args.no_enhanced_parsing,
        max_total_bytes: args.max_total_bytes,
        max_entries: args.max_entries,
    };
    let parser = Parser::new(config)?;

    let results: Vec<bool> = args
        .inputs
        .par_iter()
        .map(|input| process_one(&parser, input, args.output.as_deref()))
        .collect();

    if results.iter().any(|ok| !ok) {
        std::process::exit(1);
    }
    Ok(())
}

fn process_one(parser: &Parser, input: &std::path::Path, output_dir: Option<&std::path::Path>) -> bool {
    let filename = match input.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_string(),
        None => {
            log::error!("{}: not a valid filename", input.display());
            return false;
        }
    };

    let bytes = match fs::read(input) {
        Ok(b) => b,
        Err(e) => {
            log::error!("{}: {e}", input.display());
            return false;
        }
    };

    let start = std::time::Instant::now();
    match parser.parse(&filename, &bytes) {
        Ok(issue) => {
            let json = match serde_json::to_string_pretty(&issue) {
                Ok(j) => j,
                Err(e) => {
                    log::error!("{}: failed to serialize result: {e}", input.display());
                    return false;
                }
            };

            match output_dir {
                Some(dir) => {
                    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                    let json_path = dir.join(format!("{stem}.json"));
                    if let Err(e) = fs::write(&json_path, json) {
                        log::error!("{}: {e}", json_path.display());
                        return false;
                    }
                    log::info!(
                        "{}: parsed in {:.2?}, wrote {}",
                        input.display(),
                        start.elapsed(),
                        json_path.display()
                    );
                }
                None => println!("{json}"),
            }
            true
        }
        Err(e) => {
            log::error!("{}: {e}", input.display());
            false
        }
    }
}
