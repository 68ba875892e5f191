use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ext2scope::filesystem::Filesystem;
use ext2scope::filetypes::DEFAULT_MAX_DEPTH;
use ext2scope::identifier::{parse_identifier, Radix};
use ext2scope::inspect::{inspect, Options};
use ext2scope::Error;

/// Reconstruct the directory tree of an ext2 image and find the live file
/// whose data block starts with the given identifier bytes
#[derive(Parser, Debug)]
#[command(name = "ext2scope", version, about)]
struct Cli {
    /// ext2 image file, opened read-only
    image: PathBuf,

    /// Identifier bytes, one token per byte (hex unless --decimal)
    #[arg(required = true, num_args = 1..)]
    bytes: Vec<String>,

    /// Deepest directory nesting to descend into
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Read identifier tokens as decimal octets
    #[arg(long)]
    decimal: bool,
}

fn run(cli: &Cli) -> Result<(), Error> {
    let radix = if cli.decimal {
        Radix::Decimal
    } else {
        Radix::Hex
    };
    let identifier = parse_identifier(cli.bytes.as_slice(), radix)?;
    let device = File::open(&cli.image)?;
    let mut fs = Filesystem::load(Box::new(device))?;
    let options = Options {
        identifier: Some(identifier),
        max_depth: cli.max_depth,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    inspect(&mut fs, &options, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
