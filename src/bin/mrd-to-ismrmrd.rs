use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use mrd_convert::cli::init_logging;
use mrd_convert::pump::mrd_to_ismrmrd;

/// Convert an MRD stream on stdin into an ISMRMRD stream on stdout
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let input = BufReader::new(io::stdin().lock());
    let output = BufWriter::new(io::stdout().lock());
    match mrd_to_ismrmrd(input, output) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
