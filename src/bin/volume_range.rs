use anyhow::Result;
use clap::Parser;

use tiff_converter::range::{format_range, sampling_range, DEFAULT_LENGTH, DEFAULT_STEP};

/// Print a sampling range to paste into the volume download scripts
#[derive(Parser, Debug)]
#[command(
    name = "volume-range",
    about = "Print every nth volume index as [a,b,c] for the download scripts"
)]
struct Args {
    /// Z-axis length of the scroll (exclusive upper bound)
    #[arg(short = 'l', long = "length", default_value_t = DEFAULT_LENGTH)]
    length: u64,

    /// Sample every STEP volumes
    #[arg(short = 's', long = "step", default_value_t = DEFAULT_STEP)]
    step: u64,

    /// First index
    #[arg(long = "start", default_value_t = 0)]
    start: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let values = sampling_range(args.start, args.length, args.step)?;
    println!("{}", format_range(&values));
    Ok(())
}
