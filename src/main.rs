use anyhow::Result;
use clap::Parser;
use console::style;

use tiff_converter::utils::format_duration;
use tiff_converter::{Args, ConversionEngine, RunSummary};

fn print_summary(run: &RunSummary, dry_run: bool) {
    let header = if dry_run {
        style("Dry Run Results Summary:").bold().cyan()
    } else {
        style("Results Summary:").bold().green()
    };
    println!("{}", header);

    println!("  Folders processed: {}", style(run.folders_converted).bold());
    let converted_label = if dry_run {
        "Would be converted"
    } else {
        "Converted"
    };
    let converted = if dry_run {
        run.files.planned
    } else {
        run.files.converted
    };
    println!("  {}: {}", converted_label, style(converted).bold().green());
    if run.files.skipped > 0 {
        println!(
            "  Skipped (already exist): {}",
            style(run.files.skipped).bold().yellow()
        );
    }
    if run.files.failed() > 0 {
        println!("  Failed: {}", style(run.files.failed()).bold().red());
    }

    if run.files.failed() > 0 {
        println!();
        println!("{}", style("Errors encountered:").bold().red());
        for (i, failure) in run.files.failures.iter().enumerate() {
            println!(
                "  {}: {} - {}",
                style(format!("#{}", i + 1)).dim(),
                style(failure.path.display()).bold().red(),
                failure.message
            );
        }
    }

    if run.has_aborted() {
        println!();
        println!("{}", style("Aborted folders:").bold().red());
        for (i, aborted) in run.aborted.iter().enumerate() {
            println!(
                "  {}: {} - {}",
                style(format!("#{}", i + 1)).dim(),
                style(aborted.path.display()).bold().red(),
                aborted.message
            );
        }
    }

    println!();
    println!(
        "Total time to complete: {}",
        style(format_duration(run.total_duration)).bold()
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("{}", style("TIFF Converter").bold().blue());
    println!();

    let config = args.to_config();

    println!(
        "Converting .tif files in {} to {} with quality {}",
        config.root.display(),
        config.output_format.label(),
        config.quality
    );
    println!("Target data types: {:?}", config.target_types.names());

    if config.verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Overwrite: {}", config.overwrite);
        println!("  Modulo: {:?}", config.mod_value);
        if let Some(ref output_path) = config.output_path {
            println!("  Output path: {}", output_path.display());
        }
        println!("  Parallel jobs: {}", config.parallel_jobs);
        if config.dry_run {
            println!("  Dry run mode: enabled (no folders or files will be created)");
        }
        println!();
    }

    let engine = ConversionEngine::new(config);
    let run = engine.convert_tree()?;

    println!();
    print_summary(&run, engine.config().dry_run);

    if run.has_aborted() {
        return Err(anyhow::anyhow!(
            "{} folder(s) could not be converted",
            run.aborted.len()
        ));
    }

    Ok(())
}
