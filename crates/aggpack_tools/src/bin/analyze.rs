use aggpack_data::FrameRecord;
use aggpack_io::read_csv_file;
use anyhow::Context;
use clap::Parser;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarise a packing-fraction time series", long_about = None)]
struct Args {
    /// CSV written by an aggpack sweep
    input: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct SeriesSummary {
    frames: usize,
    aggregate_volume: f64,
    initial_packing_fraction: f64,
    final_packing_fraction: f64,
    peak_packing_fraction: f64,
    peak_frame: u32,
    initial_bounding_radius: f64,
    final_bounding_radius: f64,
    /// Final over initial bounding radius; below 1 when the cloud contracted.
    radius_contraction: f64,
}

fn summarise(records: &[FrameRecord]) -> Option<SeriesSummary> {
    let first = records.first()?;
    let last = records.last()?;
    let peak = records
        .iter()
        .max_by(|a, b| a.packing_fraction.total_cmp(&b.packing_fraction))?;

    Some(SeriesSummary {
        frames: records.len(),
        aggregate_volume: first.aggregate_volume,
        initial_packing_fraction: first.packing_fraction,
        final_packing_fraction: last.packing_fraction,
        peak_packing_fraction: peak.packing_fraction,
        peak_frame: peak.time,
        initial_bounding_radius: first.bounding_radius,
        final_bounding_radius: last.bounding_radius,
        radius_contraction: last.bounding_radius / first.bounding_radius,
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let records =
        read_csv_file(&args.input).with_context(|| format!("loading {}", args.input))?;
    let Some(summary) = summarise(&records) else {
        println!("No frames found in {}. Nothing to analyze.", args.input);
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Packing fraction summary for {}", args.input);
    println!("Frames:            {}", summary.frames);
    println!("Solid volume:      {:.4}", summary.aggregate_volume);
    println!(
        "Packing fraction:  {:.6} -> {:.6} (peak {:.6} at frame {})",
        summary.initial_packing_fraction,
        summary.final_packing_fraction,
        summary.peak_packing_fraction,
        summary.peak_frame
    );
    println!(
        "Bounding radius:   {:.4} -> {:.4} ({:.1}% of initial)",
        summary.initial_bounding_radius,
        summary.final_bounding_radius,
        100.0 * summary.radius_contraction
    );

    Ok(())
}
