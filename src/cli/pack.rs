use std::path::PathBuf;

use clap::Args;

use texpack::repack::DEFAULT_GROUP_LIMIT;
use texpack::{repack_document, ChannelGrouping};

use super::{fatal, read_json, sibling_output, write_json};

/// Fixed output file name written next to the input.
const OUTPUT_NAME: &str = "formatted_model.json";

#[derive(Args)]
pub struct PackArgs {
    /// Input weight JSON file
    pub input: PathBuf,
    /// Output file (default: formatted_model.json next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Regroup channels for parameters with top-level index below this limit
    #[arg(long, value_name = "N", default_value_t = DEFAULT_GROUP_LIMIT)]
    pub group_below: usize,
    /// Save the conversion report (paths and packed shapes) to a JSON file
    #[arg(long, value_name = "PATH")]
    pub save_report: Option<PathBuf>,
}

pub fn cmd_pack(args: PackArgs) {
    let json = read_json(&args.input);
    let grouping = ChannelGrouping::IndexBelow(args.group_below);

    let (packed, report) = match repack_document(&json, &grouping) {
        Ok(result) => result,
        Err(e) => fatal(e),
    };

    for (path, shape) in &report.repacked {
        println!("{path}: {shape:?}");
    }

    let output = args
        .output
        .unwrap_or_else(|| sibling_output(&args.input, OUTPUT_NAME));
    write_json(&output, &packed);

    if let Some(report_path) = &args.save_report {
        match serde_json::to_value(&report) {
            Ok(json) => write_json(report_path, &json),
            Err(e) => fatal(e),
        }
    }
    println!(
        "repacked {} tensors ({} leaves skipped) -> {}",
        report.repacked.len(),
        report.skipped,
        output.display()
    );
}
