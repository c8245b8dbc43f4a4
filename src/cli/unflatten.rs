use std::path::PathBuf;

use clap::Args;

use texpack::{nest_document, DEFAULT_DELIMITER};

use super::{fatal, read_json, sibling_output, write_json};

/// Fixed output file name written next to the input.
const OUTPUT_NAME: &str = "nested_model.json";

#[derive(Args)]
pub struct UnflattenArgs {
    /// Input flat dotted-key JSON file
    pub input: PathBuf,
    /// Output file (default: nested_model.json next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Key delimiter
    #[arg(short, long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,
}

pub fn cmd_unflatten(args: UnflattenArgs) {
    let json = read_json(&args.input);

    let nested = match nest_document(&json, &args.delimiter) {
        Ok(nested) => nested,
        Err(e) => fatal(e),
    };

    let output = args
        .output
        .unwrap_or_else(|| sibling_output(&args.input, OUTPUT_NAME));
    write_json(&output, &nested);
    println!("wrote {}", output.display());
}
