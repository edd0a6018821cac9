use anyhow::Result;
use serde_json::json;

use crate::cli::SplitArgs;
use crate::commands::read_input;
use crate::output::{OutputFormat, json::print_json};
use livedraft_core::simulate::split_into_sentence_chunks;

pub fn run(args: SplitArgs, format: OutputFormat) -> Result<()> {
    let text = read_input(args.file.as_deref())?;
    let pieces: Vec<&str> = split_into_sentence_chunks(&text).collect();

    if format.is_json() {
        return print_json(&json!({ "pieces": pieces }));
    }

    for (index, piece) in pieces.iter().enumerate() {
        println!("{:>3}: {:?}", index + 1, piece);
    }

    Ok(())
}
