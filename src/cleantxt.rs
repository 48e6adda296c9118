#![allow(unused)]

use clap::Parser;
use std::path::PathBuf;

mod helpers;
mod keywords;

#[derive(Parser)]
/// Normalize a keyword list file in place: lowercase, deduplicated, sorted,
/// every entry ending in a period.
struct Cli {
	/// the file to rewrite
	file: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Cli::parse();

	if !args.file.is_file() {
		eprintln!("The file '{}' was not found. Please check the path.", args.file.display());
		std::process::exit(1);
	}

	match keywords::normalize_file(&args.file) {
		Ok(count) => {
			println!("The file '{}' was processed and rewritten ({} entries).", args.file.display(), count);
			Ok(())
		}
		Err(err) => {
			eprintln!("An error occurred while processing '{}': {}", args.file.display(), err);
			std::process::exit(1);
		}
	}
}
