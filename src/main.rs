#![allow(unused)]

use clap::{CommandFactory, Parser};
use chrono::Local;
use serde_derive::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

mod helpers;
mod history;
mod instructions;
mod keywords;
mod ollama;
mod sanitize;

#[cfg(test)]
mod test;

#[derive(Parser)]
struct Cli {
	/// The keywords to expand into a prompt (prefix a filename with @ to read them from that
	/// file, or pass - to read stdin)
	keywords: Option<String>,
	#[clap(long, default_value = "0")]
	/// index of the instruction block to use (see --list-instructions)
	instruction: usize,
	#[clap(long)]
	/// model name as shown by --list-models (default is the configured or first installed model)
	model: Option<String>,
	#[clap(long)]
	/// file holding the instruction blocks, separated by blank lines
	instructions_file: Option<PathBuf>,
	#[clap(long)]
	/// where the history, prompt log and script log live
	data_dir: Option<PathBuf>,
	#[clap(long)]
	/// list the installed models and exit
	list_models: bool,
	#[clap(long)]
	/// list the instruction blocks and exit
	list_instructions: bool,
	#[clap(long)]
	/// open the generated text in $EDITOR before it is saved
	edit: bool,
	#[clap(long, default_value = "false")]
	/// print the generated text without touching the history or the prompt log
	no_save: bool,
	#[clap(long)]
	/// rewrite the history file, dropping malformed rows, then exit
	clean_history: bool,
}

#[derive(Deserialize, Default)]
struct Config {
	model: Option<String>,
	instructions_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Cli::parse();

	let data_dir = match args.data_dir.clone() {
		Some(dir) => dir,
		None => helpers::data_get_dir(Some("promptgen"))?,
	};
	std::fs::create_dir_all(&data_dir)?;
	helpers::init_logging(&data_dir.join("script.log"));

	let history_csv = data_dir.join("prompts.csv");
	let prompt_log = data_dir.join("prompt.txt");

	let config: Config = helpers::config_load("promptgen", "config").unwrap_or_default();

	if args.list_models {
		let models = ollama::list_models().await?;
		if models.is_empty() {
			eprintln!("No models are installed. Please install at least one model.");
			process::exit(1);
		}
		for (index, model) in models.iter().enumerate() {
			println!("{}: {}", index + 1, model);
		}
		return Ok(());
	}

	if args.clean_history {
		history::clean_csv(&history_csv)?;
		println!("History cleaned: {}", history_csv.display());
		return Ok(());
	}

	let instructions_file = args.instructions_file
		.or(config.instructions_file)
		.unwrap_or_else(|| data_dir.join("instructions.txt"));
	let instructions = instructions::read_instructions(&instructions_file);

	if args.list_instructions {
		if instructions.is_empty() {
			eprintln!("No instructions found. Please check the file {}.", instructions_file.display());
			process::exit(1);
		}
		for (index, instruction) in instructions.iter().enumerate() {
			println!("{}: {}", index, instruction);
		}
		return Ok(());
	}

	let keywords = match args.keywords.as_deref() {
		Some(s) if s.starts_with('@') => {
			// filename
			let mut filename = s.to_string();
			filename.remove(0);
			let mut content = String::new();
			File::open(&filename)?.read_to_string(&mut content)?;
			content
		},
		Some("-") => {
			// stdin
			helpers::read_stdin()?
		},
		Some(s) => {
			s.to_string()
		},
		None => {
			"".to_string()
		},
	};
	let keywords = keywords.trim().to_string();
	if keywords.is_empty() {
		let mut cmd = Cli::command();
		cmd.error(
			clap::error::ErrorKind::MissingRequiredArgument,
			"The keywords must not be empty, see --help",
			).exit();
	}

	let instruction = match instructions.get(args.instruction) {
		Some(instruction) => instruction.clone(),
		None => {
			eprintln!(
				"No instruction with index {} ({} loaded from {}).",
				args.instruction,
				instructions.len(),
				instructions_file.display(),
			);
			process::exit(1);
		}
	};

	let model = match args.model.or(config.model) {
		Some(model) => model,
		None => {
			let models = ollama::list_models().await?;
			match models.into_iter().next() {
				Some(model) => model,
				None => {
					eprintln!("No models are installed. Please install at least one model.");
					process::exit(1);
				}
			}
		}
	};

	let generated = match ollama::generate(&instruction, &keywords, &model).await {
		Ok(text) => text,
		Err(err) => {
			error!("generation failed: {}", err);
			eprintln!("Text generation failed: {}", err);
			process::exit(1);
		}
	};

	let final_text = if args.edit {
		match helpers::edit_in_editor(&generated)? {
			Some(edited) => edited.trim().to_string(),
			None => {
				eprintln!("Editor aborted, prompt not saved.");
				println!("{}", generated);
				return Ok(());
			}
		}
	} else {
		generated
	};

	println!("{}", final_text);

	if !args.no_save {
		let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
		let record = history::HistoryRecord {
			date,
			keywords: keywords.clone(),
			model: model.clone(),
			prompt: final_text.clone(),
		};
		history::append_row(&history_csv, &record)?;
		history::append_to_log(&prompt_log, &final_text)?;
		history::clean_csv(&history_csv)?;
	}

	Ok(())
}
