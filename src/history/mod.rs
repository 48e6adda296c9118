use std::fs::{self, OpenOptions};
use std::io::Write;
use std::mem;
use std::path::Path;
use tracing::{error, info, warn};

use crate::helpers::{self, AppError};
use crate::sanitize;

pub const CSV_HEADER: &str = "Datum,Begriffe,Modell,Prompt";

pub struct HistoryRecord {
	pub date: String,
	pub keywords: String,
	pub model: String,
	pub prompt: String,
}

/// Append one record, writing the header row only when the file is new.
/// Both free-text fields are collapsed to a single line first, so every
/// record occupies exactly one line of the file.
pub fn append_row(path: &Path, record: &HistoryRecord) -> Result<(), AppError> {
	let file_exists = path.is_file();
	let mut file = OpenOptions::new().create(true).append(true).open(path)?;
	if !file_exists {
		writeln!(file, "{}", CSV_HEADER)?;
		info!("header row added to '{}'", path.display());
	}

	let keywords = sanitize::collapse_newlines(record.keywords.trim());
	let prompt = normalize_prompt_field(&record.prompt);
	let fields = [record.date.as_str(), keywords.as_str(), record.model.as_str(), prompt.as_str()];
	let line = fields.iter().map(|field| quote_field(field)).collect::<Vec<_>>().join(",");
	writeln!(file, "{}", line)?;
	info!("row added to '{}'", path.display());
	Ok(())
}

fn normalize_prompt_field(prompt: &str) -> String {
	let cleaned = sanitize::clean_generated(prompt);
	let collapsed = sanitize::collapse_newlines(&cleaned);
	match collapsed.strip_suffix(',') {
		Some(stripped) => stripped.to_string(),
		None => collapsed,
	}
}

/// Append the final text to the flat prompt log, one entry per line.
pub fn append_to_log(path: &Path, text: &str) -> Result<(), AppError> {
	let mut file = OpenOptions::new().create(true).append(true).open(path)?;
	writeln!(file, "{}", text.trim())?;
	info!("prompt appended to '{}'", path.display());
	Ok(())
}

/// Rewrite the history file, dropping rows that do not parse to the four
/// expected fields and rows whose keyword field is purely numeric, and
/// re-stripping quote/comma artifacts from the prompt field. The rewrite
/// goes through a temp file and a rename so the original is never left
/// half-written.
pub fn clean_csv(path: &Path) -> Result<(), AppError> {
	let content = fs::read_to_string(path)?;
	let mut lines = content.lines();

	let header = match lines.next() {
		Some(header) => header,
		None => {
			error!("no header row found in '{}'", path.display());
			return Ok(());
		}
	};
	if header != CSV_HEADER {
		error!("unexpected header row in '{}': {}", path.display(), header);
		return Ok(());
	}

	let mut cleaned = String::new();
	cleaned.push_str(CSV_HEADER);
	cleaned.push('\n');

	for line in lines {
		if line.trim().is_empty() {
			continue;
		}
		let mut fields = match parse_record(line) {
			Some(fields) if fields.len() == 4 => fields,
			_ => {
				warn!("skipping malformed row: {}", line);
				continue;
			}
		};
		// Keyword fields that are nothing but digits come from one known
		// malformed-input case; the empty string does not count.
		if !fields[1].is_empty() && fields[1].chars().all(|ch| ch.is_ascii_digit()) {
			warn!("skipping row with invalid keywords: {}", line);
			continue;
		}
		fields[3] = sanitize::strip_field_artifacts(&fields[3]);
		let row = fields.iter().map(|field| quote_field(field)).collect::<Vec<_>>().join(",");
		cleaned.push_str(&row);
		cleaned.push('\n');
	}

	helpers::write_atomic(path, &cleaned)?;
	info!("history file '{}' rewritten", path.display());
	Ok(())
}

/// Quote a field only when it needs it, doubling embedded quotes.
pub fn quote_field(field: &str) -> String {
	let needs_quoting = field.chars().any(|ch| matches!(ch, '"' | ',' | '\n' | '\r'));
	if needs_quoting {
		format!("\"{}\"", field.replace('"', "\"\""))
	} else {
		field.to_string()
	}
}

/// Parse one record line into its fields. Returns None for lines that are
/// not valid CSV (stray quote, unterminated quote); the cleanup pass drops
/// those.
pub fn parse_record(line: &str) -> Option<Vec<String>> {
	let mut fields = Vec::new();
	let mut field = String::new();
	let mut in_quotes = false;
	let mut chars = line.chars().peekable();

	while let Some(ch) = chars.next() {
		if in_quotes {
			if ch == '"' {
				if chars.peek() == Some(&'"') {
					chars.next();
					field.push('"');
				} else {
					in_quotes = false;
				}
			} else {
				field.push(ch);
			}
		} else {
			match ch {
				',' => fields.push(mem::take(&mut field)),
				'"' if field.is_empty() => in_quotes = true,
				'"' => return None,
				_ => field.push(ch),
			}
		}
	}
	if in_quotes {
		return None;
	}
	fields.push(field);
	Some(fields)
}
