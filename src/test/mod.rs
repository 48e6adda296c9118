use super::*;
use std::fs;
use std::path::Path;
use tokio::time::Duration;

fn sample_record(prompt: &str) -> history::HistoryRecord {
	history::HistoryRecord {
		date: "2025-01-02 03:04:05".to_string(),
		keywords: "sea, salt".to_string(),
		model: "llama3:latest".to_string(),
		prompt: prompt.to_string(),
	}
}

#[test]
fn read_instructions_splits_blank_line_blocks() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("instructions.txt");
	fs::write(&path, "Write a poem.\nUse short lines.\n\nWrite a product description.\n\n\n  Summarize the text.  \n").unwrap();

	let instructions = instructions::read_instructions(&path);
	assert_eq!(instructions, vec![
		"Write a poem.\nUse short lines.".to_string(),
		"Write a product description.".to_string(),
		"Summarize the text.".to_string(),
	]);
}

#[test]
fn read_instructions_missing_file_yields_empty_list() {
	let dir = tempfile::tempdir().unwrap();
	let instructions = instructions::read_instructions(&dir.path().join("nope.txt"));
	assert!(instructions.is_empty());
}

#[test]
fn clean_generated_removes_trailing_artifacts() {
	let raw = "\"Hello world.\"\n.";
	assert_eq!(sanitize::clean_generated(raw), "Hello world.");
}

#[test]
fn clean_generated_is_idempotent() {
	let inputs = [
		"  spaced out  ",
		"\"Quoted answer\"",
		"Text body\n.",
		"\"Hello world.\"\n.",
		"plain",
	];
	for input in inputs {
		let once = sanitize::clean_generated(input);
		let twice = sanitize::clean_generated(&once);
		assert_eq!(once, twice, "not idempotent for {:?}", input);
	}
}

#[test]
fn collapse_newlines_flattens_all_breaks() {
	assert_eq!(sanitize::collapse_newlines("a\r\nb\nc\rd"), "a b c d");
}

#[test]
fn strip_field_artifacts_removes_quotes_and_commas() {
	assert_eq!(sanitize::strip_field_artifacts(" \"Quoted text\", "), "Quoted text");
	assert_eq!(sanitize::strip_field_artifacts("\"abc\""), "abc");
	assert_eq!(sanitize::strip_field_artifacts("plain"), "plain");
}

#[test]
fn quote_field_escapes_embedded_quotes() {
	assert_eq!(history::quote_field("plain"), "plain");
	assert_eq!(history::quote_field("a,b"), "\"a,b\"");
	assert_eq!(history::quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
}

#[test]
fn parse_record_round_trips_quoted_fields() {
	let fields = vec![
		"2025-01-02 03:04:05".to_string(),
		"sea, salt".to_string(),
		"say \"hi\"".to_string(),
		"plain".to_string(),
	];
	let line = fields.iter().map(|f| history::quote_field(f)).collect::<Vec<_>>().join(",");
	assert_eq!(history::parse_record(&line), Some(fields));
}

#[test]
fn parse_record_rejects_broken_quoting() {
	assert_eq!(history::parse_record("abc\"def,x,y,z"), None);
	assert_eq!(history::parse_record("a,\"open,b,c"), None);
}

#[test]
fn append_row_writes_header_only_once() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");

	history::append_row(&path, &sample_record("First text")).unwrap();
	history::append_row(&path, &sample_record("Second text")).unwrap();

	let content = fs::read_to_string(&path).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines.len(), 3);
	assert_eq!(lines[0], history::CSV_HEADER);
}

#[test]
fn append_row_stores_single_line_records() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");

	let record = history::HistoryRecord {
		date: "2025-01-02 03:04:05".to_string(),
		keywords: "salt\npepper".to_string(),
		model: "llama3:latest".to_string(),
		prompt: "line one\nline two\n.".to_string(),
	};
	history::append_row(&path, &record).unwrap();

	let content = fs::read_to_string(&path).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines[1], "2025-01-02 03:04:05,salt pepper,llama3:latest,line one line two");
}

#[test]
fn clean_csv_keeps_wellformed_rows() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");

	history::append_row(&path, &sample_record("First text")).unwrap();
	history::append_row(&path, &sample_record("Second text")).unwrap();
	history::clean_csv(&path).unwrap();

	let content = fs::read_to_string(&path).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines.len(), 3);
	assert_eq!(lines[0], history::CSV_HEADER);
	for line in &lines[1..] {
		let fields = history::parse_record(line).unwrap();
		assert_eq!(fields.len(), 4);
		assert_eq!(fields[1], "sea, salt");
	}
}

#[test]
fn clean_csv_drops_numeric_keyword_rows() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");
	fs::write(&path, format!(
		"{}\n2025-01-01 10:00:00,12345,llama3:latest,Some text\n2025-01-01 10:01:00,sea salt,llama3:latest,Other text\n",
		history::CSV_HEADER,
	)).unwrap();

	history::clean_csv(&path).unwrap();

	let content = fs::read_to_string(&path).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines.len(), 2);
	assert!(lines[1].contains("sea salt"));
}

#[test]
fn clean_csv_drops_malformed_rows() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");
	fs::write(&path, format!(
		"{}\nonly,three,fields\n2025-01-01 10:00:00,sea salt,llama3:latest,Good text\na,\"unterminated,c,d\n",
		history::CSV_HEADER,
	)).unwrap();

	history::clean_csv(&path).unwrap();

	let content = fs::read_to_string(&path).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines.len(), 2);
	assert!(lines[1].contains("Good text"));
}

#[test]
fn clean_csv_strips_prompt_artifacts() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");
	fs::write(&path, format!(
		"{}\n2025-01-01 10:00:00,sea salt,llama3:latest,\"\"\"Quoted text\"\",\"\n",
		history::CSV_HEADER,
	)).unwrap();

	history::clean_csv(&path).unwrap();

	let content = fs::read_to_string(&path).unwrap();
	let lines: Vec<&str> = content.lines().collect();
	assert_eq!(lines[1], "2025-01-01 10:00:00,sea salt,llama3:latest,Quoted text");
}

#[test]
fn clean_csv_leaves_foreign_header_untouched() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompts.csv");
	let original = "Wrong,Header,Row,Here\n1,2,3,4\n";
	fs::write(&path, original).unwrap();

	history::clean_csv(&path).unwrap();

	assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn append_to_log_adds_one_line_per_entry() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("prompt.txt");

	history::append_to_log(&path, "First result\n").unwrap();
	history::append_to_log(&path, "  Second result").unwrap();

	let content = fs::read_to_string(&path).unwrap();
	assert_eq!(content, "First result\nSecond result\n");
}

#[test]
fn write_atomic_replaces_content_without_leftovers() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("data.txt");
	fs::write(&path, "old").unwrap();

	helpers::write_atomic(&path, "new").unwrap();

	assert_eq!(fs::read_to_string(&path).unwrap(), "new");
	assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn normalize_entries_dedupes_sorts_and_punctuates() {
	let entries = keywords::normalize_entries(["Apple,", "apple.", " Banana", "", "cherry,"]);
	assert_eq!(entries, vec!["apple.".to_string(), "banana.".to_string(), "cherry.".to_string()]);
}

#[test]
fn normalize_file_rewrites_in_place() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("keywords.txt");
	fs::write(&path, "Tree,\ntree\nBUSH\n").unwrap();

	let count = keywords::normalize_file(&path).unwrap();

	assert_eq!(count, 2);
	assert_eq!(fs::read_to_string(&path).unwrap(), "bush.\ntree.\n");
}

#[test]
fn parse_model_listing_skips_header_row() {
	let listing = "NAME            ID      SIZE    MODIFIED\nllama3:latest   abc     4.7 GB  2 days ago\nmistral:7b      def     4.1 GB  3 weeks ago\n";
	assert_eq!(ollama::parse_model_listing(listing), vec!["llama3:latest".to_string(), "mistral:7b".to_string()]);
	assert!(ollama::parse_model_listing("NAME            ID\n").is_empty());
	assert!(ollama::parse_model_listing("").is_empty());
}

#[test]
fn build_prompt_joins_trimmed_parts() {
	assert_eq!(ollama::build_prompt("  Write a poem.  ", "\nsea, salt\n"), "Write a poem.\nsea, salt");
}

#[tokio::test]
async fn run_command_captures_stdout() {
	let (status, stdout, stderr) = ollama::run_command(Path::new("echo"), &["run", "model", "hello"], Duration::from_secs(5))
		.await
		.unwrap();
	assert!(status.success());
	assert_eq!(stdout, "run model hello\n");
	assert_eq!(stderr, "");
}

#[tokio::test]
async fn run_command_reports_nonzero_exit() {
	let (status, _stdout, _stderr) = ollama::run_command(Path::new("false"), &[], Duration::from_secs(5))
		.await
		.unwrap();
	assert!(!status.success());
}

#[tokio::test]
async fn run_command_times_out() {
	let result = ollama::run_command(Path::new("sleep"), &["5"], Duration::from_millis(200)).await;
	assert!(matches!(result, Err(ollama::OllamaError::Timeout)));
}
