use std::fs;
use std::path::PathBuf;

use tessel_generate::{ConflictPolicy, TableOptions, generate_from_json};

pub struct GenerateArgs {
    pub grammar_json: PathBuf,
    pub output: Option<PathBuf>,
    pub conflicts: ConflictPolicy,
}

pub fn run(args: GenerateArgs) {
    match generate(&args) {
        Ok(path) => println!("{}", path.display()),
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

/// Writes the artifact and returns where it went.
pub fn generate(args: &GenerateArgs) -> Result<PathBuf, String> {
    let json = fs::read_to_string(&args.grammar_json)
        .map_err(|e| format!("failed to read '{}': {e}", args.grammar_json.display()))?;
    let options = TableOptions::default().with_conflict_policy(args.conflicts);
    let table = generate_from_json(&json, &options).map_err(|e| e.to_string())?;
    let bytes = table.to_artifact().map_err(|e| e.to_string())?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.tsl", table.name)));
    fs::write(&output, &bytes)
        .map_err(|e| format!("failed to write '{}': {e}", output.display()))?;
    tracing::info!(
        language = %table.name,
        bytes = bytes.len(),
        path = %output.display(),
        "wrote grammar table"
    );
    Ok(output)
}
