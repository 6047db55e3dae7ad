use std::path::Path;

use tessel_runtime::Language;

/// Picks the language from `--grammar`, then `-l`, then the source extension.
pub fn resolve_language(
    lang: Option<&str>,
    grammar: Option<&Path>,
    source_path: Option<&Path>,
) -> Result<Language, String> {
    if let Some(path) = grammar {
        return Language::load(path)
            .map_err(|e| format!("failed to load '{}': {e}", path.display()));
    }

    if let Some(name) = lang {
        return match tessel_langs::from_name(name) {
            Some(found) => found.map_err(|e| e.to_string()),
            None => {
                let mut msg = format!("unknown language: '{name}'");
                if let Some(suggestion) = suggest_language(name) {
                    msg.push_str(&format!("\n\nDid you mean '{suggestion}'?"));
                }
                msg.push_str("\n\nRun 'tessel langs' for the full list.");
                Err(msg)
            }
        };
    }

    if let Some(path) = source_path
        && path.as_os_str() != "-"
        && let Some(ext) = path.extension().and_then(|e| e.to_str())
    {
        return match tessel_langs::from_ext(ext) {
            Some(found) => found.map_err(|e| e.to_string()),
            None => Err(format!(
                "cannot infer language from extension '.{ext}', use -l/--lang"
            )),
        };
    }

    Err("-l/--lang or --grammar is required when the source has no known extension".to_owned())
}

/// Suggest a bundled language name for a typo.
pub fn suggest_language(input: &str) -> Option<String> {
    let input = input.to_lowercase();
    let registry = tessel_langs::registry().ok()?;
    registry
        .names()
        .map(|name| (levenshtein(name, &input), name))
        .filter(|(distance, _)| *distance <= 2)
        .min()
        .map(|(_, name)| name.to_owned())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
