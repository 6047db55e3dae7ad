use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Text from `-s`/`-q`, a file, or stdin when the path is `-`.
pub fn load_text(path: Option<&Path>, text: Option<&str>, what: &str) -> Result<String, String> {
    match (text, path) {
        (Some(text), None) => Ok(text.to_owned()),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            Ok(buf)
        }
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display())),
        (Some(_), Some(_)) => Err(format!("cannot use both inline {what} and a {what} file")),
        (None, None) => Err(format!("{what} required (positional or inline flag)")),
    }
}
