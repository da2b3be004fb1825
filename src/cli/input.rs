//! Input discovery and interactive prompts for the CLI
//!
//! Survey paths given on the command line may be files or directories;
//! directories are walked recursively and every regular file inside is a
//! candidate survey.

use crate::Error;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Expand files and directories into the survey files they contain
///
/// Files are returned in command-line order; the contents of each directory
/// are sorted by name. Hidden files and directories are skipped.
pub fn discover_survey_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("Survey path not found: {}", path.display());
        }

        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let walker = WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::directory_traversal(format!("Failed to walk {}", path.display()), e)
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    debug!("Discovered {} survey files", files.len());
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Ask a yes/no question on stdin
pub fn prompt_confirmation(message: &str, default_yes: bool) -> Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    read_confirmation(&mut stdin.lock(), &mut stdout, message, default_yes)
}

/// Ask a yes/no question, re-asking until the answer is understood
///
/// End of input counts as the default answer.
pub fn read_confirmation(
    input: &mut impl BufRead,
    output: &mut impl Write,
    message: &str,
    default_yes: bool,
) -> Result<bool> {
    let default_text = if default_yes { "Y/n" } else { "y/N" };

    loop {
        write!(output, "{} [{}]: ", message, default_text).context("Failed to write prompt")?;
        output.flush().context("Failed to flush prompt")?;

        let mut answer = String::new();
        let read = input
            .read_line(&mut answer)
            .context("Failed to read user input")?;
        if read == 0 {
            return Ok(default_yes);
        }

        match answer.trim().to_lowercase().as_str() {
            "" => return Ok(default_yes),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please enter 'y' for yes or 'n' for no.")
                .context("Failed to write prompt")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn ask(answers: &str, default_yes: bool) -> (bool, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let answer = read_confirmation(&mut input, &mut output, "Clear?", default_yes).unwrap();
        (answer, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(ask("y\n", false).0);
        assert!(ask("YES\n", false).0);
        assert!(!ask("n\n", true).0);
        assert!(ask("\n", true).0);
        assert!(!ask("", false).0);
    }

    #[test]
    fn test_confirmation_reprompts() {
        let (answer, output) = ask("maybe\nno\n", true);
        assert!(!answer);
        assert_eq!(output.matches("Clear? [Y/n]: ").count(), 2);
        assert!(output.contains("Please enter"));
    }

    #[test]
    fn test_discover_walks_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("b/nested/two.txt"), "").unwrap();
        fs::write(root.join("a.xml"), "").unwrap();
        fs::write(root.join(".hidden.txt"), "").unwrap();
        fs::write(root.join(".cache/skip.txt"), "").unwrap();
        let single = root.join("b/nested/two.txt");

        let files = discover_survey_files(&[single.clone(), root.to_path_buf()]).unwrap();
        assert_eq!(files, vec![single.clone(), root.join("a.xml"), single]);
    }

    #[test]
    fn test_discover_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover_survey_files(&[temp_dir.path().join("absent")]);
        assert!(result.is_err());
    }
}
