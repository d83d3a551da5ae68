use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Scans the prompt for words naming existing files and appends those
/// files' contents as additional context.
///
/// Trailing punctuation is stripped before the filesystem probe so that
/// "look at config.toml." still finds the file. Unreadable files are
/// skipped. Returns the prompt unchanged when nothing matches.
pub fn append_file_contents(prompt: &str) -> String {
    let mut appended = String::new();
    let mut seen = BTreeSet::new();

    for word in prompt.split_whitespace() {
        let candidate = word.trim_end_matches(['.', '!', '?', ':', ';', ',']);
        if candidate.is_empty() || !seen.insert(candidate) {
            continue;
        }

        if Path::new(candidate).is_file() {
            if let Ok(contents) = fs::read_to_string(candidate) {
                appended.push_str(&format!("\n{}:\n{}\n", candidate, contents));
            }
        }
    }

    if appended.is_empty() {
        prompt.to_string()
    } else {
        format!("{}\n{}", prompt, appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(label: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "promptpal_scan_{}_{}.txt",
            label,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_no_files_leaves_prompt_unchanged() {
        let prompt = "summarize the plan for tomorrow";
        assert_eq!(append_file_contents(prompt), prompt);
    }

    #[test]
    fn test_existing_file_is_appended() {
        let path = scratch_file("hit", "line one\nline two\n");
        let prompt = format!("review {}", path.display());

        let expanded = append_file_contents(&prompt);

        assert!(expanded.starts_with(&prompt));
        assert!(expanded.contains("line one\nline two"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_trailing_punctuation_is_stripped() {
        let path = scratch_file("punct", "content here\n");
        let prompt = format!("what is in {}?", path.display());

        let expanded = append_file_contents(&prompt);

        assert!(expanded.contains("content here"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_repeated_mention_appends_once() {
        let path = scratch_file("dedupe", "only once\n");
        let shown = path.display().to_string();
        let prompt = format!("{} and again {}", shown, shown);

        let expanded = append_file_contents(&prompt);

        assert_eq!(expanded.matches("only once").count(), 1);

        let _ = fs::remove_file(&path);
    }
}
