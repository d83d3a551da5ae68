use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::extensions;
use super::fence::CodeBlock;

const DEFAULT_ROOT: &str = "code";
const FALLBACK_BASE_NAME: &str = "code";

/// Persists extracted code blocks under a root directory without ever
/// overwriting an existing file.
///
/// Output paths follow `<root>/<base>.<timestamp>.<counter><ext>` where the
/// base name comes from the longest class name in the block, else the longest
/// function name, else a generic fallback.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    /// Root output directory (defaults to "code").
    root: PathBuf,
    /// Timestamp segment shared by every file written in this run.
    timestamp: String,
}

impl CodeWriter {
    pub fn new(root: Option<PathBuf>, timestamp: impl Into<String>) -> Self {
        Self {
            root: root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            timestamp: timestamp.into(),
        }
    }

    /// Writes a block to disk and returns the path used.
    ///
    /// Creates the root directory if absent. If the computed path already
    /// exists, a numeric suffix is appended before the extension until a free
    /// path is found. Content is the block's lines joined by newlines,
    /// verbatim, with a trailing newline.
    pub fn write_block(&self, block: &CodeBlock, counter: usize) -> io::Result<PathBuf> {
        let base = select_base_name(block);
        let extension = extensions::resolve(&block.language);
        let stem = format!("{}.{}.{}", base, self.timestamp, counter);

        fs::create_dir_all(&self.root)?;
        let path = unique_path(&self.root, &stem, &extension);
        fs::write(&path, block.lines.join("\n") + "\n")?;

        Ok(path)
    }
}

/// Longest class name, else longest function name, else the generic
/// fallback. Leading underscores are stripped from the chosen name.
fn select_base_name(block: &CodeBlock) -> String {
    let name = longest(&block.classes)
        .or_else(|| longest(&block.functions))
        .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string());

    let name = name.trim_start_matches('_');
    if name.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        name.to_string()
    }
}

fn longest(names: &BTreeSet<String>) -> Option<String> {
    names
        .iter()
        .filter(|name| !name.is_empty())
        .max_by_key(|name| name.len())
        .cloned()
}

/// Probes the filesystem for a free path, appending `_1`, `_2`, ... before
/// the extension on collision.
pub(crate) fn unique_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{}{}", stem, extension));
    let mut suffix = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}{}", stem, suffix, extension));
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "promptpal_writer_{}_{}",
            label,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn block(language: &str, lines: &[&str], functions: &[&str], classes: &[&str]) -> CodeBlock {
        CodeBlock {
            language: language.to_string(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
            functions: functions.iter().map(|s| s.to_string()).collect(),
            classes: classes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_writes_block_verbatim_with_trailing_newline() {
        let dir = scratch_dir("verbatim");
        let writer = CodeWriter::new(Some(dir.clone()), "2026-01-01_00-00-00");

        let path = writer
            .write_block(
                &block("python", &["def foo(x):", "    y = x + 1", "    return y"], &["foo"], &[]),
                1,
            )
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "def foo(x):\n    y = x + 1\n    return y\n");
        assert!(path.to_str().unwrap().ends_with(".py"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_base_name_prefers_longest_class() {
        let b = block("python", &["a", "b", "c"], &["much_longer_function"], &["widget"]);
        assert_eq!(select_base_name(&b), "widget");
    }

    #[test]
    fn test_base_name_falls_back_to_longest_function() {
        let b = block("python", &["a", "b", "c"], &["short", "much_longer"], &[]);
        assert_eq!(select_base_name(&b), "much_longer");
    }

    #[test]
    fn test_base_name_generic_fallback() {
        let b = block("python", &["a", "b", "c"], &[], &[]);
        assert_eq!(select_base_name(&b), "code");
    }

    #[test]
    fn test_leading_underscore_is_stripped() {
        let b = block("python", &["a", "b", "c"], &["_private_helper"], &[]);
        assert_eq!(select_base_name(&b), "private_helper");
    }

    #[test]
    fn test_collision_appends_numeric_suffix() {
        let dir = scratch_dir("collision");
        let writer = CodeWriter::new(Some(dir.clone()), "2026-01-01_00-00-00");
        let b = block("python", &["x = 1", "y = 2", "z = 3"], &["helper"], &[]);

        let first = writer.write_block(&b, 1).unwrap();
        let second = writer.write_block(&b, 1).unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
        assert!(second.to_str().unwrap().contains("_1"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_language_still_gets_extension() {
        let dir = scratch_dir("unknown_lang");
        let writer = CodeWriter::new(Some(dir.clone()), "2026-01-01_00-00-00");
        let b = CodeBlock {
            language: "zig".to_string(),
            lines: vec!["a".into(), "b".into(), "c".into()],
            functions: BTreeSet::new(),
            classes: BTreeSet::new(),
        };

        let path = writer.write_block(&b, 1).unwrap();
        assert!(path.to_str().unwrap().ends_with(".zig"));

        let _ = fs::remove_dir_all(&dir);
    }
}
