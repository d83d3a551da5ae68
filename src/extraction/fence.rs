use std::collections::BTreeSet;

use super::scraper::Scraper;

const FENCE_MARKER: &str = "```";

/// A fenced code block isolated from a model response.
///
/// Constructed fresh when a fence opens and populated line by line while the
/// parser is inside the block. Ordered name sets keep longest-name selection
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Lowercase language tag taken from the opening fence line.
    pub language: String,
    /// Block content, verbatim, without the fence lines.
    pub lines: Vec<String>,
    /// Function names scraped from the block.
    pub functions: BTreeSet<String>,
    /// Class names scraped from the block.
    pub classes: BTreeSet<String>,
}

impl CodeBlock {
    fn new(language: String) -> Self {
        Self {
            language,
            lines: Vec::new(),
            functions: BTreeSet::new(),
            classes: BTreeSet::new(),
        }
    }
}

/// Scans a response line by line and returns its fenced code blocks in
/// encounter order.
///
/// A line whose trimmed content starts with three backticks toggles the
/// parser between outside and inside a block. On open, the remainder of the
/// fence line (lower-cased, first whitespace token) becomes the language tag.
/// On close, the block is kept only if it accumulated more than two lines;
/// shorter blocks are dropped as accidental fencing. A fence left dangling at
/// end of input discards its buffer rather than erroring.
pub fn parse_blocks(response: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(CodeBlock, Scraper)> = None;

    for line in response.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with(FENCE_MARKER) {
            match current.take() {
                Some((block, _)) => {
                    if block.lines.len() > 2 {
                        blocks.push(block);
                    }
                }
                None => {
                    let tag = fence_language_tag(trimmed);
                    let scraper = Scraper::for_tag(&tag);
                    current = Some((CodeBlock::new(tag), scraper));
                }
            }
        } else if let Some((block, scraper)) = current.as_mut() {
            block.lines.push(line.to_string());
            let names = scraper.scrape(line);
            if let Some(function) = names.function {
                block.functions.insert(function);
            }
            if let Some(class) = names.class {
                block.classes.insert(class);
            }
        }
    }

    blocks
}

/// First whitespace-delimited token after the fence marker, lower-cased.
fn fence_language_tag(fence_line: &str) -> String {
    fence_line
        .trim_start_matches('`')
        .to_lowercase()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fences_yields_no_blocks() {
        let response = "Just prose.\nNothing else here.";
        assert!(parse_blocks(response).is_empty());
    }

    #[test]
    fn test_single_block_with_language_tag() {
        let response = "Here:\n```python\ndef foo(x):\n    y = x + 1\n    return y\n```\nDone.";
        let blocks = parse_blocks(response);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "python");
        assert_eq!(
            blocks[0].lines,
            vec!["def foo(x):", "    y = x + 1", "    return y"]
        );
        assert!(blocks[0].functions.contains("foo"));
    }

    #[test]
    fn test_short_block_is_dropped() {
        let response = "```python\nx = 1\ny = 2\n```";
        assert!(parse_blocks(response).is_empty());
    }

    #[test]
    fn test_blocks_emerge_in_encounter_order() {
        let response = concat!(
            "```python\na = 1\nb = 2\nc = 3\n```\n",
            "between\n",
            "```javascript\nlet a = 1;\nlet b = 2;\nlet c = 3;\n```\n",
        );
        let blocks = parse_blocks(response);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "python");
        assert_eq!(blocks[1].language, "javascript");
    }

    #[test]
    fn test_unterminated_fence_discards_buffer() {
        let response = "```python\ndef foo():\n    pass\n    # never closed";
        assert!(parse_blocks(response).is_empty());
    }

    #[test]
    fn test_prose_outside_blocks_is_ignored() {
        let response = "def not_in_a_block():\n```python\na = 1\nb = 2\nc = 3\n```";
        let blocks = parse_blocks(response);

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].functions.is_empty());
    }

    #[test]
    fn test_indented_fence_still_toggles() {
        let response = "  ```bash\necho one\necho two\necho three\n  ```";
        let blocks = parse_blocks(response);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "bash");
    }

    #[test]
    fn test_tag_takes_first_token_only() {
        let response = "```python copy\na = 1\nb = 2\nc = 3\n```";
        let blocks = parse_blocks(response);

        assert_eq!(blocks[0].language, "python");
    }

    #[test]
    fn test_scraped_names_collect_into_sets() {
        let response = concat!(
            "```python\n",
            "class Widget:\n",
            "    def render(self):\n",
            "        pass\n",
            "    def update(self):\n",
            "        pass\n",
            "```\n",
        );
        let blocks = parse_blocks(response);

        assert!(blocks[0].classes.contains("widget"));
        assert!(blocks[0].functions.contains("render"));
        assert!(blocks[0].functions.contains("update"));
    }
}
