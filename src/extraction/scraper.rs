use regex::Regex;

/// Names pulled from a single line of code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedNames {
    pub function: Option<String>,
    pub class: Option<String>,
}

/// Languages the scraper has dedicated definition patterns for.
/// Everything else falls back to generic keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrapeLanguage {
    Python,
    JavaScript,
    R,
    Generic,
}

impl ScrapeLanguage {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "python" | "cython" => ScrapeLanguage::Python,
            "javascript" | "typescript" => ScrapeLanguage::JavaScript,
            "r" => ScrapeLanguage::R,
            _ => ScrapeLanguage::Generic,
        }
    }
}

/// Line-local identifier scraper for fenced code blocks.
///
/// This is a heuristic, not a parser: it only sees one line at a time and
/// has no brace or indentation awareness, so multi-line signatures are not
/// recognized. That limitation is intentional.
pub struct Scraper {
    function_patterns: Vec<Regex>,
    class_patterns: Vec<Regex>,
}

impl Scraper {
    /// Builds a scraper for the given fence language tag.
    pub fn for_tag(tag: &str) -> Self {
        let (function_sources, class_sources): (&[&str], &[&str]) =
            match ScrapeLanguage::from_tag(tag) {
                ScrapeLanguage::Python => (
                    &[r"def\s+(\w+)\s*\("],
                    &[r"class\s+(\w+)\s*[:(]"],
                ),
                ScrapeLanguage::JavaScript => (
                    &[
                        r"function\s+(\w+)\s*\(",
                        r"(?:const|let|var)\s+(\w+)\s*=.*=>",
                    ],
                    &[r"class\s+(\w+)\s*\{"],
                ),
                ScrapeLanguage::R => (&[r"(\w+)\s*<-\s*function\s*\("], &[]),
                ScrapeLanguage::Generic => (
                    &[r"(?:def|function)\s+(\w+)\s*\("],
                    &[r"class\s+(\w+)"],
                ),
            };

        Scraper {
            function_patterns: compile(function_sources),
            class_patterns: compile(class_sources),
        }
    }

    /// Attempts to pull a function or class name out of one line of code.
    pub fn scrape(&self, line: &str) -> ScrapedNames {
        ScrapedNames {
            function: first_capture(&self.function_patterns, line),
            class: first_capture(&self.class_patterns, line),
        }
    }
}

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .filter_map(|source| Regex::new(source).ok())
        .collect()
}

fn first_capture(patterns: &[Regex], line: &str) -> Option<String> {
    for pattern in patterns {
        if let Some(captures) = pattern.captures(line) {
            if let Some(raw) = captures.get(1) {
                let name = normalize(raw.as_str());
                if !is_placeholder(&name) {
                    return Some(name);
                }
            }
        }
    }
    None
}

/// Lower-cases a scraped identifier and collapses every run of
/// non-alphanumeric characters into a single underscore.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_was_separator = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            previous_was_separator = false;
        } else if !previous_was_separator {
            out.push('_');
            previous_was_separator = true;
        }
    }
    out
}

/// Degenerate names that say nothing about the block's content.
fn is_placeholder(name: &str) -> bool {
    name.is_empty() || matches!(name, "main" | "function" | "class")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_function_definition() {
        let scraper = Scraper::for_tag("python");
        let names = scraper.scrape("def parse_config(path):");
        assert_eq!(names.function.as_deref(), Some("parse_config"));
        assert_eq!(names.class, None);
    }

    #[test]
    fn test_python_class_definition() {
        let scraper = Scraper::for_tag("python");
        let names = scraper.scrape("class ConfigLoader(BaseLoader):");
        assert_eq!(names.class.as_deref(), Some("configloader"));
    }

    #[test]
    fn test_main_is_discarded() {
        let scraper = Scraper::for_tag("python");
        let names = scraper.scrape("def main():");
        assert_eq!(names.function, None);
    }

    #[test]
    fn test_javascript_arrow_assignment() {
        let scraper = Scraper::for_tag("javascript");
        let names = scraper.scrape("const fetchUsers = async (page) => {");
        assert_eq!(names.function.as_deref(), Some("fetchusers"));
    }

    #[test]
    fn test_javascript_named_function() {
        let scraper = Scraper::for_tag("javascript");
        let names = scraper.scrape("function renderTable(rows) {");
        assert_eq!(names.function.as_deref(), Some("rendertable"));
    }

    #[test]
    fn test_r_function_assignment() {
        let scraper = Scraper::for_tag("r");
        let names = scraper.scrape("plot_counts <- function(df) {");
        assert_eq!(names.function.as_deref(), Some("plot_counts"));
    }

    #[test]
    fn test_generic_language_uses_keyword_split() {
        let scraper = Scraper::for_tag("groovy");
        let names = scraper.scrape("def buildReport(items) {");
        assert_eq!(names.function.as_deref(), Some("buildreport"));
    }

    #[test]
    fn test_plain_line_yields_nothing() {
        let scraper = Scraper::for_tag("python");
        assert_eq!(scraper.scrape("    return x + 1"), ScrapedNames::default());
    }

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("My--Weird__Name"), "my_weird_name");
        assert_eq!(normalize("Already_fine"), "already_fine");
    }
}
