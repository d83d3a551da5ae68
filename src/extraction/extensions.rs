/// Maps a lowercase fence language tag to a file extension.
///
/// Unknown tags resolve to `".{tag}"` so that any freeform tag still
/// produces a usable filename. Never fails.
pub fn resolve(tag: &str) -> String {
    let known = match tag {
        "awk" => ".awk",
        "bash" => ".sh",
        "c" => ".c",
        "c++" => ".cpp",
        "csv" => ".csv",
        "cuda" => ".cu",
        "cython" => ".pyx",
        "go" => ".go",
        "groovy" => ".groovy",
        "html" => ".html",
        "java" => ".java",
        "javascript" => ".js",
        "json" => ".json",
        "julia" => ".jl",
        "markdown" => ".md",
        "matlab" => ".mat",
        "nextflow" => ".nf",
        "perl" => ".pl",
        "plaintext" => ".txt",
        "python" => ".py",
        "r" => ".r",
        "ruby" => ".rb",
        "rust" => ".rs",
        "shell" => ".sh",
        "sql" => ".sql",
        "text" => ".txt",
        "toml" => ".toml",
        "tsv" => ".tsv",
        "typescript" => ".ts",
        "xml" => ".xml",
        "xquery" => ".xquery",
        "yaml" => ".yml",
        _ => return format!(".{}", tag),
    };

    known.to_string()
}
