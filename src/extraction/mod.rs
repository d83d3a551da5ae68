mod extensions;
mod fence;
mod scraper;
mod writer;

pub use extensions::resolve;
pub use fence::{CodeBlock, parse_blocks};
pub use scraper::{ScrapedNames, Scraper};
pub use writer::CodeWriter;

pub(crate) use writer::unique_path;

use std::path::PathBuf;

/// Extracts every qualifying code block from a response and writes each one
/// to disk in encounter order with a strictly increasing counter.
///
/// A write failure is fatal for that block only; the remaining blocks are
/// still written. Returns the paths that were written, possibly empty.
pub fn extract_and_save(response: &str, writer: &CodeWriter) -> Vec<PathBuf> {
    let mut written = Vec::new();

    for (index, block) in parse_blocks(response).iter().enumerate() {
        let counter = index + 1;
        match writer.write_block(block, counter) {
            Ok(path) => written.push(path),
            Err(e) => eprintln!("✗ Failed to save code block {}: {}", counter, e),
        }
    }

    written
}
