//! Request lifecycle: prompt preparation, submission, iteration
//! condensation, code extraction, and transcript logging.

mod condense;
mod refine;
mod scan;

pub use condense::condense_iterations;
pub use refine::{directive_block, match_directives, refine_prompt};
pub use scan::append_file_contents;

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use sha2::{Digest, Sha256};

use crate::api::{
    ApiError, ChatMessage, CompletionClient, CompletionRequest, ImageClient, ImageRequest,
    is_image_model, select_model,
};
use crate::extraction::{CodeWriter, extract_and_save, unique_path};
use crate::roles::{self, Role, RoleRegistry};
use crate::usage::{TokenUsage, cost_report};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const LOGS_DIR: &str = "logs";
const IMAGES_DIR: &str = "images";

/// Errors raised while serving a request.
#[derive(Debug)]
pub enum SessionError {
    Api(ApiError),
    Io(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::Api(e) => write!(f, "{}", e),
            SessionError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ApiError> for SessionError {
    fn from(e: ApiError) -> Self {
        SessionError::Api(e)
    }
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        SessionError::Io(e)
    }
}

/// Knobs for a session, mirroring the CLI surface.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub model: String,
    pub role: String,
    pub refine: bool,
    pub chain_of_thought: bool,
    pub save_code: bool,
    pub scan_files: bool,
    pub unit_tests: bool,
    pub logging: bool,
    pub verbose: bool,
    pub iterations: u32,
    pub seed: String,
    pub dimensions: String,
    pub quality: String,
    /// Output directory for extracted code (defaults to "code").
    pub code_dir: Option<PathBuf>,
    /// Output directory for transcripts (defaults to "logs").
    pub log_dir: Option<PathBuf>,
    /// Output directory for generated images (defaults to "images").
    pub image_dir: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            role: roles::default_role().to_string(),
            refine: false,
            chain_of_thought: false,
            save_code: false,
            scan_files: false,
            unit_tests: false,
            logging: false,
            verbose: false,
            iterations: 1,
            seed: "42".to_string(),
            dimensions: "1024x1024".to_string(),
            quality: "standard".to_string(),
            code_dir: None,
            log_dir: None,
            image_dir: None,
        }
    }
}

/// What a served request produced.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// The final (possibly condensed) response text, or the image summary.
    pub message: String,
    /// Files written as a side effect, in write order.
    pub written_files: Vec<PathBuf>,
}

/// One assistant session: a resolved role, a validated model, and running
/// token totals, serving requests through an injected completion capability.
pub struct Session<C> {
    client: C,
    options: SessionOptions,
    role: Role,
    model: String,
    seed: i64,
    timestamp: String,
    prefix: String,
    usage: TokenUsage,
    transcript: Vec<String>,
}

impl<C: CompletionClient + ImageClient> Session<C> {
    pub fn new(client: C, options: SessionOptions) -> Self {
        let role = RoleRegistry::default().resolve(&options.role);
        let mut model = select_model(&options.model);
        if role.image && !is_image_model(&model) {
            model = "dall-e-3".to_string();
        }

        let seed = derive_seed(&options.seed);
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let prefix = format!("{}.{}.{}", role.label, model.replace('-', "_"), timestamp);

        Self {
            client,
            options,
            role,
            model,
            seed,
            timestamp,
            prefix,
            usage: TokenUsage::default(),
            transcript: Vec::new(),
        }
    }

    /// Total token usage accumulated so far.
    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    /// Serves one request end to end.
    ///
    /// Text requests run scan -> refine -> submit -> condense -> extract;
    /// image roles route to the image endpoint instead. Upstream API errors
    /// propagate unchanged.
    pub async fn request(&mut self, prompt: &str) -> Result<RequestOutcome, SessionError> {
        let original = prompt.to_string();
        let mut working = if self.options.scan_files {
            append_file_contents(prompt)
        } else {
            prompt.to_string()
        };

        let status = self.status_report();
        self.emit(&status);

        if self.role.image {
            return self.request_image(&working).await;
        }

        if self.options.refine {
            self.emit("\nRefining user prompt...");
            let (refined, spent) = refine_prompt(
                &self.client,
                &self.model,
                self.seed,
                self.options.iterations,
                &self.role.prompt,
                &working,
            )
            .await?;
            self.usage.add(spent);
            let note = format!("\nRefined query prompt:\n{}", refined);
            self.emit(&note);
            working = refined;
        }

        let mut system_prompt = self.role.prompt.clone();
        if self.options.chain_of_thought {
            system_prompt.push_str(roles::CHAIN_OF_THOUGHT);
        }
        if self.options.unit_tests {
            working = format!("{}\n{}", roles::UNIT_TESTS, working);
        }

        // A refined refactor/rewrite request gets the preserved original
        // appended back so the model still sees the code being improved.
        if self.options.refine {
            let lowered = working.to_lowercase();
            if (lowered.contains("refactor") || lowered.contains("rewrite"))
                && !original.trim().is_empty()
            {
                working.push_str("\n\nImprove the following:\n");
                working.push_str(&original);
            }
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::user(working),
                ChatMessage::system(system_prompt),
            ],
            n: self.options.iterations.max(1),
            seed: self.seed,
            temperature: None,
        };

        let completion = self.client.submit(request).await?;
        self.usage.add(completion.usage);

        let message = if completion.choices.len() > 1 {
            let (condensed, spent) = condense_iterations(
                &self.client,
                &self.model,
                self.seed,
                &self.role.prompt,
                &completion.choices,
            )
            .await?;
            self.usage.add(spent);
            condensed
        } else {
            completion.choices.into_iter().next().unwrap_or_default()
        };

        self.emit(&message);
        if !self.options.verbose {
            println!("{}", message);
        }

        let mut written_files = Vec::new();
        if self.options.save_code {
            let writer = CodeWriter::new(self.options.code_dir.clone(), self.timestamp.clone());
            written_files = extract_and_save(&message, &writer);
            if !written_files.is_empty() {
                let listing = written_files
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join("\n\t");
                let note = format!(
                    "\nCode extracted from response text and saved to:\n\t{}",
                    listing
                );
                self.emit(&note);
            }
        }

        let report = cost_report(&self.model, &self.usage);
        self.emit(&report);
        self.flush_transcript()?;

        Ok(RequestOutcome {
            message,
            written_files,
        })
    }

    async fn request_image(&mut self, prompt: &str) -> Result<RequestOutcome, SessionError> {
        let (size, quality) =
            validate_image_params(&self.options.dimensions, &self.options.quality, &self.model);
        let quality = if self.role.label == "photographer" {
            "hd".to_string()
        } else {
            quality
        };

        let output = self
            .client
            .generate_image(ImageRequest {
                model: self.model.clone(),
                prompt: prompt.to_string(),
                size,
                quality,
            })
            .await?;

        let images_dir = self
            .options
            .image_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(IMAGES_DIR));
        fs::create_dir_all(&images_dir)?;
        let image_file = images_dir.join(format!("{}.image.png", self.prefix));
        fs::write(&image_file, &output.bytes)?;

        let message = format!(
            "Revised image prompt:\n{}\nGenerated image saved to: {}",
            output.revised_prompt,
            image_file.display()
        );
        self.emit(&message);
        if !self.options.verbose {
            println!("{}", message);
        }
        self.flush_transcript()?;

        Ok(RequestOutcome {
            message,
            written_files: vec![image_file],
        })
    }

    fn status_report(&self) -> String {
        let mut status = format!(
            "System parameters:\n    Model: {}\n    Role: {}\n    Chain-of-thought: {}\n    Prompt refinement: {}\n    Response iterations: {}\n    Time stamp: {}\n    Seed: {}\n    Text logging: {}\n    Snippet logging: {}",
            self.model,
            self.role.name,
            self.options.chain_of_thought,
            self.options.refine,
            self.options.iterations,
            self.timestamp,
            self.seed,
            self.options.logging,
            self.options.save_code,
        );
        if is_image_model(&self.model) {
            status.push_str(&format!(
                "\n    Image dimensions: {}\n    Image quality: {}",
                self.options.dimensions, self.options.quality
            ));
        }
        status
    }

    /// Prints when verbose and buffers for the transcript when logging.
    fn emit(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        if self.options.verbose {
            println!("{}", message);
        }
        if self.options.logging {
            self.transcript.push(message.to_string());
        }
    }

    fn flush_transcript(&mut self) -> io::Result<()> {
        if !self.options.logging || self.transcript.is_empty() {
            return Ok(());
        }

        let dir = self
            .options
            .log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(LOGS_DIR));
        fs::create_dir_all(&dir)?;

        let stem = format!("{}.transcript", self.prefix);
        let path = unique_path(&dir, &stem, ".log");

        let mut content = String::from("New session initiated.\n");
        content.push_str(&self.transcript.join("\n"));
        content.push('\n');
        fs::write(&path, content)?;

        self.transcript.clear();
        Ok(())
    }
}

/// Reduces a seed argument to an integer: numeric strings pass through,
/// anything else hashes to a stable non-negative value.
pub fn derive_seed(seed: &str) -> i64 {
    if let Ok(numeric) = seed.trim().parse::<i64>() {
        return numeric;
    }

    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(bytes) >> 1) as i64
}

/// Clamps image dimensions to the model's supported sizes and normalizes
/// the quality flag.
fn validate_image_params(dimensions: &str, quality: &str, model: &str) -> (String, String) {
    let valid: &[&str] = match model {
        "dall-e-3" => &["1024x1024", "1792x1024", "1024x1792"],
        "dall-e-2" => &["1024x1024", "512x512", "256x256"],
        _ => &[],
    };

    let lowered = dimensions.to_lowercase();
    let size = if !valid.is_empty() && !valid.contains(&lowered.as_str()) {
        "1024x1024".to_string()
    } else {
        lowered
    };

    let quality = match quality.to_lowercase().as_str() {
        "h" | "hd" | "high" | "higher" | "highest" => "hd",
        _ => "standard",
    };

    (size, quality.to_string())
}
