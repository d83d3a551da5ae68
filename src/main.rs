use anyhow::{Context, Result};
use clap::Parser;

use promptpal::api::{OpenAiClient, select_model};
use promptpal::{Session, SessionOptions};

#[derive(Parser)]
#[command(name = "promptpal")]
#[command(about = "A personal CLI assistant backed by hosted LLM APIs", long_about = None)]
struct Cli {
    #[arg(help = "The prompt to submit", trailing_var_arg = true, required = true)]
    prompt: Vec<String>,

    #[arg(
        long,
        default_value = "assistant",
        help = "Role shortcut, roles.yml label, or custom system prompt text"
    )]
    role: String,

    #[arg(long, default_value = "gpt-4o-mini", help = "Target model")]
    model: String,

    #[arg(long, help = "Refine the prompt before the primary request")]
    refine: bool,

    #[arg(long, help = "Append chain-of-thought instructions to the system prompt")]
    chain_of_thought: bool,

    #[arg(
        long,
        help = "Extract fenced code blocks from the response and save them under code/"
    )]
    save_code: bool,

    #[arg(
        long,
        help = "Scan the prompt for existing files and append their contents"
    )]
    scan_files: bool,

    #[arg(long, help = "Prepend unit-testing instructions to the prompt")]
    unit_tests: bool,

    #[arg(
        long,
        default_value_t = 1,
        help = "Number of response iterations to request"
    )]
    iterations: u32,

    #[arg(
        long,
        default_value = "42",
        help = "Reproducibility seed (integer or seed word)"
    )]
    seed: String,

    #[arg(
        long,
        default_value = "1024x1024",
        help = "Image dimensions for image roles"
    )]
    dimensions: String,

    #[arg(
        long,
        default_value = "standard",
        help = "Image quality for image roles"
    )]
    quality: String,

    #[arg(long, help = "Write a session transcript under logs/")]
    log: bool,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let prompt = cli.prompt.join(" ");

    let model = select_model(&cli.model);
    let client =
        OpenAiClient::for_model(&model).context("Failed to initialize the API client")?;

    let options = SessionOptions {
        model,
        role: cli.role,
        refine: cli.refine,
        chain_of_thought: cli.chain_of_thought,
        save_code: cli.save_code,
        scan_files: cli.scan_files,
        unit_tests: cli.unit_tests,
        logging: cli.log,
        verbose: cli.verbose,
        iterations: cli.iterations.max(1),
        seed: cli.seed,
        dimensions: cli.dimensions,
        quality: cli.quality,
        ..SessionOptions::default()
    };

    let mut session = Session::new(client, options);
    session
        .request(&prompt)
        .await
        .context("Request could not be completed")?;

    Ok(())
}
