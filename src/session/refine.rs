use std::collections::BTreeSet;

use crate::api::{ApiError, ChatMessage, CompletionClient, CompletionRequest};
use crate::usage::TokenUsage;

use super::condense::condense_iterations;

/// Fixed instruction prefixed to every refinement request.
const REFINE: &str = "\
Your primary task is to refine or improve the following user prompt.
Do not respond directly to the provided request.
Refined prompt text should be at least four sentences long.
If there is any special formatting contained in the prompt, ensure it is included in the refined response.
Provide example code in refined queries when refactored code is requested.
Only use the refinement instructions below in crafting a new higher quality prompt.
Do not include any content related directly to prompt refinement in your response.
Your response should be formatted as another user request; any instance of 'I' needs to be updated to 'you should'.
";

/// Sampling temperature for refinement, nudged up for response diversity.
const REFINE_TEMPERATURE: f32 = 0.7;

/// Directives applied to every refinement regardless of prompt content.
const DEFAULT_DIRECTIVES: [&str; 2] = ["expand", "amplify"];

/// Fixed vocabulary of rewrite directives matched against prompt words.
const DIRECTIVES: &[(&str, &str)] = &[
    ("paraphrase", "Rewrite the text to express the same meaning in different words to avoid plagiarism or duplicate phrasing."),
    ("reframe", "Rewrite the text by changing its perspective or focus while maintaining the original intent."),
    ("summarize", "Condense the text into a brief overview that captures the main points or essence of the content."),
    ("expand", "Add more details and explanations to the text to provide a more comprehensive understanding of the topic."),
    ("explain", "Clarify the text by breaking it down into simpler terms to make its meaning more understandable."),
    ("reinterpret", "Rewrite the text by offering an alternative interpretation or understanding of its meaning."),
    ("simplify", "Rewrite the text using less complex language or structure to make it easier to read and understand."),
    ("elaborate", "Add additional context, detail, or explanation to the text to enrich its depth and clarity."),
    ("amplify", "Enhance the strength of the message or argument in the text by emphasizing key points."),
    ("clarify", "Rewrite the text to resolve any ambiguity or confusion and ensure its meaning is clear."),
    ("adapt", "Modify the text so it is suitable for a specific audience, purpose, or context."),
    ("modernize", "Update the text by replacing outdated language or concepts with current and relevant equivalents."),
    ("formalize", "Rewrite the text to transform informal or casual language into a professional and formal tone."),
    ("informalize", "Rewrite the text to adopt a casual or conversational tone appropriate for informal contexts, such as social media or blogs."),
    ("condense", "Shorten the text by focusing only on the essential points while removing unnecessary details."),
    ("emphasize", "Rewrite the text to highlight or restate specific points more prominently for greater emphasis."),
    ("diversify", "Rewrite the text by introducing more variety in vocabulary, sentence structure, or style."),
    ("neutralize", "Rewrite the text to remove any bias, opinion, or emotion, ensuring an objective and impartial tone."),
    ("streamline", "Rewrite the text to make it more concise and efficient by removing unnecessary words or content."),
    ("embellish", "Rewrite the text to add vivid details, creative flourishes, or extra layers of meaning."),
    ("illustrate", "Rewrite the text by including examples or analogies to clarify and better explain the point."),
    ("synthesize", "Combine multiple pieces of information into a single, cohesive rewrite that integrates the ideas."),
    ("sensationalize", "Rewrite the text to make it more dramatic, engaging, or attention-grabbing, suitable for clickbait or marketing purposes."),
    ("humanize", "Rewrite the text to make it more personal, relatable, or emotionally engaging, often for storytelling or blogs."),
    ("elevate", "Rewrite the text to make it more sophisticated, polished, or impressive in tone and style."),
    ("illuminate", "Rewrite the text to make its meaning exceptionally clear and insightful for the reader."),
    ("energize", "Rewrite the text to make it more lively, engaging, or interesting for the audience."),
    ("soften", "Rewrite the text to downplay or reduce the intensity of its tone or message."),
    ("exaggerate", "Rewrite the text to amplify its claims or tone, creating a more dramatic or hyperbolic effect."),
    ("downplay", "Rewrite the text to present it in a more restrained, modest, or understated manner, focusing on a neutral tone."),
];

fn directive_sentence(keyword: &str) -> Option<&'static str> {
    DIRECTIVES
        .iter()
        .find(|(key, _)| *key == keyword)
        .map(|(_, sentence)| *sentence)
}

/// Scans the prompt's words against the directive vocabulary.
///
/// Words are lower-cased and stripped of punctuation before matching; the
/// default directive subset is always included in the result.
pub fn match_directives(prompt: &str) -> BTreeSet<&'static str> {
    let mut matched: BTreeSet<&'static str> = DEFAULT_DIRECTIVES.into_iter().collect();

    for word in prompt.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_lowercase();

        if let Some(&(key, _)) = DIRECTIVES.iter().find(|(k, _)| *k == cleaned) {
            matched.insert(key);
        }
    }

    matched
}

/// One instruction sentence per matched directive, one per line.
pub fn directive_block(directives: &BTreeSet<&'static str>) -> String {
    directives
        .iter()
        .filter_map(|keyword| directive_sentence(keyword))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites the user prompt through the completion capability before the
/// primary request is sent.
///
/// The matched directive sentences are folded into the refinement
/// instruction; with more than one iteration the resulting completions are
/// condensed into a single refined prompt.
pub async fn refine_prompt<C: CompletionClient>(
    client: &C,
    model: &str,
    seed: i64,
    iterations: u32,
    role_prompt: &str,
    prompt: &str,
) -> Result<(String, TokenUsage), ApiError> {
    let directives = match_directives(prompt);
    let instruction = format!("{}{}\n\n{}", REFINE, directive_block(&directives), prompt);

    let request = CompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(role_prompt),
            ChatMessage::user(instruction),
        ],
        n: iterations.max(1),
        seed,
        temperature: Some(REFINE_TEMPERATURE),
    };

    let completion = client.submit(request).await?;
    let mut usage = completion.usage;

    if completion.choices.len() > 1 {
        let (condensed, spent) =
            condense_iterations(client, model, seed, role_prompt, &completion.choices).await?;
        usage.add(spent);
        Ok((condensed, usage))
    } else {
        let text = completion.choices.into_iter().next().unwrap_or_default();
        Ok((text, usage))
    }
}
