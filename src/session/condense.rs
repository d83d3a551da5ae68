use crate::api::{ApiError, ChatMessage, CompletionClient, CompletionRequest};
use crate::usage::TokenUsage;

/// Fixed instruction prefixed to the iteration synthesis prompt.
const CONDENSE: &str = "\
Your task is to refine and synthesize all of the following text provided into a single cohesive response.
The subject and theme of your response should remain the same as the input text.
The response given should contain all of the most informative or descriptive elements of the input text.
If there is any special formatting contained in the input text, make sure it is preserved in the response.
Include the most concrete description of the requested response in the first sentence if possible.";

/// Merges N response iterations into a single answer via one synthesis call.
///
/// A single response is returned unchanged with no API round-trip. A submit
/// failure fails the condensation as a whole; there is no partial synthesis.
pub async fn condense_iterations<C: CompletionClient>(
    client: &C,
    model: &str,
    seed: i64,
    role_prompt: &str,
    responses: &[String],
) -> Result<(String, TokenUsage), ApiError> {
    if responses.len() <= 1 {
        let text = responses.first().cloned().unwrap_or_default();
        return Ok((text, TokenUsage::default()));
    }

    let iteration_block = render_iterations(responses);
    let request = CompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(role_prompt),
            ChatMessage::user(format!("{}\n\n{}", CONDENSE, iteration_block)),
        ],
        n: 1,
        seed,
        temperature: None,
    };

    let completion = client.submit(request).await?;
    let text = completion.choices.into_iter().next().unwrap_or_default();

    Ok((text, completion.usage))
}

/// Labels each response "Iteration: i" (1-based) and joins the blocks with
/// blank lines.
fn render_iterations(responses: &[String]) -> String {
    responses
        .iter()
        .enumerate()
        .map(|(index, response)| format!("Iteration: {}\n{}", index + 1, response))
        .collect::<Vec<_>>()
        .join("\n\n")
}
