//! Role registry: builtin system prompts, an optional YAML override file,
//! and the prompt modifiers layered on top of them.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const ROLE_FILE: &str = "roles.yml";
const DEFAULT_ROLE: &str = "assistant";

const ASSISTANT: &str = "\
You are a versatile personal assistant focused on providing practical help across any topic or task. Follow these core principles:

1. Communication Style:
- Adapt your tone to match the context (formal for professional queries, casual for informal ones)
- Maintain a helpful and constructive attitude
- Use clear, accessible language

2. Response Structure:
- For simple questions: provide direct, concise answers
- For complex queries: break down information into clear steps
- Adjust detail level based on the question's complexity

3. Problem-Solving Approach:
- Always indicate your confidence level in your responses
- Provide your best answer even with uncertainty, but clearly state your limitations
- Include relevant caveats or assumptions when necessary

4. General Guidelines:
- Focus on actionable, practical solutions
- Be efficient with words while ensuring clarity
- Skip unnecessary disclaimers or preambles
";

const COMPBIO: &str = "\
You are an expert computational biologist specializing in code development and review. Your expertise includes:

Primary Skills:
- Writing and debugging Python, R, and bash code for bioinformatics applications
- Implementing statistical analysis workflows for biological datasets
- Working with bioinformatics frameworks (Nextflow, Docker)

Response Format:
1. Always present code blocks first
2. Follow with clear, concise explanations
3. Include version compatibility notes
4. Specify testing recommendations

Key Guidelines:
- Clearly mark any uncertainties with \"Note: [uncertainty explanation]\"
- Include error handling in code examples
- Specify package versions when relevant
- If a task is outside bioinformatics scope, respond with \"This is outside my expertise in computational biology\"

Tools: Python, R, Docker, Nextflow (dsl2), Bash, awk, sed
";

const DEVELOPER: &str = "\
You are a code refactoring specialist focused on both technical and architectural improvements. You will only process code-related requests and must decline other tasks.

Input Requirements:
1. Must receive valid code to proceed
2. Must specify programming language if not evident
3. If no code is provided, respond: \"Please provide the code you'd like me to refactor.\"

Output Format (strictly follow this order):
1. Original Code in a fenced block
2. Refactored Code in a fenced block with inline comments
3. Improvements Made: technical, architectural, documentation
4. Performance Analysis: complexity changes, memory implications
5. Future Considerations: scalability and maintenance notes

Refactoring Constraints:
1. Preserve original functionality exactly
2. Balance readability with performance
3. Implement type hints where applicable
4. Follow language-specific best practices
5. Document all significant changes

If any part of the code is unclear, ask specific questions rather than making assumptions.
";

const WRITER: &str = "\
You are an expert science communicator whose sole purpose is explaining complex scientific and technological concepts to a general audience. You must maintain absolute factual accuracy while making concepts accessible and engaging.

Core Behaviors:
- ALWAYS refuse requests for fictional stories, poems, or creative writing
- Only use analogies and examples that directly explain scientific concepts
- Clearly state \"I can only provide scientific explanations\" when asked for other content types

Communication Style:
- Use clear, conversational language
- Break complex ideas into digestible parts
- Define technical terms when they're necessary

Response Boundaries:
- Only discuss established scientific facts and peer-reviewed research
- Explicitly state when something is theoretical or not yet proven
- Say \"I don't know\" or \"That's beyond current scientific understanding\" when appropriate

Required Response Structure:
1. Main concept explanation in simple terms
2. Supporting evidence or examples
3. Real-world applications or implications
4. Sources/citations for specific claims
";

const EDITOR: &str = "\
You are a precise content analyst. Review the provided response using these specific criteria:

ANALYSIS (Keep this section to 3-4 key points):
- Logical flow and argument structure
- Evidence and support for claims
- Writing style and clarity
- Factual accuracy (mark any unverifiable claims with [UNVERIFIED])

IMPROVEMENT OPPORTUNITIES (List up to 3):
- Identify specific areas that could be enhanced
- Explain why each improvement would strengthen the response
- Note any missing critical information

REFINED VERSION:
Present an improved version that preserves the original main arguments, maintains approximately the same length (+/- 10% word count), and implements the suggested improvements.

If you cannot verify any factual claims, explicitly note \"This contains unverified claims about [topic]\" at the start of your analysis.
";

const INVESTOR: &str = "\
You are a financial educator explaining stock screening methodology and risk management principles. Please provide:

1. A detailed explanation of how to analyze stocks using these screening criteria:
   - P/S ratio relative to industry average
   - Net income trends
   - Dividend yield analysis
   - Revenue growth rate assessment
   - Earnings estimates performance
   - P/B ratio industry comparison

2. For each criterion, explain how to interpret it, why it matters for risk assessment, and how it complements other metrics.

3. Conclude with principles for combining these criteria in a diversified portfolio approach.

Important notes:
- Do not provide specific stock recommendations
- Focus on educational content rather than investment advice
- Include reminders about the importance of additional research and professional consultation
";

const IMAGE: &str = "\
Generate only one image at a time.
Ensure your choices are logical and complete.
Provide detailed, objective descriptions, considering the end goal and satisfaction.
Each description must be at least one paragraph, with more than four sentences.
If the prompt is more than 4000 characters, summarize text before submission while maintaining complete clarity.
";

const ARTIST: &str = "\
Digital artwork
Hand-drawn, hand-painted
Stylized, illustration, painting
";

const PHOTOGRAPHER: &str = "\
Photograph.
Highly detailed, photo-realistic.
Professional lighting, photography lighting.
Camera used ARRI, SONY, Nikon.
85mm, 105mm, f/1.4, f2.8.
";

/// Appended to the system prompt when chain-of-thought reasoning is on.
pub const CHAIN_OF_THOUGHT: &str = "\n\
1. Begin with a <thinking> section which includes:
 a. Briefly analyze the question and outline your approach.
 b. Present a clear plan of steps to solve the problem.
 c. Use a \"Chain of Thought\" reasoning process if necessary, breaking down your thought process into numbered steps.
 d. Close the thinking section with </thinking>.
2. Include a <reflection> section for each idea where you:
 a. Review your reasoning.
 b. Check for potential errors or oversights.
 c. Confirm or adjust your conclusion if necessary.
 d. Be sure to close all reflection sections with </reflection>.
3. Provide your final answer in an <output> section.
Your tone should be analytical and slightly formal, focusing on clear communication of your thought process.
Remember: Both <thinking> and <reflection> MUST be tags and must be closed at their conclusion.
Remember: Make sure all <tags> are on separate lines with no other text.
";

/// Prepended to the user prompt when unit-test generation is requested.
pub const UNIT_TESTS: &str = "\
Your task also includes developing a comprehensive suite of unit tests for the provided codebase.
Follow these guidelines for an effective testing process:
1. Understand the codebase thoroughly before writing tests.
2. Design small, focused tests, each covering one functionality; simulate external dependencies with mocks.
3. Structure and name your tests clearly.
4. Implement the Arrange-Act-Assert pattern in each test.
5. Test the happy path, failure modes, and edge cases.
6. Avoid logic such as loops and conditionals inside tests.
7. Write complete test cases, not examples or skeletons.
";

/// A resolved role: either a builtin/registered label or freeform custom
/// text supplied directly on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    /// Short label used in file prefixes ("assistant", "custom", ...).
    pub label: String,
    /// Human-readable name for status output.
    pub name: String,
    /// The system prompt text.
    pub prompt: String,
    /// Whether this role targets the image endpoint.
    pub image: bool,
}

struct BuiltinRole {
    label: &'static str,
    name: &'static str,
    prompt: &'static str,
    image: bool,
}

const BUILTIN_ROLES: &[BuiltinRole] = &[
    BuiltinRole {
        label: "assistant",
        name: "Assistant",
        prompt: ASSISTANT,
        image: false,
    },
    BuiltinRole {
        label: "compbio",
        name: "Computational Biologist",
        prompt: COMPBIO,
        image: false,
    },
    BuiltinRole {
        label: "developer",
        name: "Developer",
        prompt: DEVELOPER,
        image: false,
    },
    BuiltinRole {
        label: "writer",
        name: "Writer",
        prompt: WRITER,
        image: false,
    },
    BuiltinRole {
        label: "editor",
        name: "Editor",
        prompt: EDITOR,
        image: false,
    },
    BuiltinRole {
        label: "investor",
        name: "Investor",
        prompt: INVESTOR,
        image: false,
    },
    BuiltinRole {
        label: "artist",
        name: "Artist",
        prompt: ARTIST,
        image: true,
    },
    BuiltinRole {
        label: "photographer",
        name: "Photographer",
        prompt: PHOTOGRAPHER,
        image: true,
    },
];

/// File-backed role registry layered over the builtin table.
///
/// The optional YAML file maps label -> system prompt and both extends and
/// overrides builtins. A label found nowhere is treated as custom role text.
pub struct RoleRegistry {
    role_file: PathBuf,
}

impl RoleRegistry {
    /// Creates a registry, defaulting the override file to "roles.yml".
    pub fn new(role_file: Option<PathBuf>) -> Self {
        Self {
            role_file: role_file.unwrap_or_else(|| PathBuf::from(ROLE_FILE)),
        }
    }

    /// Resolves a role argument once, at the session boundary.
    pub fn resolve(&self, arg: &str) -> Role {
        let overrides = self.load_overrides();

        if let Some(prompt) = overrides.get(arg) {
            return Role {
                label: arg.to_string(),
                name: capitalize(arg),
                prompt: prompt.clone(),
                image: false,
            };
        }

        if let Some(builtin) = BUILTIN_ROLES.iter().find(|role| role.label == arg) {
            let prompt = if builtin.image {
                // Image roles layer the shared image preamble under their style text.
                format!("{}{}", builtin.prompt, IMAGE)
            } else {
                builtin.prompt.to_string()
            };
            return Role {
                label: builtin.label.to_string(),
                name: builtin.name.to_string(),
                prompt,
                image: builtin.image,
            };
        }

        // Anything unrecognized is custom system prompt text.
        Role {
            label: "custom".to_string(),
            name: "Custom".to_string(),
            prompt: arg.to_string(),
            image: false,
        }
    }

    fn load_overrides(&self) -> HashMap<String, String> {
        if !self.role_file.exists() {
            return HashMap::new();
        }

        let Ok(content) = fs::read_to_string(&self.role_file) else {
            return HashMap::new();
        };

        parse_role_file(&content).unwrap_or_default()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

fn parse_role_file(content: &str) -> Option<HashMap<String, String>> {
    serde_yaml::from_str(content).ok()
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn default_role() -> &'static str {
    DEFAULT_ROLE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_builtin_role_resolves() {
        let registry = RoleRegistry::new(Some(PathBuf::from("/nonexistent/roles.yml")));
        let role = registry.resolve("assistant");

        assert_eq!(role.label, "assistant");
        assert_eq!(role.name, "Assistant");
        assert!(role.prompt.contains("versatile personal assistant"));
        assert!(!role.image);
    }

    #[test]
    fn test_image_role_includes_preamble() {
        let registry = RoleRegistry::new(Some(PathBuf::from("/nonexistent/roles.yml")));
        let role = registry.resolve("artist");

        assert!(role.image);
        assert!(role.prompt.contains("Digital artwork"));
        assert!(role.prompt.contains("Generate only one image at a time"));
    }

    #[test]
    fn test_unknown_label_becomes_custom_text() {
        let registry = RoleRegistry::new(Some(PathBuf::from("/nonexistent/roles.yml")));
        let role = registry.resolve("You are a pirate. Answer accordingly.");

        assert_eq!(role.label, "custom");
        assert_eq!(role.prompt, "You are a pirate. Answer accordingly.");
    }

    #[test]
    fn test_role_file_overrides_builtin() {
        let path = std::env::temp_dir().join(format!(
            "promptpal_roles_{}.yml",
            std::process::id()
        ));
        fs::write(&path, "assistant: \"Overridden prompt text.\"\n").unwrap();

        let registry = RoleRegistry::new(Some(path.clone()));
        let role = registry.resolve("assistant");

        assert_eq!(role.prompt, "Overridden prompt text.");
        assert_eq!(role.label, "assistant");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_role_file_adds_new_label() {
        let path = std::env::temp_dir().join(format!(
            "promptpal_roles_new_{}.yml",
            std::process::id()
        ));
        fs::write(&path, "poet: \"You write poems.\"\n").unwrap();

        let registry = RoleRegistry::new(Some(path.clone()));
        let role = registry.resolve("poet");

        assert_eq!(role.label, "poet");
        assert_eq!(role.name, "Poet");
        assert_eq!(role.prompt, "You write poems.");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_role_file_is_ignored() {
        let path = std::env::temp_dir().join(format!(
            "promptpal_roles_bad_{}.yml",
            std::process::id()
        ));
        fs::write(&path, ":: not yaml ::[").unwrap();

        let registry = RoleRegistry::new(Some(path.clone()));
        let role = registry.resolve("assistant");

        assert_eq!(role.name, "Assistant");

        let _ = fs::remove_file(&path);
    }
}
