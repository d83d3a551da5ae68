mod client;

pub use client::{
    ApiError, ChatMessage, Completion, CompletionClient, CompletionRequest, ImageClient,
    ImageOutput, ImageRequest, OpenAiClient, is_image_model, select_model,
};
