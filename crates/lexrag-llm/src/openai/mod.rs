mod client;

pub use client::{OpenAIClient, GEMINI_OPENAI_API_BASE, OPENAI_API_BASE};
