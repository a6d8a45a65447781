//! Parallel chunk summarization.

use crate::llm::{TextGenerator, ask};
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Most LLM calls in flight at once.
pub const MAX_CONCURRENT_CALLS: usize = 8;

/// Default character cap per chunk prompt.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1500;

const SUMMARY_TEMPERATURE: f32 = 0.8;

fn summary_prompt(chunk: &str, max_chars: usize) -> String {
    let chunk: String = chunk.chars().take(max_chars).collect();
    format!("아래 텍스트들을 2~3문장으로 요약해줘:\n{chunk}")
}

/// Summarize each chunk, keeping chunk order.
///
/// `None` marks a chunk whose call failed or came back blank.
pub async fn summarize_chunks(
    generator: &dyn TextGenerator,
    chunks: &[String],
    max_chars: usize,
) -> Vec<Option<String>> {
    debug!(chunks = chunks.len(), "summarizing chunks");
    stream::iter(chunks)
        .map(|chunk| async move {
            ask(generator, &summary_prompt(chunk, max_chars), SUMMARY_TEMPERATURE).await
        })
        .buffered(MAX_CONCURRENT_CALLS)
        .collect()
        .await
}
