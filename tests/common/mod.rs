//! In-memory stand-ins for the external collaborators

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;

use guardian::embedding::Embedder;
use guardian::generation::{Generation, Generator};
use guardian::rag::{CompliancePipeline, PipelineContext, ReRanker, RelevanceModel};
use guardian::types::{Chunk, TokenUsage};
use guardian::vector_db::{SearchHit, VectorStore};

pub const LEY_QUERY: &str = "¿Qué obligaciones tiene una empresa bajo la Ley 21.719?";

/// Embeds text as `[char_count, 1.0]`, optionally after a delay
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub fail: bool,
    /// Dimension advertised to the pipeline; vectors always have 2 entries
    pub advertised_dimension: usize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: false,
            advertised_dimension: 2,
        }
    }

    pub fn advertising(dimension: usize) -> Self {
        Self {
            advertised_dimension: dimension,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            bail!("embedding service unavailable");
        }
        Ok(vec![text.chars().count() as f32, 1.0])
    }

    fn dimension(&self) -> usize {
        self.advertised_dimension
    }
}

/// Returns canned chunks; records the thread each search ran on
pub struct FakeStore {
    pub chunks: Vec<Chunk>,
    pub calls: AtomicUsize,
    pub threads: Mutex<Vec<ThreadId>>,
    pub delay: Duration,
}

impl FakeStore {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            calls: AtomicUsize::new(0),
            threads: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VectorStore for FakeStore {
    fn search(&self, _vector: &[f32], limit: usize, with_payload: bool) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.threads.lock().unwrap().push(std::thread::current().id());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self
            .chunks
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, chunk)| SearchHit {
                score: 1.0 - i as f32 * 0.01,
                payload: with_payload.then(|| chunk.clone()),
            })
            .collect())
    }
}

/// Derives chunks from the query vector so concurrent runs get distinct context
pub struct EchoStore {
    pub per_query: usize,
    pub delay: Duration,
}

impl VectorStore for EchoStore {
    fn search(&self, vector: &[f32], limit: usize, _with_payload: bool) -> Result<Vec<SearchHit>> {
        std::thread::sleep(self.delay);
        let tag = vector[0] as usize;
        Ok((0..self.per_query.min(limit))
            .map(|i| SearchHit {
                score: 0.9,
                payload: Some(
                    Chunk::new(format!("len{}-chunk{}", tag, i)).with_source(format!("fuente-{}", tag)),
                ),
            })
            .collect())
    }
}

/// Scores passages by their text length; records calling threads
pub struct LengthModel {
    pub threads: Mutex<Vec<ThreadId>>,
}

impl LengthModel {
    pub fn new() -> Self {
        Self {
            threads: Mutex::new(Vec::new()),
        }
    }
}

impl RelevanceModel for LengthModel {
    fn predict(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        self.threads.lock().unwrap().push(std::thread::current().id());
        Ok(pairs.iter().map(|(_, text)| text.len() as f32).collect())
    }
}

/// Answers with a fixed text; usage mirrors the prompt length
pub struct FakeGenerator {
    pub answer: String,
    pub fail: bool,
    pub delay: Duration,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail: false,
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new("tarde")
        }
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            bail!("model overloaded");
        }
        let prompt_tokens = prompt.chars().count() as u64;
        Ok(Generation {
            text: self.answer.clone(),
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens: 7,
                total_tokens: prompt_tokens + 7,
            },
        })
    }
}

pub fn ley_chunks(n: usize) -> Vec<Chunk> {
    (0..n)
        .map(|i| {
            Chunk::new(format!("Artículo {}: {}", i + 1, "obligación ".repeat(i + 1)))
                .with_source("Ley 21.719 - Chile")
                .with_article((i + 1).to_string())
        })
        .collect()
}

pub fn pipeline(
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    model: Arc<dyn RelevanceModel>,
    generator: Arc<dyn Generator>,
) -> CompliancePipeline {
    CompliancePipeline::new(PipelineContext {
        embedder,
        store,
        reranker: ReRanker::new(model),
        generator,
    })
}

/// Shared in-memory sink for a scoped `tracing` subscriber
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// One parsed JSON object per emitted log line
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// JSON subscriber shaped like `telemetry::init_logging`, writing into `buffer`
pub fn json_subscriber(buffer: LogBuffer) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_writer(buffer)
        .finish()
}
