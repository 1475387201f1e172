//! Image generation: a sketch composite plus a prompt goes out, one image
//! comes back.
//!
//! The same endpoint also answers two text-only requests that help write
//! prompts: variations on a core idea, and a grammar pass over the prompt.

use std::thread;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::channel::oneshot;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::raster::{decode_image, encode_png};

/// What is sent to the generator
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// PNG bytes of the flattened sketch
    pub image_png: Vec<u8>,
}

impl GenerationRequest {
    /// Trims the prompt and encodes the composite; an empty prompt is refused
    pub fn new(prompt: &str, composite: &RgbaImage) -> GenerationResult<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        Ok(Self {
            prompt: prompt.to_string(),
            image_png: encode_png(composite)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub image: RgbaImage,
    pub prompt: String,
}

/// Anything that can turn a sketch and a prompt into an image. Blocking.
pub trait ImageGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> GenerationResult<GeneratedImage>;
}

/// Text in, text out. Blocking.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, instruction: &str) -> GenerationResult<String>;
}

fn variations_instruction(core_idea: &str) -> String {
    format!(
        "Generate 5 detailed, creative, comma-separated prompts for an AI image generator based on the core idea: \
         \"{core_idea}\". The prompts should be suitable for generating architectural or interior design \
         visualizations. Focus on lighting, materials, style, and mood."
    )
}

fn grammar_instruction(prompt: &str) -> String {
    format!(
        "Correct the grammar of the following text, keeping the meaning the same. Only return the corrected \
         text, with no extra explanation or quotation marks: \"{prompt}\""
    )
}

/// Comma-separated reply split into trimmed, non-empty prompts
pub fn parse_variations(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|variation| !variation.is_empty())
        .map(str::to_string)
        .collect()
}

/// A correction worth showing: non-empty and different beyond letter case
pub fn grammar_suggestion(prompt: &str, corrected: &str) -> Option<String> {
    let corrected = corrected.trim();
    (!corrected.is_empty() && corrected.to_lowercase() != prompt.trim().to_lowercase()).then(|| corrected.to_string())
}

/// Asks for prompt ideas built on `core_idea`
pub fn prompt_variations<T: TextGenerator + ?Sized>(generator: &T, core_idea: &str) -> GenerationResult<Vec<String>> {
    let core_idea = core_idea.trim();
    if core_idea.is_empty() {
        return Err(GenerationError::EmptyIdea);
    }
    let reply = generator.complete(&variations_instruction(core_idea))?;
    let variations = parse_variations(&reply);
    log::info!("Received {} prompt variation(s)", variations.len());
    Ok(variations)
}

/// Returns a corrected prompt, or `None` when nothing needs fixing
pub fn check_grammar<T: TextGenerator + ?Sized>(generator: &T, prompt: &str) -> GenerationResult<Option<String>> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Ok(None);
    }
    let reply = generator.complete(&grammar_instruction(prompt))?;
    Ok(grammar_suggestion(prompt, &reply))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart {
    InlineData(InlineData),
    Text(String),
}

#[derive(Debug, Serialize)]
struct RequestContents {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: RequestContents,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<ResponseInlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

fn request_body(request: &GenerationRequest) -> GenerateContentBody {
    GenerateContentBody {
        contents: RequestContents {
            parts: vec![
                RequestPart::InlineData(InlineData {
                    mime_type: "image/png".to_string(),
                    data: STANDARD.encode(&request.image_png),
                }),
                RequestPart::Text(request.prompt.clone()),
            ],
        },
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["IMAGE"],
        }),
    }
}

fn text_body(instruction: &str) -> GenerateContentBody {
    GenerateContentBody {
        contents: RequestContents {
            parts: vec![RequestPart::Text(instruction.to_string())],
        },
        generation_config: None,
    }
}

/// Text parts of the first candidate, joined
fn extract_text(response: &GenerateContentResponse) -> GenerationResult<String> {
    let text: String = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.iter().filter_map(|part| part.text.as_deref()).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GenerationError::NoTextData);
    }
    Ok(text)
}

/// Only the first part of the first candidate counts
fn extract_image(response: &GenerateContentResponse) -> GenerationResult<RgbaImage> {
    let data = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.inline_data.as_ref())
        .map(|inline| inline.data.as_str())
        .filter(|data| !data.is_empty())
        .ok_or(GenerationError::NoImageData)?;

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;
    decode_image(&bytes).map_err(|err| GenerationError::MalformedResponse(err.to_string()))
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    text_model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("text_model", &self.text_model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Text requests go to `model` too until [`Self::with_text_model`] says otherwise
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            text_model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn with_text_model(mut self, model: &str) -> Self {
        self.text_model = model.to_string();
        self
    }

    /// Builds a client from the configuration, reading the key from the
    /// configured environment variable
    pub fn from_config(config: &AppConfig) -> GenerationResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GenerationError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::new(&config.api_endpoint, &config.model, &api_key).with_text_model(&config.text_model))
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }

    fn post(&self, model: &str, body: GenerateContentBody) -> GenerationResult<GenerateContentResponse> {
        let mut response = ureq::post(&self.url(model))
            .header("x-goog-api-key", &self.api_key)
            .send_json(body)?;
        response
            .body_mut()
            .read_json()
            .map_err(|err| GenerationError::MalformedResponse(err.to_string()))
    }
}

impl ImageGenerator for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> GenerationResult<GeneratedImage> {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        log::info!("Requesting generation from {} ({} byte sketch)", self.model, request.image_png.len());

        let body = self.post(&self.model, request_body(request))?;
        let image = extract_image(&body)?;
        log::info!("Generated {}x{} image", image.width(), image.height());
        Ok(GeneratedImage {
            image,
            prompt: request.prompt.clone(),
        })
    }
}

impl TextGenerator for GeminiClient {
    fn complete(&self, instruction: &str) -> GenerationResult<String> {
        log::debug!("Requesting text from {}", self.text_model);
        let body = self.post(&self.text_model, text_body(instruction))?;
        extract_text(&body)
    }
}

/// A request running on a worker thread. Poll it from the UI loop.
#[derive(Debug)]
pub struct WorkerTask<T> {
    receiver: oneshot::Receiver<GenerationResult<T>>,
}

pub type GenerationTask = WorkerTask<GeneratedImage>;

impl GenerationTask {
    pub fn spawn<G>(generator: G, request: GenerationRequest) -> Self
    where
        G: ImageGenerator + 'static,
    {
        Self::run(move || generator.generate(&request))
    }
}

impl<T: Send + 'static> WorkerTask<T> {
    pub fn run<F>(job: F) -> Self
    where
        F: FnOnce() -> GenerationResult<T> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        thread::spawn(move || {
            if sender.send(job()).is_err() {
                log::debug!("Worker finished after its task was dropped");
            }
        });
        Self { receiver }
    }

    /// `None` while the worker is still running
    pub fn poll(&mut self) -> Option<GenerationResult<T>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(GenerationError::Canceled)),
        }
    }

    /// Blocks until the worker is done
    pub fn wait(self) -> GenerationResult<T> {
        futures::executor::block_on(self.receiver).unwrap_or(Err(GenerationError::Canceled))
    }
}
