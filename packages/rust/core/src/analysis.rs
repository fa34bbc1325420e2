//! Model-backed poem analysis, cached per prompt and model.

use poetryhub_llm::{CompletionClient, CompletionRequest};
use poetryhub_shared::{PoemId, PoemView, PoetryHubError, Result};
use poetryhub_storage::Storage;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "You are a literary critic who writes clear, insightful commentary \
     on poetry for general readers. Answer in plain prose without headings.";

/// Kind of analysis to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisAction {
    /// Meaning, form, and imagery.
    Analyze,
    /// Main themes and how the poem develops them.
    Themes,
    /// Other poems a reader of this one might enjoy.
    Similar,
}

impl AnalysisAction {
    /// Cache key component.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Themes => "themes",
            Self::Similar => "similar",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::Analyze => {
                "Analyze this poem: its meaning, structure, imagery, and use of language."
            }
            Self::Themes => "Identify the main themes of this poem and explain how each is developed.",
            Self::Similar => {
                "Recommend five poems by other poets that a reader of this poem would enjoy, \
                 with one sentence on why for each."
            }
        }
    }
}

/// Text returned by an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub text: String,
    /// Served from the cache without calling the model.
    pub cached: bool,
}

/// Run `action` on a poem, reusing a cached answer for the same prompt and model.
#[instrument(skip_all, fields(poem_id = %poem_id, action = action.as_str()))]
pub async fn analyze_poem<C: CompletionClient>(
    storage: &Storage,
    client: &C,
    poem_id: &PoemId,
    action: AnalysisAction,
    temperature: f32,
) -> Result<AnalysisResult> {
    let poem = storage
        .get_poem(poem_id)
        .await?
        .ok_or_else(|| PoetryHubError::validation(format!("poem {poem_id} not found")))?;

    let user = build_prompt(&poem, action);
    let hash = prompt_hash(SYSTEM_PROMPT, &user);
    let model = client.model();

    if let Some(text) = storage
        .get_ai_cache(poem_id, action.as_str(), &hash, model)
        .await?
    {
        debug!("analysis cache hit");
        return Ok(AnalysisResult { text, cached: true });
    }

    let completion = client
        .complete(&CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user,
            temperature,
        })
        .await?;

    storage
        .set_ai_cache(poem_id, action.as_str(), &hash, model, &completion.text)
        .await?;

    info!(
        tokens_in = completion.tokens_in,
        tokens_out = completion.tokens_out,
        "analysis generated"
    );
    Ok(AnalysisResult {
        text: completion.text,
        cached: false,
    })
}

fn build_prompt(view: &PoemView, action: AnalysisAction) -> String {
    let mut prompt = format!(
        "{}\n\nTitle: {}\nPoet: {}\n",
        action.instruction(),
        view.poem.title.trim(),
        view.poet_name
    );
    if let Some(year) = view.poem.year_published {
        prompt.push_str(&format!("Year: {year}\n"));
    }
    prompt.push('\n');
    prompt.push_str(view.poem.body.trim());
    prompt
}

/// SHA-256 of the full prompt, hex-encoded.
fn prompt_hash(system: &str, user: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(system.as_bytes());
    hasher.update(b"\n");
    hasher.update(user.as_bytes());
    format!("{:x}", hasher.finalize())
}
