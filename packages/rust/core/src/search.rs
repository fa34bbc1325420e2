//! Catalog search with a completion-service fallback.
//!
//! The database is searched first. When nothing matches, the model is asked
//! about the query and a well-formed reply is added to the catalog.

use poetryhub_llm::{CompletionClient, CompletionRequest, extract_json};
use poetryhub_shared::{NewPoem, NewPoet, PoemId, PoemView, Poet, PoetryHubError, Result};
use poetryhub_storage::{PoemQuery, Storage};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Database hits returned before falling back to the model.
const DATABASE_LIMIT: u32 = 5;

const POEM_PROMPT: &str = r#"You are a poetry expert. When given a search query, provide accurate information about real, famous poems.

If the query is a POET'S NAME, return one of their most famous poems.
If the query is a POEM TITLE, return that specific poem.

Always return a complete, real poem with at least 8-12 lines. Include the poet's name, publication year if known, and theme. Format as JSON:
{
  "title": "poem title",
  "poet": "full poet name",
  "year": year or null,
  "body": "complete poem text with line breaks (\n)",
  "theme": "main theme (Love, Nature, Philosophy, or Life & Choices)",
  "bio": "brief poet bio (2-3 sentences)"
}"#;

const POET_PROMPT: &str = r#"You are a poetry expert. When asked about a poet, provide accurate biographical information about real, famous poets. Format your response as JSON:
{
  "name": "poet full name",
  "birth_year": year or null,
  "death_year": year or null,
  "nationality": "nationality",
  "bio": "biography (3-4 sentences)"
}
Only return information about poets that actually existed."#;

const UNPARSEABLE_REPLY: &str = "AI could not find reliable information about this query.";
const INCOMPLETE_REPLY: &str = "Could not generate valid data from AI response.";

/// What to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Poem,
    Poet,
}

impl SearchKind {
    fn system_prompt(self) -> &'static str {
        match self {
            Self::Poem => POEM_PROMPT,
            Self::Poet => POET_PROMPT,
        }
    }
}

/// A single search result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchHit {
    Poem(PoemView),
    Poet(Poet),
}

/// Where the answer came from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Existing catalog entries matched.
    Database { hits: Vec<SearchHit> },
    /// The model answered. `added` is false when the answer was already catalogued.
    Generated { hit: SearchHit, added: bool },
    /// Nothing usable was found.
    NotFound { message: String },
}

/// Search the catalog, asking the model when nothing matches.
#[instrument(skip_all, fields(kind = ?kind, query = %query))]
pub async fn ai_search<C: CompletionClient>(
    storage: &Storage,
    client: &C,
    kind: SearchKind,
    query: &str,
    temperature: f32,
) -> Result<SearchOutcome> {
    let query = query.trim();
    if query.is_empty() {
        return Err(PoetryHubError::validation("search query must not be empty"));
    }

    let hits = search_database(storage, kind, query).await?;
    if !hits.is_empty() {
        debug!(hits = hits.len(), "found in catalog");
        return Ok(SearchOutcome::Database { hits });
    }

    info!("not in catalog, asking the model");
    let completion = client
        .complete(&CompletionRequest {
            system: kind.system_prompt().to_string(),
            user: format!("Tell me about: {query}"),
            temperature,
        })
        .await?;

    let Some(reply) = extract_json(&completion.text) else {
        debug!(text = %completion.text, "reply had no JSON");
        return Ok(SearchOutcome::NotFound {
            message: UNPARSEABLE_REPLY.into(),
        });
    };

    let outcome = match kind {
        SearchKind::Poem => save_generated_poem(storage, &reply).await?,
        SearchKind::Poet => save_generated_poet(storage, &reply).await?,
    };
    Ok(outcome.unwrap_or_else(|| SearchOutcome::NotFound {
        message: INCOMPLETE_REPLY.into(),
    }))
}

async fn search_database(storage: &Storage, kind: SearchKind, query: &str) -> Result<Vec<SearchHit>> {
    Ok(match kind {
        SearchKind::Poem => storage
            .list_poems(&PoemQuery {
                search: Some(query.to_string()),
                limit: Some(DATABASE_LIMIT),
                ..PoemQuery::default()
            })
            .await?
            .into_iter()
            .map(SearchHit::Poem)
            .collect(),
        SearchKind::Poet => storage
            .list_poets(Some(query), Some(DATABASE_LIMIT))
            .await?
            .into_iter()
            .map(|summary| SearchHit::Poet(summary.poet))
            .collect(),
    })
}

async fn save_generated_poem(storage: &Storage, reply: &Value) -> Result<Option<SearchOutcome>> {
    let (Some(title), Some(poet_name), Some(body)) = (
        text_field(reply, "title"),
        text_field(reply, "poet"),
        text_field(reply, "body"),
    ) else {
        return Ok(None);
    };

    let poet = match storage.find_poet_by_name(poet_name).await? {
        Some(poet) => poet,
        None => {
            let bio = text_field(reply, "bio").map(str::to_string);
            storage.insert_poet(&NewPoet::named(poet_name, bio)).await?
        }
    };

    if let Some(existing) = storage.find_poem_by_title_and_poet(title, &poet.id).await? {
        let view = load_view(storage, &existing.id).await?;
        return Ok(Some(SearchOutcome::Generated {
            hit: SearchHit::Poem(view),
            added: false,
        }));
    }

    let poem = storage
        .insert_poem(&NewPoem {
            title: title.to_string(),
            body: body.to_string(),
            poet_id: poet.id.clone(),
            year_published: year_field(reply, "year"),
        })
        .await?;

    if let Some(theme_name) = text_field(reply, "theme") {
        match storage.find_theme_by_name(theme_name).await? {
            Some(theme) => storage.link_poem_theme(&poem.id, theme.id).await?,
            None => debug!(theme = theme_name, "unknown theme, not linked"),
        }
    }

    info!(title, poet = %poet.name, "added generated poem");
    Ok(Some(SearchOutcome::Generated {
        hit: SearchHit::Poem(load_view(storage, &poem.id).await?),
        added: true,
    }))
}

async fn save_generated_poet(storage: &Storage, reply: &Value) -> Result<Option<SearchOutcome>> {
    let Some(name) = text_field(reply, "name") else {
        return Ok(None);
    };

    if let Some(existing) = storage.find_poet_by_name(name).await? {
        return Ok(Some(SearchOutcome::Generated {
            hit: SearchHit::Poet(existing),
            added: false,
        }));
    }

    let poet = storage
        .insert_poet(&NewPoet {
            name: name.to_string(),
            bio: text_field(reply, "bio").map(str::to_string),
            birth_year: year_field(reply, "birth_year"),
            death_year: year_field(reply, "death_year"),
            nationality: text_field(reply, "nationality").map(str::to_string),
        })
        .await?;

    info!(name = %poet.name, "added generated poet");
    Ok(Some(SearchOutcome::Generated {
        hit: SearchHit::Poet(poet),
        added: true,
    }))
}

async fn load_view(storage: &Storage, id: &PoemId) -> Result<PoemView> {
    storage
        .get_poem(id)
        .await?
        .ok_or_else(|| PoetryHubError::Storage(format!("poem {id} not found after insert")))
}

fn text_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn year_field(value: &Value, key: &str) -> Option<i32> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|y| i32::try_from(y).ok())
}
