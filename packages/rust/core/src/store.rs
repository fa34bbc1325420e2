//! Persistence seam used by the importer.

use poetryhub_shared::{NewPoem, NewPoet, Poem, Poet, PoetId, Result};
use poetryhub_storage::Storage;

/// The catalog operations an import needs.
///
/// Poet lookups are case-insensitive on the trimmed name. Poem lookups match
/// the exact title within one poet.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    async fn find_poet_by_name(&self, name: &str) -> Result<Option<Poet>>;

    async fn create_poet(&self, name: &str, bio: &str) -> Result<Poet>;

    async fn find_poem_by_title_and_poet(&self, title: &str, poet_id: &PoetId)
    -> Result<Option<Poem>>;

    async fn create_poem(&self, title: &str, body: &str, poet_id: &PoetId) -> Result<Poem>;
}

impl CatalogStore for Storage {
    async fn find_poet_by_name(&self, name: &str) -> Result<Option<Poet>> {
        Storage::find_poet_by_name(self, name).await
    }

    async fn create_poet(&self, name: &str, bio: &str) -> Result<Poet> {
        self.insert_poet(&NewPoet::named(name, Some(bio.to_string())))
            .await
    }

    async fn find_poem_by_title_and_poet(
        &self,
        title: &str,
        poet_id: &PoetId,
    ) -> Result<Option<Poem>> {
        Storage::find_poem_by_title_and_poet(self, title, poet_id).await
    }

    async fn create_poem(&self, title: &str, body: &str, poet_id: &PoetId) -> Result<Poem> {
        self.insert_poem(&NewPoem {
            title: title.to_string(),
            body: body.to_string(),
            poet_id: poet_id.clone(),
            year_published: None,
        })
        .await
    }
}
