//! Shared fixtures for core tests.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::Mutex;

use chrono::Utc;
use poetryhub_shared::{Poem, PoemId, Poet, PoetId, PoetryHubError, Result, poet_name_key};
use zip::write::SimpleFileOptions;

use crate::store::CatalogStore;

/// Build an in-memory ZIP archive from `(name, content)` pairs.
pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Build a CSV document with `Title,Poet,Poem` columns.
pub(crate) fn poems_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Title", "Poet", "Poem"])
        .expect("write header");
    for (title, poet, body) in rows {
        writer
            .write_record([*title, *poet, *body])
            .expect("write row");
    }
    String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf8 csv")
}

#[derive(Default)]
struct Catalog {
    poets: Vec<Poet>,
    poems: Vec<Poem>,
}

/// One [`CatalogStore`] method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StoreOp {
    FindPoet,
    CreatePoet,
    FindPoem,
    CreatePoem,
}

/// In-memory [`CatalogStore`] that counts calls and can fail on demand.
#[derive(Default)]
pub(crate) struct MemoryStore {
    catalog: Mutex<Catalog>,
    /// Poet ops match on the poet name key, poem ops on the exact title.
    failures: HashSet<(StoreOp, String)>,
    calls: Mutex<HashMap<StoreOp, usize>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make `create_poem` fail for this exact title.
    pub(crate) fn failing_on(self, title: &str) -> Self {
        self.failing(StoreOp::CreatePoem, title)
    }

    /// Make `op` fail for this poet name or poem title.
    pub(crate) fn failing(mut self, op: StoreOp, key: &str) -> Self {
        let key = match op {
            StoreOp::FindPoet | StoreOp::CreatePoet => poet_name_key(key),
            StoreOp::FindPoem | StoreOp::CreatePoem => key.to_string(),
        };
        self.failures.insert((op, key));
        self
    }

    /// Total calls across all methods.
    pub(crate) fn calls(&self) -> usize {
        self.calls.lock().expect("calls lock").values().sum()
    }

    pub(crate) fn calls_to(&self, op: StoreOp) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(&op)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn poet_names(&self) -> Vec<String> {
        let catalog = self.catalog.lock().expect("catalog lock");
        catalog.poets.iter().map(|p| p.name.clone()).collect()
    }

    pub(crate) fn poem_count(&self) -> usize {
        self.catalog.lock().expect("catalog lock").poems.len()
    }

    /// Count the call, then fail if `op` is set to fail for `key`.
    fn enter(&self, op: StoreOp, key: &str) -> Result<()> {
        *self.calls.lock().expect("calls lock").entry(op).or_default() += 1;
        if self.failures.contains(&(op, key.to_string())) {
            return Err(PoetryHubError::Storage(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl CatalogStore for MemoryStore {
    async fn find_poet_by_name(&self, name: &str) -> Result<Option<Poet>> {
        let key = poet_name_key(name);
        self.enter(StoreOp::FindPoet, &key)?;
        let catalog = self.catalog.lock().expect("catalog lock");
        Ok(catalog
            .poets
            .iter()
            .find(|p| poet_name_key(&p.name) == key)
            .cloned())
    }

    async fn create_poet(&self, name: &str, bio: &str) -> Result<Poet> {
        let key = poet_name_key(name);
        self.enter(StoreOp::CreatePoet, &key)?;
        let mut catalog = self.catalog.lock().expect("catalog lock");
        if catalog.poets.iter().any(|p| poet_name_key(&p.name) == key) {
            return Err(PoetryHubError::Storage(format!("duplicate poet '{name}'")));
        }
        let poet = Poet {
            id: PoetId::new(),
            name: name.trim().to_string(),
            bio: Some(bio.to_string()),
            birth_year: None,
            death_year: None,
            nationality: None,
            created_at: Utc::now(),
        };
        catalog.poets.push(poet.clone());
        Ok(poet)
    }

    async fn find_poem_by_title_and_poet(
        &self,
        title: &str,
        poet_id: &PoetId,
    ) -> Result<Option<Poem>> {
        self.enter(StoreOp::FindPoem, title)?;
        let catalog = self.catalog.lock().expect("catalog lock");
        Ok(catalog
            .poems
            .iter()
            .find(|p| p.title == title && &p.poet_id == poet_id)
            .cloned())
    }

    async fn create_poem(&self, title: &str, body: &str, poet_id: &PoetId) -> Result<Poem> {
        self.enter(StoreOp::CreatePoem, title)?;
        let poem = Poem {
            id: PoemId::new(),
            title: title.to_string(),
            body: body.to_string(),
            poet_id: poet_id.clone(),
            year_published: None,
            views: 0,
            created_at: Utc::now(),
        };
        self.catalog
            .lock()
            .expect("catalog lock")
            .poems
            .push(poem.clone());
        Ok(poem)
    }
}
