//! SQL migration definitions for the Poetry Hub database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Catalog schema: poets, poems, themes, poem_themes",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Poets; name_key is the trimmed, lower-cased name
CREATE TABLE IF NOT EXISTS poets (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    name_key    TEXT NOT NULL UNIQUE,
    bio         TEXT,
    birth_year  INTEGER,
    death_year  INTEGER,
    nationality TEXT,
    created_at  TEXT NOT NULL
);

-- Poems
CREATE TABLE IF NOT EXISTS poems (
    id             TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    body           TEXT NOT NULL,
    poet_id        TEXT NOT NULL REFERENCES poets(id) ON DELETE CASCADE,
    year_published INTEGER,
    views          INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_poems_poet_title ON poems(poet_id, title);
CREATE INDEX IF NOT EXISTS idx_poems_created_at ON poems(created_at);

-- Themes
CREATE TABLE IF NOT EXISTS themes (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS poem_themes (
    poem_id  TEXT NOT NULL REFERENCES poems(id) ON DELETE CASCADE,
    theme_id INTEGER NOT NULL REFERENCES themes(id) ON DELETE CASCADE,
    PRIMARY KEY (poem_id, theme_id)
);

INSERT OR IGNORE INTO themes (name) VALUES
    ('Love'), ('Nature'), ('Philosophy'), ('Life & Choices');

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Reader activity, import runs, AI cache",
            sql: r#"
CREATE TABLE IF NOT EXISTS favorites (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL,
    poem_id    TEXT NOT NULL REFERENCES poems(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    UNIQUE(user_id, poem_id)
);

CREATE TABLE IF NOT EXISTS reading_history (
    id      TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    poem_id TEXT NOT NULL REFERENCES poems(id) ON DELETE CASCADE,
    read_at TEXT NOT NULL,
    UNIQUE(user_id, poem_id)
);

CREATE INDEX IF NOT EXISTS idx_reading_history_user ON reading_history(user_id, read_at);

CREATE TABLE IF NOT EXISTS comments (
    id         TEXT PRIMARY KEY,
    poem_id    TEXT NOT NULL REFERENCES poems(id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_poem ON comments(poem_id);

-- Bulk import history
CREATE TABLE IF NOT EXISTS import_runs (
    id           TEXT PRIMARY KEY,
    source       TEXT NOT NULL,
    started_at   TEXT NOT NULL,
    finished_at  TEXT,
    summary_json TEXT
);

-- Completion results for poem analysis
CREATE TABLE IF NOT EXISTS ai_cache (
    id          TEXT PRIMARY KEY,
    poem_id     TEXT NOT NULL REFERENCES poems(id) ON DELETE CASCADE,
    action      TEXT NOT NULL,
    prompt_hash TEXT NOT NULL,
    model_id    TEXT NOT NULL,
    result_text TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE(poem_id, action, prompt_hash, model_id)
);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
        Migration {
            version: 3,
            description: "Reader collections",
            sql: r#"
CREATE TABLE IF NOT EXISTS collections (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    is_public   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_collections_user ON collections(user_id);

CREATE TABLE IF NOT EXISTS collection_poems (
    collection_id TEXT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    poem_id       TEXT NOT NULL REFERENCES poems(id) ON DELETE CASCADE,
    added_at      TEXT NOT NULL,
    PRIMARY KEY (collection_id, poem_id)
);

INSERT INTO schema_migrations (version) VALUES (3);
"#,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_ascending_and_recorded() {
        let migrations = all_migrations();
        for pair in migrations.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
        for m in &migrations {
            let marker = format!("INSERT INTO schema_migrations (version) VALUES ({});", m.version);
            assert!(m.sql.contains(&marker), "migration v{} does not record itself", m.version);
        }
    }
}
