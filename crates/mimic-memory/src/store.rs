// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed example store with in-memory similarity indexes.
//!
//! Rows live in the `examples` and `phrases` tables with their embeddings as
//! little-endian f32 BLOBs. On open every row is loaded into a
//! [`VectorIndex`], so queries never touch the database. The embedding model
//! name and width are recorded in `store_meta`. A store built with one model
//! refuses to open under another.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

use mimic_core::traits::{EmbeddingAdapter, VectorIndex};
use mimic_core::types::{EmbeddingInput, Example, Phrase, Scored};
use mimic_core::MimicError;
use mimic_storage::{map_tr_err, Database};

use crate::extractor::PhraseCandidate;
use crate::index::FlatIndex;
use crate::ingest::{IngestProgress, NoProgress};
use crate::types::{blob_to_vec, vec_to_blob, ScoredExample, ScoredPhrase};

const META_MODEL: &str = "embedding_model";
const META_DIMS: &str = "embedding_dims";

/// Texts embedded per adapter call when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 32;

type ExampleRow = (i64, String, String, Vec<u8>);
type PhraseRow = (i64, String, u32, Vec<u8>);

struct Loaded {
    meta: HashMap<String, String>,
    examples: Vec<ExampleRow>,
    phrases: Vec<PhraseRow>,
}

fn load_all(conn: &rusqlite::Connection) -> rusqlite::Result<Loaded> {
    let mut stmt = conn.prepare("SELECT key, value FROM store_meta")?;
    let meta = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<HashMap<String, String>, _>>()?;

    let mut stmt = conn
        .prepare("SELECT id, source_message, response, embedding FROM examples ORDER BY id")?;
    let examples = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
        .collect::<Result<Vec<ExampleRow>, _>>()?;

    let mut stmt =
        conn.prepare("SELECT id, text, frequency, embedding FROM phrases ORDER BY id")?;
    let phrases = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
        .collect::<Result<Vec<PhraseRow>, _>>()?;

    Ok(Loaded {
        meta,
        examples,
        phrases,
    })
}

fn write_meta(conn: &rusqlite::Connection, model: &str, dims: usize) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO store_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )?;
    stmt.execute(params![META_MODEL, model])?;
    stmt.execute(params![META_DIMS, dims.to_string()])?;
    Ok(())
}

/// Decodes a stored blob, rejecting anything not `dims` wide.
fn decode(blob: &[u8], dims: Option<usize>) -> Option<Vec<f32>> {
    blob_to_vec(blob).filter(|v| !v.is_empty() && dims.is_none_or(|d| v.len() == d))
}

/// Persistent, similarity-searchable collection of examples and phrases.
///
/// Writes take `&mut self`. Once wrapped in an `Arc` for serving, the store
/// is read-only.
pub struct ExampleStore {
    conn: Connection,
    embedder: Arc<dyn EmbeddingAdapter>,
    model_name: String,
    dimensions: Option<usize>,
    batch_size: usize,
    examples: Vec<Example>,
    example_index: Box<dyn VectorIndex>,
    phrases: Vec<Phrase>,
    phrase_index: Box<dyn VectorIndex>,
}

impl ExampleStore {
    /// An empty store on a private in-memory database. Nothing written to it
    /// outlives the process.
    pub async fn open_empty(embedder: Arc<dyn EmbeddingAdapter>) -> Result<Self, MimicError> {
        let db = Database::open_in_memory().await?;
        Self::open(&db, embedder, "none").await
    }

    /// Opens the store with exact flat indexes.
    pub async fn open(
        db: &Database,
        embedder: Arc<dyn EmbeddingAdapter>,
        model_name: impl Into<String>,
    ) -> Result<Self, MimicError> {
        Self::open_with_indexes(
            db,
            embedder,
            model_name,
            Box::new(FlatIndex::new()),
            Box::new(FlatIndex::new()),
        )
        .await
    }

    /// Opens the store, loading persisted rows into the given indexes.
    pub async fn open_with_indexes(
        db: &Database,
        embedder: Arc<dyn EmbeddingAdapter>,
        model_name: impl Into<String>,
        mut example_index: Box<dyn VectorIndex>,
        mut phrase_index: Box<dyn VectorIndex>,
    ) -> Result<Self, MimicError> {
        let conn = db.connection().clone();
        let model_name = model_name.into();

        let loaded = conn
            .call(|conn| load_all(conn))
            .await
            .map_err(|e| MimicError::StoreUnavailable(format!("failed to read store: {e}")))?;

        if let Some(stored) = loaded.meta.get(META_MODEL)
            && *stored != model_name
        {
            return Err(MimicError::StoreUnavailable(format!(
                "store was built with embedding model '{stored}' but '{model_name}' is configured; \
                 run `mimic ingest --rebuild`"
            )));
        }
        let mut dimensions = match loaded.meta.get(META_DIMS) {
            Some(v) => Some(v.parse::<usize>().map_err(|_| {
                MimicError::StoreUnavailable(format!("corrupt embedding_dims value '{v}'"))
            })?),
            None => None,
        };

        example_index.clear();
        phrase_index.clear();

        let mut examples = Vec::with_capacity(loaded.examples.len());
        for (id, source_message, response, blob) in loaded.examples {
            let Some(embedding) = decode(&blob, dimensions) else {
                warn!(id, "skipping example with malformed embedding");
                continue;
            };
            dimensions.get_or_insert(embedding.len());
            example_index.add(embedding.clone())?;
            examples.push(Example {
                id,
                source_message,
                response,
                embedding,
            });
        }

        let mut phrases = Vec::with_capacity(loaded.phrases.len());
        for (id, text, frequency, blob) in loaded.phrases {
            let Some(embedding) = decode(&blob, dimensions) else {
                warn!(id, "skipping phrase with malformed embedding");
                continue;
            };
            dimensions.get_or_insert(embedding.len());
            phrase_index.add(embedding.clone())?;
            phrases.push(Phrase {
                id,
                text,
                frequency,
                embedding,
            });
        }

        info!(
            examples = examples.len(),
            phrases = phrases.len(),
            model = %model_name,
            "example store loaded"
        );

        Ok(Self {
            conn,
            embedder,
            model_name,
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
            examples,
            example_index,
            phrases,
            phrase_index,
        })
    }

    /// Sets how many texts go to the embedder per call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Embedding width, once anything has been stored.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// True when no examples are stored. Phrases alone do not count.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Embeds `texts` in batches, checking every vector against the store width.
    async fn embed_all(
        &self,
        texts: &[String],
        progress: &dyn IngestProgress,
    ) -> Result<Vec<Vec<f32>>, MimicError> {
        let mut dims = self.dimensions;
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: chunk.to_vec(),
                })
                .await?;
            if output.embeddings.len() != chunk.len() {
                return Err(MimicError::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    output.embeddings.len(),
                    chunk.len()
                )));
            }
            for v in output.embeddings {
                if v.is_empty() {
                    return Err(MimicError::Embedding("embedder returned an empty vector".into()));
                }
                if let Some(d) = dims
                    && d != v.len()
                {
                    return Err(MimicError::Embedding(format!(
                        "embedder returned {} dimensions, store holds {d}",
                        v.len()
                    )));
                }
                dims = Some(v.len());
                vectors.push(v);
            }
            progress.advance(chunk.len() as u64);
        }
        Ok(vectors)
    }

    /// Embeds a query text.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, MimicError> {
        self.embedder
            .embed(EmbeddingInput::single(text))
            .await?
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MimicError::Embedding("embedding returned no results".to_string()))
    }

    /// Stores a single pair.
    pub async fn add_example(
        &mut self,
        source_message: &str,
        response: &str,
    ) -> Result<Example, MimicError> {
        let mut added = self
            .add_examples(vec![(source_message.to_string(), response.to_string())])
            .await?;
        added
            .pop()
            .ok_or_else(|| MimicError::Internal("insert returned no example".to_string()))
    }

    /// Stores pairs of `(source_message, response)` in one transaction.
    pub async fn add_examples(
        &mut self,
        pairs: Vec<(String, String)>,
    ) -> Result<Vec<Example>, MimicError> {
        self.add_examples_with_progress(pairs, &NoProgress).await
    }

    /// As [`add_examples`](Self::add_examples), reporting each embedded batch.
    ///
    /// Nothing is written unless every pair embeds successfully.
    pub async fn add_examples_with_progress(
        &mut self,
        pairs: Vec<(String, String)>,
        progress: &dyn IngestProgress,
    ) -> Result<Vec<Example>, MimicError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let sources: Vec<String> = pairs.iter().map(|(m, _)| m.clone()).collect();
        let vectors = self.embed_all(&sources, progress).await?;
        let dims = vectors.first().map(Vec::len).unwrap_or(0);

        let rows: Vec<(String, String, Vec<u8>)> = pairs
            .iter()
            .zip(&vectors)
            .map(|((m, r), v)| (m.clone(), r.clone(), vec_to_blob(v)))
            .collect();
        let model = self.model_name.clone();

        let ids = self
            .conn
            .call(move |conn| -> rusqlite::Result<Vec<i64>> {
                let tx = conn.transaction()?;
                let mut ids = Vec::with_capacity(rows.len());
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO examples (source_message, response, embedding) VALUES (?1, ?2, ?3)",
                    )?;
                    for (message, response, blob) in &rows {
                        stmt.execute(params![message, response, blob])?;
                        ids.push(tx.last_insert_rowid());
                    }
                }
                write_meta(&tx, &model, dims)?;
                tx.commit()?;
                Ok(ids)
            })
            .await
            .map_err(map_tr_err)?;

        self.dimensions = Some(dims);
        let mut added = Vec::with_capacity(ids.len());
        for ((id, (source_message, response)), embedding) in ids.into_iter().zip(pairs).zip(vectors) {
            self.example_index.add(embedding.clone())?;
            let example = Example {
                id,
                source_message,
                response,
                embedding,
            };
            self.examples.push(example.clone());
            added.push(example);
        }
        debug!(count = added.len(), "examples stored");
        Ok(added)
    }

    /// Stores phrase candidates. A candidate whose text is already stored
    /// only updates the frequency.
    pub async fn add_phrases(
        &mut self,
        candidates: Vec<PhraseCandidate>,
    ) -> Result<Vec<Phrase>, MimicError> {
        let mut seen = HashSet::new();
        let mut updates: Vec<(usize, u32)> = Vec::new();
        let mut fresh: Vec<PhraseCandidate> = Vec::new();
        for candidate in candidates {
            if !seen.insert(candidate.text.clone()) {
                continue;
            }
            match self.phrases.iter().position(|p| p.text == candidate.text) {
                Some(pos) => updates.push((pos, candidate.frequency)),
                None => fresh.push(candidate),
            }
        }
        if updates.is_empty() && fresh.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = fresh.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_all(&texts, &NoProgress).await?;
        let dims = vectors.first().map(Vec::len).or(self.dimensions).unwrap_or(0);

        let inserts: Vec<(String, u32, Vec<u8>)> = fresh
            .iter()
            .zip(&vectors)
            .map(|(c, v)| (c.text.clone(), c.frequency, vec_to_blob(v)))
            .collect();
        let frequency_updates: Vec<(i64, u32)> = updates
            .iter()
            .map(|(pos, freq)| (self.phrases[*pos].id, *freq))
            .collect();
        let model = self.model_name.clone();

        let ids = self
            .conn
            .call(move |conn| -> rusqlite::Result<Vec<i64>> {
                let tx = conn.transaction()?;
                let mut ids = Vec::with_capacity(inserts.len());
                {
                    let mut update = tx.prepare("UPDATE phrases SET frequency = ?1 WHERE id = ?2")?;
                    for (id, freq) in &frequency_updates {
                        update.execute(params![freq, id])?;
                    }
                    let mut insert = tx.prepare(
                        "INSERT INTO phrases (text, frequency, embedding) VALUES (?1, ?2, ?3)",
                    )?;
                    for (text, freq, blob) in &inserts {
                        insert.execute(params![text, freq, blob])?;
                        ids.push(tx.last_insert_rowid());
                    }
                }
                if dims > 0 {
                    write_meta(&tx, &model, dims)?;
                }
                tx.commit()?;
                Ok(ids)
            })
            .await
            .map_err(map_tr_err)?;

        let mut stored = Vec::with_capacity(updates.len() + ids.len());
        for (pos, freq) in updates {
            self.phrases[pos].frequency = freq;
            stored.push(self.phrases[pos].clone());
        }
        if dims > 0 {
            self.dimensions = Some(dims);
        }
        for ((id, candidate), embedding) in ids.into_iter().zip(fresh).zip(vectors) {
            self.phrase_index.add(embedding.clone())?;
            let phrase = Phrase {
                id,
                text: candidate.text,
                frequency: candidate.frequency,
                embedding,
            };
            self.phrases.push(phrase.clone());
            stored.push(phrase);
        }
        debug!(count = stored.len(), "phrases stored");
        Ok(stored)
    }

    /// Returns at most `k` examples most similar to `text`.
    ///
    /// Fails with [`MimicError::EmptyStore`] when nothing is stored.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredExample>, MimicError> {
        if self.examples.is_empty() {
            return Err(MimicError::EmptyStore);
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embed_query(text).await?;
        self.nearest_examples(&vector, k)
    }

    /// Same contract as [`query`](Self::query), over phrases.
    pub async fn query_phrases(&self, text: &str, k: usize) -> Result<Vec<ScoredPhrase>, MimicError> {
        if self.phrases.is_empty() {
            return Err(MimicError::EmptyStore);
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embed_query(text).await?;
        self.nearest_phrases(&vector, k)
    }

    /// Example lookup for an already embedded query.
    pub fn nearest_examples(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredExample>, MimicError> {
        if self.examples.is_empty() {
            return Err(MimicError::EmptyStore);
        }
        Ok(resolve(&self.examples, self.example_index.query(vector, k)?))
    }

    /// Phrase lookup for an already embedded query.
    pub fn nearest_phrases(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPhrase>, MimicError> {
        if self.phrases.is_empty() {
            return Err(MimicError::EmptyStore);
        }
        Ok(resolve(&self.phrases, self.phrase_index.query(vector, k)?))
    }

    /// Deletes every example, phrase and the model record.
    pub async fn clear(&mut self) -> Result<(), MimicError> {
        purge_rows(&self.conn).await?;

        self.examples.clear();
        self.phrases.clear();
        self.example_index.clear();
        self.phrase_index.clear();
        self.dimensions = None;
        info!("example store cleared");
        Ok(())
    }
}

/// Empties the store tables without loading them.
///
/// Works on a store that [`ExampleStore::open`] refuses, such as one built
/// with a different embedding model.
pub async fn purge_store(db: &Database) -> Result<(), MimicError> {
    purge_rows(db.connection()).await?;
    info!("example store purged");
    Ok(())
}

/// Row counts and model record, read without embedding anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub examples: usize,
    pub phrases: usize,
    /// Embedding model the vectors were built with, if any were written.
    pub model: Option<String>,
}

/// Summarizes the store behind `db`.
pub async fn inspect_store(db: &Database) -> Result<StoreSummary, MimicError> {
    db.connection()
        .call(|conn| -> rusqlite::Result<StoreSummary> {
            let examples: i64 = conn.query_row("SELECT COUNT(*) FROM examples", [], |r| r.get(0))?;
            let phrases: i64 = conn.query_row("SELECT COUNT(*) FROM phrases", [], |r| r.get(0))?;
            let model = conn
                .query_row(
                    "SELECT value FROM store_meta WHERE key = ?1",
                    params![META_MODEL],
                    |r| r.get(0),
                )
                .optional()?;
            Ok(StoreSummary {
                examples: examples as usize,
                phrases: phrases as usize,
                model,
            })
        })
        .await
        .map_err(map_tr_err)
}

async fn purge_rows(conn: &Connection) -> Result<(), MimicError> {
    conn.call(|conn| -> rusqlite::Result<()> {
        let tx = conn.transaction()?;
        tx.execute_batch("DELETE FROM examples; DELETE FROM phrases; DELETE FROM store_meta;")?;
        tx.commit()
    })
    .await
    .map_err(map_tr_err)
}

fn resolve<T: Clone>(items: &[T], hits: Vec<(usize, f32)>) -> Vec<Scored<T>> {
    hits.into_iter()
        .filter_map(|(pos, score)| {
            items.get(pos).map(|item| Scored {
                item: item.clone(),
                score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_test_utils::{fixtures, MockEmbedder};

    const MODEL: &str = "mock:hash";

    async fn open_store(db: &Database, embedder: Arc<MockEmbedder>) -> ExampleStore {
        ExampleStore::open(db, embedder, MODEL).await.unwrap()
    }

    async fn memory_store() -> ExampleStore {
        let db = Database::open_in_memory().await.unwrap();
        open_store(&db, Arc::new(MockEmbedder::new())).await
    }

    fn pair(m: &str, r: &str) -> (String, String) {
        (m.to_string(), r.to_string())
    }

    #[tokio::test]
    async fn empty_store_rejects_queries() {
        let store = memory_store().await;
        assert!(store.is_empty());
        assert!(matches!(store.query("hi", 3).await, Err(MimicError::EmptyStore)));
        assert!(matches!(
            store.query_phrases("hi", 3).await,
            Err(MimicError::EmptyStore)
        ));
    }

    #[tokio::test]
    async fn zero_k_returns_nothing() {
        let mut store = memory_store().await;
        store.add_example("a", "b").await.unwrap();
        assert!(store.query("a", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exact_source_message_ranks_first() {
        let mut store = memory_store().await;
        store.add_examples(fixtures::sample_pairs()).await.unwrap();
        for (message, response) in fixtures::sample_pairs() {
            let hits = store.query(&message, 1).await.unwrap();
            assert_eq!(hits[0].item.response, response);
        }
    }

    #[tokio::test]
    async fn near_spelling_finds_the_greeting() {
        let mut store = memory_store().await;
        store
            .add_examples(vec![
                pair("kya haal hai", "theek hun yr"),
                pair("movie chalein?", "haan kab"),
            ])
            .await
            .unwrap();
        let hits = store.query("kya haal h", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.response, "theek hun yr");
    }

    #[tokio::test]
    async fn results_bounded_and_sorted() {
        let mut store = memory_store().await;
        store.add_examples(fixtures::sample_pairs()).await.unwrap();
        let hits = store.query("kya haal", 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));

        let all = store.query("kya haal", 100).await.unwrap();
        assert_eq!(all.len(), store.example_count());
    }

    #[tokio::test]
    async fn duplicate_sources_tie_in_insertion_order() {
        let mut store = memory_store().await;
        store
            .add_examples(vec![pair("same", "first"), pair("same", "second")])
            .await
            .unwrap();
        let hits = store.query("same", 2).await.unwrap();
        assert_eq!(hits[0].item.response, "first");
        assert_eq!(hits[1].item.response, "second");
    }

    #[tokio::test]
    async fn stores_do_not_share_entries() {
        let mut a = memory_store().await;
        let mut b = memory_store().await;
        a.add_example("only in a", "a").await.unwrap();
        b.add_example("only in b", "b").await.unwrap();
        let hits = a.query("only in b", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.response, "a");
    }

    #[tokio::test]
    async fn embeds_in_configured_batches() {
        let db = Database::open_in_memory().await.unwrap();
        let embedder = Arc::new(MockEmbedder::new());
        let mut store = open_store(&db, embedder.clone()).await.with_batch_size(3);
        let pairs: Vec<_> = (0..7).map(|i| pair(&format!("m{i}"), "r")).collect();
        store.add_examples(pairs).await.unwrap();
        assert_eq!(embedder.calls(), 3);
        assert_eq!(store.example_count(), 7);
    }

    #[tokio::test]
    async fn failed_embedding_writes_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        let mut store = ExampleStore::open(&db, Arc::new(MockEmbedder::failing()), MODEL)
            .await
            .unwrap();
        assert!(store.add_example("a", "b").await.is_err());
        assert!(store.is_empty());

        let reopened = open_store(&db, Arc::new(MockEmbedder::new())).await;
        assert!(reopened.is_empty());
    }

    #[tokio::test]
    async fn reopen_reuses_persisted_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mimic.db");
        {
            let db = Database::open(&path, true).await.unwrap();
            let mut store = open_store(&db, Arc::new(MockEmbedder::new())).await;
            store.add_examples(fixtures::sample_pairs()).await.unwrap();
            store
                .add_phrases(vec![PhraseCandidate {
                    text: "bas yr".into(),
                    frequency: 7,
                }])
                .await
                .unwrap();
            db.checkpoint().await.unwrap();
        }

        let db = Database::open(&path, true).await.unwrap();
        let embedder = Arc::new(MockEmbedder::new());
        let store = open_store(&db, embedder.clone()).await;
        assert_eq!(embedder.calls(), 0);
        assert_eq!(store.example_count(), fixtures::sample_pairs().len());
        assert_eq!(store.phrase_count(), 1);
        assert_eq!(store.dimensions(), Some(mimic_test_utils::mock_embedder::MOCK_DIMENSIONS));
        assert_eq!(store.examples()[0].source_message, "Aslam alikum");
    }

    #[tokio::test]
    async fn model_mismatch_is_unavailable() {
        let db = Database::open_in_memory().await.unwrap();
        let mut store = open_store(&db, Arc::new(MockEmbedder::new())).await;
        store.add_example("a", "b").await.unwrap();

        let err = ExampleStore::open(&db, Arc::new(MockEmbedder::new()), "onnx:other")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, MimicError::StoreUnavailable(_)));
        assert!(err.to_string().contains("--rebuild"));
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_on_load() {
        let db = Database::open_in_memory().await.unwrap();
        let mut store = open_store(&db, Arc::new(MockEmbedder::new())).await;
        store.add_example("good", "row").await.unwrap();
        db.connection()
            .call(|conn| -> rusqlite::Result<()> {
                conn.execute(
                    "INSERT INTO examples (source_message, response, embedding) VALUES ('bad', 'row', ?1)",
                    params![vec![0u8; 12]],
                )?;
                conn.execute(
                    "INSERT INTO examples (source_message, response, embedding) VALUES ('odd', 'row', ?1)",
                    params![vec![0u8; 3]],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let reopened = open_store(&db, Arc::new(MockEmbedder::new())).await;
        assert_eq!(reopened.example_count(), 1);
        let hits = reopened.query("bad", 5).await.unwrap();
        assert!(hits.iter().all(|h| h.item.source_message == "good"));
    }

    #[tokio::test]
    async fn phrases_upsert_by_text() {
        let mut store = memory_store().await;
        let first = store
            .add_phrases(vec![
                PhraseCandidate { text: "bas yr".into(), frequency: 5 },
                PhraseCandidate { text: "acha".into(), frequency: 6 },
            ])
            .await
            .unwrap();
        assert_eq!(first.len(), 2);

        store
            .add_phrases(vec![PhraseCandidate { text: "bas yr".into(), frequency: 9 }])
            .await
            .unwrap();
        assert_eq!(store.phrase_count(), 2);
        let hits = store.query_phrases("bas yr", 1).await.unwrap();
        assert_eq!(hits[0].item.text, "bas yr");
        assert_eq!(hits[0].item.frequency, 9);
    }

    #[tokio::test]
    async fn inspect_reports_counts_and_model() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(inspect_store(&db).await.unwrap(), StoreSummary::default());

        let mut store = open_store(&db, Arc::new(MockEmbedder::new())).await;
        store.add_example("hello", "hi").await.unwrap();
        let summary = inspect_store(&db).await.unwrap();
        assert_eq!(summary.examples, 1);
        assert_eq!(summary.phrases, 0);
        assert_eq!(summary.model.as_deref(), Some(MODEL));
    }

    #[tokio::test]
    async fn purge_unblocks_a_mismatched_store() {
        let db = Database::open_in_memory().await.unwrap();
        let mut store = open_store(&db, Arc::new(MockEmbedder::new())).await;
        store.add_example("hello", "hi").await.unwrap();
        drop(store);

        assert!(ExampleStore::open(&db, Arc::new(MockEmbedder::new()), "other-model")
            .await
            .is_err());
        purge_store(&db).await.unwrap();
        let store = ExampleStore::open(&db, Arc::new(MockEmbedder::new()), "other-model")
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_rows_and_model_record() {
        let db = Database::open_in_memory().await.unwrap();
        let mut store = open_store(&db, Arc::new(MockEmbedder::new())).await;
        store.add_examples(fixtures::sample_pairs()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimensions(), None);

        // A different model may now take over the cleared database.
        let other = ExampleStore::open(&db, Arc::new(MockEmbedder::new()), "onnx:other")
            .await
            .unwrap();
        assert!(other.is_empty());
    }
}
