//! Natural language processing layer: the engine boundary and per-document extraction.

pub mod classify;
pub mod ner;
pub mod parses;
pub mod relations;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{data::Document, error::EngineError};

use self::relations::Relationship;

/// Entity labels the pipeline cares about. Engines may emit others.
pub mod labels {
    pub const GPE: &str = "GPE";
    pub const PERSON: &str = "PERSON";
    pub const ORG: &str = "ORG";
}

/// Dependency roles and part-of-speech tags used by relationship extraction.
pub mod roles {
    pub const NOMINAL_SUBJECT: &str = "nsubj";
    pub const NOMINAL_SUBJECT_PASSIVE: &str = "nsubjpass";
    pub const DIRECT_OBJECT: &str = "dobj";
    pub const ATTRIBUTE: &str = "attr";
    pub const VERB: &str = "VERB";
}

/// A named entity mention: surface text plus engine label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Entity span as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
}

/// A token with its dependency arc. `head` indexes into the owning parse's tokens;
/// the root token points at itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub dep: String,
    pub head: usize,
    pub pos: String,
}

/// Everything the core needs from an engine for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parse {
    pub entities: Vec<EntitySpan>,
    pub tokens: Vec<Token>,
}

impl Parse {
    /// Head token of `idx`, if the arc points inside the parse.
    pub fn head_of(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(self.tokens.get(idx)?.head)
    }

    /// Children of `head` in sentence order, excluding the head itself.
    pub fn children(&self, head: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(idx, token)| token.head == head && *idx != head)
            .map(|(_, token)| token)
    }
}

/// Trait for tokenizer/tagger/parser/NER backends.
pub trait NlpEngine: Send + Sync {
    fn parse(&self, text: &str) -> Result<Parse, EngineError>;
}

/// A document with its extracted entities and relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub document: Document,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

/// A document the engine could not parse.
#[derive(Debug)]
pub struct DocumentFailure {
    pub id: usize,
    pub error: EngineError,
}

/// Parse one document and run both extractors over the result.
pub fn annotate_document(
    engine: &dyn NlpEngine,
    document: Document,
) -> Result<AnnotatedDocument, EngineError> {
    let parse = engine.parse(&document.raw_text)?;
    let entities = ner::extract_entities(&parse);
    let relationships = relations::extract_relationships(&parse);
    Ok(AnnotatedDocument {
        document,
        entities,
        relationships,
    })
}

/// Annotate a batch on blocking workers with bounded concurrency.
///
/// Results come back in input order, one per document.
pub async fn annotate(
    engine: Arc<dyn NlpEngine>,
    documents: Vec<Document>,
    concurrency: usize,
) -> Vec<Result<AnnotatedDocument, DocumentFailure>> {
    info!(documents = documents.len(), concurrency, "annotating batch");
    let results: Vec<_> = stream::iter(documents)
        .map(|document| {
            let engine = Arc::clone(&engine);
            async move {
                let id = document.id;
                let joined =
                    tokio::task::spawn_blocking(move || annotate_document(engine.as_ref(), document))
                        .await;
                match joined {
                    Ok(Ok(annotated)) => Ok(annotated),
                    Ok(Err(error)) => Err(DocumentFailure { id, error }),
                    Err(join) => Err(DocumentFailure {
                        id,
                        error: EngineError::Worker(join.to_string()),
                    }),
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, "some documents could not be parsed");
    }
    debug!(total = results.len(), "annotation finished");
    results
}
