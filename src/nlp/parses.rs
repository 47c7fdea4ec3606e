//! Engine backed by parser output produced ahead of time by an external NLP toolkit.
//!
//! Each line of the input is one document in the shape of spaCy's `Doc.to_json()`:
//! `{"text": ..., "ents": [{"start", "end", "label"}], "tokens": [{"id", "start",
//! "end", "pos", "dep", "head"}]}`. Offsets are in characters.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::EngineError;

use super::{EntitySpan, NlpEngine, Parse, Token};

#[derive(Debug, Deserialize)]
struct RawDoc {
    text: String,
    #[serde(default)]
    ents: Vec<RawEnt>,
    #[serde(default)]
    tokens: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
struct RawEnt {
    start: usize,
    end: usize,
    label: String,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    id: usize,
    start: usize,
    end: usize,
    #[serde(default)]
    pos: String,
    #[serde(default)]
    dep: String,
    head: usize,
}

/// Parses keyed by exact document text.
#[derive(Debug, Default)]
pub struct PrecomputedEngine {
    parses: HashMap<String, Parse>,
}

impl PrecomputedEngine {
    /// Load a JSON-lines parse file. Any malformed line fails the load.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading parse file {}", path.display()))?;
        let engine = Self::from_jsonl(&content)
            .with_context(|| format!("loading parse file {}", path.display()))?;
        info!(path = %path.display(), documents = engine.len(), "loaded precomputed parses");
        Ok(engine)
    }

    pub fn from_jsonl(content: &str) -> Result<Self, EngineError> {
        let mut parses = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let raw: RawDoc = serde_json::from_str(line)
                .map_err(|e| EngineError::Malformed(format!("line {}: {e}", line_no + 1)))?;
            let parse = convert(&raw)
                .map_err(|e| EngineError::Malformed(format!("line {}: {e}", line_no + 1)))?;
            if parses.insert(raw.text, parse).is_some() {
                warn!(line = line_no + 1, "duplicate document text; keeping the later parse");
            }
        }
        Ok(Self { parses })
    }

    pub fn insert(&mut self, text: impl Into<String>, parse: Parse) {
        self.parses.insert(text.into(), parse);
    }

    pub fn len(&self) -> usize {
        self.parses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }
}

impl NlpEngine for PrecomputedEngine {
    fn parse(&self, text: &str) -> Result<Parse, EngineError> {
        self.parses
            .get(text)
            .cloned()
            .ok_or_else(|| EngineError::NoParse(text.chars().count()))
    }
}

fn convert(raw: &RawDoc) -> Result<Parse, String> {
    let chars: Vec<char> = raw.text.chars().collect();
    let slice = |start: usize, end: usize| -> Result<String, String> {
        if start > end || end > chars.len() {
            return Err(format!("span {start}..{end} outside text of {} chars", chars.len()));
        }
        Ok(chars[start..end].iter().collect())
    };

    let entities = raw
        .ents
        .iter()
        .map(|ent| {
            Ok(EntitySpan {
                text: slice(ent.start, ent.end)?,
                label: ent.label.clone(),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    // Token ids may not be dense; map them onto positions.
    let positions: HashMap<usize, usize> = raw
        .tokens
        .iter()
        .enumerate()
        .map(|(pos, tok)| (tok.id, pos))
        .collect();
    let tokens = raw
        .tokens
        .iter()
        .map(|tok| {
            let head = *positions
                .get(&tok.head)
                .ok_or_else(|| format!("token {} points at unknown head {}", tok.id, tok.head))?;
            Ok(Token {
                text: slice(tok.start, tok.end)?,
                dep: tok.dep.clone(),
                head,
                pos: tok.pos.clone(),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(Parse { entities, tokens })
}
