use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use icu_normalizer::ComposingNormalizerBorrowed;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Embed)]
#[folder = "assets/passages/"]
struct PassageAssets;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read passage catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("passage catalog {0} contains no passages")]
    Empty(String),
    #[error("duplicate passage id {0:?}")]
    DuplicateId(String),
}

/// Index of a passage in its catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassageId(pub usize);

impl fmt::Display for PassageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub title: String,
    /// Markup: `{...}` marks hidden spans.
    pub content: String,
}

#[derive(Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    passage: Vec<Passage>,
}

#[derive(Clone, Debug)]
pub struct PassageCatalog {
    passages: Vec<Passage>,
    source: String,
}

impl PassageCatalog {
    pub fn new(passages: Vec<Passage>, source: impl Into<String>) -> Result<Self, CatalogError> {
        let source = source.into();
        if passages.is_empty() {
            return Err(CatalogError::Empty(source));
        }

        let mut seen = HashSet::new();
        for p in &passages {
            if !seen.insert(p.id.as_str()) {
                return Err(CatalogError::DuplicateId(p.id.clone()));
            }
        }

        let nfc = ComposingNormalizerBorrowed::new_nfc();
        let passages = passages
            .into_iter()
            .map(|p| Passage {
                content: nfc.normalize(&p.content).into_owned(),
                ..p
            })
            .collect();

        Ok(Self { passages, source })
    }

    /// Passages compiled into the binary, one TOML file each, in file name order.
    pub fn bundled() -> Result<Self, CatalogError> {
        let mut names: Vec<String> = PassageAssets::iter()
            .filter(|f| f.ends_with(".toml"))
            .map(|f| f.to_string())
            .collect();
        names.sort();

        let mut passages = Vec::with_capacity(names.len());
        for name in names {
            let Some(file) = PassageAssets::get(&name) else {
                continue;
            };
            let content = String::from_utf8_lossy(file.data.as_ref());
            let passage: Passage = toml::from_str(&content).map_err(|source| CatalogError::Toml {
                origin: name.clone(),
                source,
            })?;
            passages.push(passage);
        }

        Self::new(passages, "bundled")
    }

    /// Load a user catalog: a JSON array of passages, or TOML with `[[passage]]` tables.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let passages = if is_json {
            serde_json::from_str::<Vec<Passage>>(&content).map_err(|source| CatalogError::Json {
                origin: origin.clone(),
                source,
            })?
        } else {
            toml::from_str::<TomlCatalog>(&content)
                .map_err(|source| CatalogError::Toml {
                    origin: origin.clone(),
                    source,
                })?
                .passage
        };

        Self::new(passages, origin)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn get(&self, id: PassageId) -> Option<&Passage> {
        self.passages.get(id.0)
    }

    pub fn find_by_id(&self, id: &str) -> Option<PassageId> {
        self.passages.iter().position(|p| p.id == id).map(PassageId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PassageId, &Passage)> {
        self.passages.iter().enumerate().map(|(i, p)| (PassageId(i), p))
    }
}
