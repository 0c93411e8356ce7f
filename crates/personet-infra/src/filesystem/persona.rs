//! Persona documents read from JSON files on disk.
//!
//! Layout under the data directory:
//!
//! ```text
//! {data_dir}/user_info/{user}.json       tag persona
//! {data_dir}/user_info/{user}_Per.json   episodic persona
//! ```
//!
//! Files are re-read on every load; caching is the session registry's job.

use std::path::{Path, PathBuf};

use personet_core::repository::PersonaSource;
use personet_types::error::RepositoryError;
use personet_types::persona::{EpisodicPersona, PersonaDocument, PersonaVariant, TagPersona};

/// Filesystem-backed implementation of `PersonaSource`.
pub struct FsPersonaSource {
    root: PathBuf,
}

impl FsPersonaSource {
    /// Create a source rooted at the given data directory. Persona files
    /// live in its `user_info/` subdirectory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root: data_dir.as_ref().join("user_info"),
        }
    }

    fn path_for(&self, user_id: &str, variant: PersonaVariant) -> PathBuf {
        match variant {
            PersonaVariant::Tag => self.root.join(format!("{user_id}.json")),
            PersonaVariant::Episodic => self.root.join(format!("{user_id}_Per.json")),
        }
    }
}

impl PersonaSource for FsPersonaSource {
    async fn load(
        &self,
        user_id: &str,
        variant: PersonaVariant,
    ) -> Result<Option<PersonaDocument>, RepositoryError> {
        let path = self.path_for(user_id, variant);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(RepositoryError::Io(format!(
                    "reading {}: {err}",
                    path.display()
                )));
            }
        };

        let document = match variant {
            PersonaVariant::Tag => {
                let persona: TagPersona = serde_json::from_str(&content).map_err(|e| {
                    RepositoryError::Serialization(format!("parsing {}: {e}", path.display()))
                })?;
                PersonaDocument::Tag(persona)
            }
            PersonaVariant::Episodic => {
                let persona: EpisodicPersona = serde_json::from_str(&content).map_err(|e| {
                    RepositoryError::Serialization(format!("parsing {}: {e}", path.display()))
                })?;
                PersonaDocument::Episodic(persona)
            }
        };

        Ok(Some(document))
    }
}
