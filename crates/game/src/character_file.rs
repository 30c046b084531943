use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{write_text_atomic, Millis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::WorldId;

const CHARACTER_FILE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub(crate) enum CharacterFileError {
    #[error("failed to read character file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse character file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("character file {path} has version {found}, expected {expected}")]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("failed to encode character file: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write character file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CharacterFile {
    pub(crate) version: u32,
    pub(crate) money: u32,
    pub(crate) total_time_played_ms: u64,
    pub(crate) world: WorldId,
}

impl CharacterFile {
    pub(crate) fn new_hero() -> Self {
        Self {
            version: CHARACTER_FILE_VERSION,
            money: 0,
            total_time_played_ms: 0,
            world: WorldId::Town,
        }
    }

    pub(crate) fn total_time_played(&self) -> Millis {
        Millis(self.total_time_played_ms)
    }
}

/// A missing file is not an error: it means a new hero has to be created.
pub(crate) fn load_character_file(path: &Path) -> Result<Option<CharacterFile>, CharacterFileError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CharacterFileError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    let character: CharacterFile = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| CharacterFileError::Parse {
            path: path.to_path_buf(),
            field: error.path().to_string(),
            source: error.into_inner(),
        })?;
    if character.version != CHARACTER_FILE_VERSION {
        return Err(CharacterFileError::Version {
            path: path.to_path_buf(),
            found: character.version,
            expected: CHARACTER_FILE_VERSION,
        });
    }
    Ok(Some(character))
}

pub(crate) fn save_character_file(
    path: &Path,
    character: &CharacterFile,
) -> Result<(), CharacterFileError> {
    let json = serde_json::to_string_pretty(character).map_err(CharacterFileError::Encode)?;
    write_text_atomic(path, &json).map_err(|source| CharacterFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
