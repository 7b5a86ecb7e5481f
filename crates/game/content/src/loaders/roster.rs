//! Character roster loader.
//!
//! Loads playable characters from RON files and checks them before any battle
//! gets to see them.

use std::collections::BTreeSet;
use std::path::Path;

use battle_core::{BattleConfig, CharacterTemplate};

use crate::loaders::{LoadResult, read_file};

/// Roster shipped with the crate.
const EMBEDDED_ROSTER: &str = include_str!("../../data/roster.ron");

/// Validated set of character templates, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    characters: Vec<CharacterTemplate>,
}

impl Roster {
    /// Wraps templates after checking ids and skill lists.
    pub fn new(characters: Vec<CharacterTemplate>) -> LoadResult<Self> {
        let mut ids = BTreeSet::new();
        for character in &characters {
            if character.id.is_empty() {
                anyhow::bail!("character '{}' has an empty id", character.name);
            }
            if !ids.insert(character.id.as_str()) {
                anyhow::bail!("duplicate character id '{}'", character.id);
            }
            if character.max_hp == 0 {
                anyhow::bail!("character '{}' has no hit points", character.id);
            }
            if character.skills.len() > BattleConfig::MAX_SKILLS {
                anyhow::bail!(
                    "character '{}' has {} skills (max: {})",
                    character.id,
                    character.skills.len(),
                    BattleConfig::MAX_SKILLS
                );
            }
            let mut names = BTreeSet::new();
            for skill in character.skills.iter().chain(character.special.iter()) {
                if !names.insert(skill.name.as_str()) {
                    anyhow::bail!(
                        "character '{}' declares skill '{}' twice",
                        character.id,
                        skill.name
                    );
                }
            }
        }
        Ok(Self { characters })
    }

    pub fn get(&self, id: &str) -> Option<&CharacterTemplate> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Picks templates by id, keeping the requested order.
    pub fn party(&self, ids: &[&str]) -> LoadResult<Vec<CharacterTemplate>> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("unknown character id '{}'", id))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CharacterTemplate> {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn into_inner(self) -> Vec<CharacterTemplate> {
        self.characters
    }
}

/// Loader for character rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load a roster from a RON file.
    ///
    /// RON format: `Vec<CharacterTemplate>`
    pub fn load(path: &Path) -> LoadResult<Roster> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load roster {}: {}", path.display(), e))
    }

    /// Parse roster RON text.
    pub fn parse(content: &str) -> LoadResult<Roster> {
        let characters: Vec<CharacterTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;
        Roster::new(characters)
    }

    /// The roster compiled into the crate.
    pub fn load_embedded() -> LoadResult<Roster> {
        Self::parse(EMBEDDED_ROSTER)
    }
}
