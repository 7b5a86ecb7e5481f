//! Character templates and party instantiation.
//!
//! Templates are shared, read-only data. A battle deep-copies them into
//! [`Combatant`]s so nothing that happens in a battle leaks back into the
//! roster.

use crate::action::Skill;
use crate::config::BattleConfig;
use crate::effect::PassiveKind;
use crate::stats::BaseStats;

use super::{Combatant, InstanceId, PartyOrigin, Resources, Side};

/// Static definition of a playable character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterTemplate {
    pub id: String,
    pub name: String,
    pub base_stats: BaseStats,
    pub max_hp: u32,
    pub max_mp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<Skill>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub special: Option<Skill>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passive: Option<PassiveKind>,
}

impl CharacterTemplate {
    /// Builds a fresh combatant at full HP/MP.
    pub fn instantiate(&self, instance_id: InstanceId, side: Side) -> Combatant {
        let mut combatant = Combatant::new(
            self.id.clone(),
            self.name.clone(),
            instance_id,
            side,
            self.base_stats.clone(),
            Resources::full(self.max_hp, self.max_mp),
        )
        .with_skills(self.skills.clone());
        combatant.special = self.special.clone();
        combatant.passive = self.passive;
        combatant
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PartyError {
    #[error("party is empty")]
    Empty,
    #[error("party has {size} members (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// Instantiates a party. Slots follow roster order, so both peers of a
/// networked match derive the same instance ids from the same roster.
pub fn instantiate_party(
    templates: &[CharacterTemplate],
    origin: PartyOrigin,
    side: Side,
) -> Result<Vec<Combatant>, PartyError> {
    if templates.is_empty() {
        return Err(PartyError::Empty);
    }
    if templates.len() > BattleConfig::MAX_PARTY_SIZE {
        return Err(PartyError::TooLarge {
            size: templates.len(),
            max: BattleConfig::MAX_PARTY_SIZE,
        });
    }

    Ok(templates
        .iter()
        .enumerate()
        .map(|(slot, template)| template.instantiate(InstanceId::new(origin, slot as u8), side))
        .collect())
}
