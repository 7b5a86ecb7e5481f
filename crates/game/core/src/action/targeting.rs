//! Target resolution.
//!
//! Single-target scopes are resolved once, before anything is spent.
//! "All" scopes are kept symbolic and expanded on every hit, so a combatant
//! defeated by the first hit of a multi-hit skill is not hit again.

use crate::state::{Combatant, InstanceId, Parties, StatusEffectKind};

use super::skill::TargetScope;
use super::ActionError;

/// Targets of one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSet {
    Single(InstanceId),
    AllEnemies,
    AllAllies,
    Caster,
}

impl TargetSet {
    /// Current members of the set. Defeated combatants are excluded except
    /// for an explicit single target (revive needs them).
    pub fn expand(&self, parties: &Parties, caster: InstanceId) -> Vec<InstanceId> {
        match *self {
            TargetSet::Single(id) => vec![id],
            TargetSet::AllEnemies => parties.enemies_of(caster),
            TargetSet::AllAllies => parties.friends_of(caster),
            TargetSet::Caster => vec![caster],
        }
    }
}

/// Resolved targets plus the taunt redirect that produced them, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Targeting {
    pub set: TargetSet,
    pub redirected_from: Option<InstanceId>,
}

/// Validates the declared target against the scope.
pub fn resolve_targets(
    parties: &Parties,
    caster: &Combatant,
    scope: TargetScope,
    declared: Option<InstanceId>,
) -> Result<Targeting, ActionError> {
    let plain = |set| Targeting {
        set,
        redirected_from: None,
    };

    let lookup = || declared_target(parties, caster.instance_id, declared);

    match scope {
        TargetScope::AllEnemies => Ok(plain(TargetSet::AllEnemies)),
        TargetScope::AllAllies => Ok(plain(TargetSet::AllAllies)),
        TargetScope::Caster => Ok(plain(TargetSet::Caster)),
        TargetScope::SingleEnemy => {
            let (id, target, same_party) = lookup()?;
            if same_party {
                return Err(ActionError::invalid_target(format!(
                    "{} is not an enemy",
                    target.name
                )));
            }
            if target.is_defeated() {
                return Err(ActionError::invalid_target(format!(
                    "{} is already defeated",
                    target.name
                )));
            }
            Ok(match taunter(parties, target) {
                Some(taunter) => Targeting {
                    set: TargetSet::Single(taunter),
                    redirected_from: Some(id),
                },
                None => plain(TargetSet::Single(id)),
            })
        }
        TargetScope::SingleAlly => {
            let (id, target, same_party) = lookup()?;
            if !same_party {
                return Err(ActionError::invalid_target(format!(
                    "{} is not an ally",
                    target.name
                )));
            }
            if target.is_defeated() {
                return Err(ActionError::invalid_target(format!(
                    "{} is already defeated",
                    target.name
                )));
            }
            Ok(plain(TargetSet::Single(id)))
        }
        TargetScope::DefeatedAlly => {
            let (id, target, same_party) = lookup()?;
            if !same_party || target.is_alive() {
                return Err(ActionError::invalid_target(format!(
                    "{} is not a defeated ally",
                    target.name
                )));
            }
            Ok(plain(TargetSet::Single(id)))
        }
    }
}

fn declared_target(
    parties: &Parties,
    caster: InstanceId,
    declared: Option<InstanceId>,
) -> Result<(InstanceId, &Combatant, bool), ActionError> {
    let id = declared.ok_or_else(|| ActionError::invalid_target("this action needs a target"))?;
    let target = parties
        .get(id)
        .ok_or(ActionError::MissingParticipant(id))?;
    Ok((id, target, id.origin == caster.origin))
}

/// A living taunter in the target's party other than the target itself.
pub fn taunter(parties: &Parties, target: &Combatant) -> Option<InstanceId> {
    if target.has_effect(StatusEffectKind::Taunt) {
        return None;
    }
    parties
        .living_in(target.instance_id.origin)
        .find(|c| c.has_effect(StatusEffectKind::Taunt))
        .map(|c| c.instance_id)
}
