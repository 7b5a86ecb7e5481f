//! Declared, not-yet-resolved actions.
//!
//! An [`ActionIntent`] is what a participant sends over the wire and what the
//! resolver consumes. It carries no outcome.

use crate::state::InstanceId;

use super::ActionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Defend,
    Skill,
    Special,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionIntent {
    pub actor: InstanceId,
    pub kind: ActionKind,
    /// Present iff `kind` is `skill` or `special`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skill_name: Option<String>,
    /// `None` for defend, self and all-target actions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<InstanceId>,
}

impl ActionIntent {
    pub fn attack(actor: InstanceId, target: InstanceId) -> Self {
        Self {
            actor,
            kind: ActionKind::Attack,
            skill_name: None,
            target: Some(target),
        }
    }

    pub fn defend(actor: InstanceId) -> Self {
        Self {
            actor,
            kind: ActionKind::Defend,
            skill_name: None,
            target: None,
        }
    }

    pub fn skill(actor: InstanceId, name: impl Into<String>, target: Option<InstanceId>) -> Self {
        Self {
            actor,
            kind: ActionKind::Skill,
            skill_name: Some(name.into()),
            target,
        }
    }

    pub fn special(actor: InstanceId, name: impl Into<String>, target: Option<InstanceId>) -> Self {
        Self {
            actor,
            kind: ActionKind::Special,
            skill_name: Some(name.into()),
            target,
        }
    }

    /// Checks that the optional fields match the kind.
    pub fn validate_shape(&self) -> Result<(), ActionError> {
        match (self.kind, &self.skill_name) {
            (ActionKind::Skill | ActionKind::Special, None) => Err(ActionError::MalformedIntent(
                format!("{} requires a skill name", self.kind),
            )),
            (ActionKind::Attack | ActionKind::Defend, Some(_)) => Err(
                ActionError::MalformedIntent(format!("{} does not take a skill name", self.kind)),
            ),
            (ActionKind::Attack, None) if self.target.is_none() => Err(
                ActionError::MalformedIntent("attack requires a target".into()),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_valid_shapes() {
        let actor = InstanceId::host(0);
        assert!(ActionIntent::attack(actor, InstanceId::guest(0)).validate_shape().is_ok());
        assert!(ActionIntent::defend(actor).validate_shape().is_ok());
        assert!(ActionIntent::skill(actor, "fireball", None).validate_shape().is_ok());
    }

    #[test]
    fn mismatched_fields_are_malformed() {
        let actor = InstanceId::host(0);
        let mut intent = ActionIntent::defend(actor);
        intent.skill_name = Some("heal".into());
        assert!(matches!(
            intent.validate_shape(),
            Err(ActionError::MalformedIntent(_))
        ));

        let mut intent = ActionIntent::skill(actor, "heal", None);
        intent.skill_name = None;
        assert!(intent.validate_shape().is_err());

        let mut intent = ActionIntent::attack(actor, InstanceId::guest(0));
        intent.target = None;
        assert!(intent.validate_shape().is_err());
    }
}
