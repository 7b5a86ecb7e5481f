//! Structured record of what an action or tick changed.

use crate::state::{InstanceId, ResourcePool, StatusEffectKind};

/// One observable state change. Consumers (runtime event bus, UI) read these
/// instead of diffing sessions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum CombatEvent {
    Attacked {
        attacker: InstanceId,
        target: InstanceId,
        damage: u32,
        critical: bool,
        dodged: bool,
        blocked: bool,
    },
    /// Over-time or self-inflicted damage with no attacker.
    Damaged {
        target: InstanceId,
        amount: u32,
    },
    Healed {
        target: InstanceId,
        amount: u32,
    },
    StatusApplied {
        target: InstanceId,
        kind: StatusEffectKind,
        stacks: u32,
    },
    StatusRemoved {
        target: InstanceId,
        kind: StatusEffectKind,
    },
    ResourceSpent {
        actor: InstanceId,
        pool: ResourcePool,
        amount: u32,
    },
    /// A taunt pulled a single-target action onto another combatant.
    Redirected {
        from: InstanceId,
        to: InstanceId,
    },
    Defended {
        actor: InstanceId,
    },
    Defeated {
        target: InstanceId,
    },
    Revived {
        target: InstanceId,
        hp: u32,
    },
}
