//! Character passive abilities.
//!
//! A passive is keyed by [`PassiveKind`] and resolved through a typed
//! [`PassiveRegistry`], so a character naming an unregistered passive simply
//! has none instead of failing on a string lookup.
//!
//! Triggered passives run at most once per round per combatant. The guard is
//! the combatant's own [`PassiveMarks`](crate::state::PassiveMarks), checked
//! by the tick driver before calling the hook.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::combat::CombatEvent;
use crate::config::BattleConfig;
use crate::log::LogEntry;
use crate::state::{InstanceId, Parties, StatusEffect, StatusEffectKind};
use crate::stats::StatKind;

use super::{apply_status, receive_heal};

/// Flat DEF granted by iron skin.
pub const IRON_SKIN_DEF: i32 = 10;
/// Flat SPD granted by swift.
pub const SWIFT_SPD: i32 = 10;
/// ATK factor rally grants to every living ally, for the current round.
pub const RALLY_ATK_PCT: i32 = 115;
/// Max-HP percent healed by regenerator at round start.
pub const REGENERATOR_PCT: u32 = 8;
/// Max-HP percent healed by self-repair at round end.
pub const SELF_REPAIR_PCT: u32 = 10;
/// Extra critical damage from assassin, in percent.
pub const ASSASSIN_CRIT_PCT: u32 = 125;
/// Outgoing damage factor from brutal, in percent.
pub const BRUTAL_PCT: u32 = 115;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum PassiveKind {
    /// Round start: living allies gain an ATK buff for the round.
    Rally,
    /// Round start: heals a share of max HP.
    Regenerator,
    /// Round end: heals a share of max HP.
    SelfRepair,
    /// Flat DEF bonus.
    IronSkin,
    /// Flat SPD bonus.
    Swift,
    /// Critical hits deal extra damage.
    Assassin,
    /// All outgoing damage is increased.
    Brutal,
}

/// Mutable view handed to triggered passives.
pub struct PassiveContext<'a> {
    pub owner: InstanceId,
    pub parties: &'a mut Parties,
    pub round: u32,
    pub config: &'a BattleConfig,
    pub events: &'a mut Vec<CombatEvent>,
    pub log: &'a mut Vec<LogEntry>,
}

impl PassiveContext<'_> {
    /// Heals the owner by a percentage of its max HP.
    fn heal_owner_pct(&mut self, percent: u32, label: &str) {
        let Some(owner) = self.parties.get_mut(self.owner) else {
            return;
        };
        let amount = (owner.resources().max_hp() as u64 * percent as u64 / 100).max(1) as u32;
        let healed = receive_heal(owner, amount, self.config);
        if healed > 0 {
            self.events.push(CombatEvent::Healed {
                target: self.owner,
                amount: healed,
            });
            self.log
                .push(LogEntry::heal(format!("{}'s {label} restores {healed} HP", owner.name)));
        }
    }
}

/// Behaviour attached to a [`PassiveKind`].
///
/// Every hook has a neutral default so a passive only overrides what it
/// actually does.
pub trait Passive: Send + Sync {
    fn kind(&self) -> PassiveKind;

    /// Flat bonus folded into effective stats after percentage modifiers.
    fn stat_bonus(&self, _stat: StatKind) -> i32 {
        0
    }

    fn on_round_start(&self, _ctx: &mut PassiveContext<'_>) {}

    fn on_round_end(&self, _ctx: &mut PassiveContext<'_>) {}

    /// Adjusts damage after a critical roll succeeded.
    fn modify_critical(&self, damage: u32) -> u32 {
        damage
    }

    /// Adjusts every outgoing hit, after critical handling.
    fn modify_outgoing(&self, damage: u32) -> u32 {
        damage
    }
}

struct Rally;

impl Passive for Rally {
    fn kind(&self) -> PassiveKind {
        PassiveKind::Rally
    }

    fn on_round_start(&self, ctx: &mut PassiveContext<'_>) {
        let allies = ctx.parties.friends_of(ctx.owner);
        for ally in allies {
            if let Some(target) = ctx.parties.get_mut(ally) {
                let effect = StatusEffect::new(StatusEffectKind::Buff(StatKind::Atk), 1, RALLY_ATK_PCT)
                    .with_source(ctx.owner);
                apply_status(target, effect, ctx.events, ctx.log);
            }
        }
    }
}

struct Regenerator;

impl Passive for Regenerator {
    fn kind(&self) -> PassiveKind {
        PassiveKind::Regenerator
    }

    fn on_round_start(&self, ctx: &mut PassiveContext<'_>) {
        ctx.heal_owner_pct(REGENERATOR_PCT, "regenerator");
    }
}

struct SelfRepair;

impl Passive for SelfRepair {
    fn kind(&self) -> PassiveKind {
        PassiveKind::SelfRepair
    }

    fn on_round_end(&self, ctx: &mut PassiveContext<'_>) {
        ctx.heal_owner_pct(SELF_REPAIR_PCT, "self-repair");
    }
}

struct IronSkin;

impl Passive for IronSkin {
    fn kind(&self) -> PassiveKind {
        PassiveKind::IronSkin
    }

    fn stat_bonus(&self, stat: StatKind) -> i32 {
        if stat == StatKind::Def { IRON_SKIN_DEF } else { 0 }
    }
}

struct Swift;

impl Passive for Swift {
    fn kind(&self) -> PassiveKind {
        PassiveKind::Swift
    }

    fn stat_bonus(&self, stat: StatKind) -> i32 {
        if stat == StatKind::Spd { SWIFT_SPD } else { 0 }
    }
}

struct Assassin;

impl Passive for Assassin {
    fn kind(&self) -> PassiveKind {
        PassiveKind::Assassin
    }

    fn modify_critical(&self, damage: u32) -> u32 {
        (damage as u64 * ASSASSIN_CRIT_PCT as u64 / 100) as u32
    }
}

struct Brutal;

impl Passive for Brutal {
    fn kind(&self) -> PassiveKind {
        PassiveKind::Brutal
    }

    fn modify_outgoing(&self, damage: u32) -> u32 {
        (damage as u64 * BRUTAL_PCT as u64 / 100) as u32
    }
}

/// Lookup table from passive kind to behaviour.
#[derive(Clone, Default)]
pub struct PassiveRegistry {
    table: BTreeMap<PassiveKind, Arc<dyn Passive>>,
}

impl PassiveRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in passive.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Rally));
        registry.register(Arc::new(Regenerator));
        registry.register(Arc::new(SelfRepair));
        registry.register(Arc::new(IronSkin));
        registry.register(Arc::new(Swift));
        registry.register(Arc::new(Assassin));
        registry.register(Arc::new(Brutal));
        registry
    }

    /// Adds or replaces the behaviour for `passive.kind()`.
    pub fn register(&mut self, passive: Arc<dyn Passive>) {
        self.table.insert(passive.kind(), passive);
    }

    pub fn get(&self, kind: PassiveKind) -> Option<&dyn Passive> {
        self.table.get(&kind).map(|p| p.as_ref())
    }

    pub fn contains(&self, kind: PassiveKind) -> bool {
        self.table.contains_key(&kind)
    }
}

impl core::fmt::Debug for PassiveRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = PassiveRegistry::standard();
        for kind in PassiveKind::iter() {
            let passive = registry.get(kind).unwrap();
            assert_eq!(passive.kind(), kind);
        }
    }

    #[test]
    fn flat_bonuses_target_one_stat() {
        let registry = PassiveRegistry::standard();
        let iron = registry.get(PassiveKind::IronSkin).unwrap();
        assert_eq!(iron.stat_bonus(StatKind::Def), IRON_SKIN_DEF);
        assert_eq!(iron.stat_bonus(StatKind::Atk), 0);
    }

    #[test]
    fn brutal_scales_outgoing_damage() {
        let registry = PassiveRegistry::standard();
        let brutal = registry.get(PassiveKind::Brutal).unwrap();
        assert_eq!(brutal.modify_outgoing(100), 115);
        assert_eq!(brutal.modify_critical(100), 100);
    }

    #[test]
    fn empty_registry_has_no_behaviour() {
        assert!(PassiveRegistry::empty().get(PassiveKind::Rally).is_none());
    }
}
