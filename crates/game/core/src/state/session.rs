//! Battle session: the single value every battle operation reads and writes.
//!
//! A session is owned by exactly one driver per participant. Nothing in this
//! crate keeps battle state anywhere else.

use super::{Combatant, InstanceId, PartyOrigin};

/// Which side of a networked match computes outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AuthorityRole {
    Host,
    Follower,
}

impl AuthorityRole {
    /// Party origin owned by this role.
    pub const fn origin(self) -> PartyOrigin {
        match self {
            AuthorityRole::Host => PartyOrigin::Host,
            AuthorityRole::Follower => PartyOrigin::Guest,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattleMode {
    /// One participant controls both sides.
    Local,
    Networked { role: AuthorityRole },
}

impl BattleMode {
    /// Whether this participant resolves actions.
    pub const fn is_authoritative(self) -> bool {
        !matches!(
            self,
            BattleMode::Networked {
                role: AuthorityRole::Follower
            }
        )
    }
}

/// Result from one participant's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum BattleOutcome {
    Win,
    Lose,
    Draw,
}

impl BattleOutcome {
    /// The same result seen from the other participant.
    pub const fn invert(self) -> Self {
        match self {
            BattleOutcome::Win => BattleOutcome::Lose,
            BattleOutcome::Lose => BattleOutcome::Win,
            BattleOutcome::Draw => BattleOutcome::Draw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResolutionReason {
    /// One or both sides ran out of living members.
    Defeat,
    /// The peer disconnected or timed out.
    Forfeit,
    /// The local participant left.
    Abandoned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub outcome: BattleOutcome,
    pub reason: ResolutionReason,
}

impl Resolution {
    pub const fn new(outcome: BattleOutcome, reason: ResolutionReason) -> Self {
        Self { outcome, reason }
    }
}

/// `Forming → Active → Resolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattlePhase {
    Forming,
    Active,
    Resolved(Resolution),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session is not forming (phase: {phase:?})")]
    NotForming { phase: BattlePhase },
    #[error("{origin:?} party is missing")]
    MissingParty { origin: PartyOrigin },
    #[error("{origin:?} party was already set")]
    PartyAlreadySet { origin: PartyOrigin },
    #[error("combatant {id} does not belong to the {origin:?} party")]
    ForeignCombatant { id: InstanceId, origin: PartyOrigin },
}

/// Both rosters, keyed by absolute origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parties {
    pub host: Vec<Combatant>,
    pub guest: Vec<Combatant>,
}

impl Parties {
    pub fn party(&self, origin: PartyOrigin) -> &[Combatant] {
        match origin {
            PartyOrigin::Host => &self.host,
            PartyOrigin::Guest => &self.guest,
        }
    }

    pub fn party_mut(&mut self, origin: PartyOrigin) -> &mut Vec<Combatant> {
        match origin {
            PartyOrigin::Host => &mut self.host,
            PartyOrigin::Guest => &mut self.guest,
        }
    }

    pub fn get(&self, id: InstanceId) -> Option<&Combatant> {
        self.party(id.origin).iter().find(|c| c.instance_id == id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Combatant> {
        self.party_mut(id.origin)
            .iter_mut()
            .find(|c| c.instance_id == id)
    }

    /// Every combatant, host party first, in slot order.
    pub fn all(&self) -> impl Iterator<Item = &Combatant> {
        self.host.iter().chain(self.guest.iter())
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.host.iter_mut().chain(self.guest.iter_mut())
    }

    pub fn living(&self) -> impl Iterator<Item = &Combatant> {
        self.all().filter(|c| c.is_alive())
    }

    pub fn living_in(&self, origin: PartyOrigin) -> impl Iterator<Item = &Combatant> {
        self.party(origin).iter().filter(|c| c.is_alive())
    }

    /// Living ids of the party `id` belongs to.
    pub fn friends_of(&self, id: InstanceId) -> Vec<InstanceId> {
        self.living_in(id.origin).map(|c| c.instance_id).collect()
    }

    /// Living ids of the party opposing `id`.
    pub fn enemies_of(&self, id: InstanceId) -> Vec<InstanceId> {
        self.living_in(id.origin.other())
            .map(|c| c.instance_id)
            .collect()
    }

    pub fn has_living(&self, origin: PartyOrigin) -> bool {
        self.living_in(origin).next().is_some()
    }
}

/// One participant's view of a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSession {
    pub parties: Parties,
    /// Party controlled by this participant.
    pub local: PartyOrigin,
    /// Completed rounds.
    pub round: u32,
    pub phase: BattlePhase,
    pub mode: BattleMode,
    /// Combatant whose action is currently being requested or resolved.
    pub acting: Option<InstanceId>,
}

impl BattleSession {
    /// An empty session waiting for both rosters.
    pub fn forming(mode: BattleMode) -> Self {
        let local = match mode {
            BattleMode::Local => PartyOrigin::Host,
            BattleMode::Networked { role } => role.origin(),
        };
        Self {
            parties: Parties::default(),
            local,
            round: 0,
            phase: BattlePhase::Forming,
            mode,
            acting: None,
        }
    }

    /// A local match with both rosters already instantiated, ready to start.
    pub fn local(own: Vec<Combatant>, opponent: Vec<Combatant>) -> Result<Self, SessionError> {
        let mut session = Self::forming(BattleMode::Local);
        session.set_party(PartyOrigin::Host, own)?;
        session.set_party(PartyOrigin::Guest, opponent)?;
        Ok(session)
    }

    /// Installs one roster while forming. Each roster is set exactly once.
    pub fn set_party(
        &mut self,
        origin: PartyOrigin,
        members: Vec<Combatant>,
    ) -> Result<(), SessionError> {
        if self.phase != BattlePhase::Forming {
            return Err(SessionError::NotForming { phase: self.phase });
        }
        if !self.parties.party(origin).is_empty() {
            return Err(SessionError::PartyAlreadySet { origin });
        }
        if let Some(foreign) = members.iter().find(|c| c.instance_id.origin != origin) {
            return Err(SessionError::ForeignCombatant {
                id: foreign.instance_id,
                origin,
            });
        }
        *self.parties.party_mut(origin) = members;
        Ok(())
    }

    pub fn has_party(&self, origin: PartyOrigin) -> bool {
        !self.parties.party(origin).is_empty()
    }

    /// `Forming → Active`, once both rosters are present.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != BattlePhase::Forming {
            return Err(SessionError::NotForming { phase: self.phase });
        }
        for origin in [PartyOrigin::Host, PartyOrigin::Guest] {
            if !self.has_party(origin) {
                return Err(SessionError::MissingParty { origin });
            }
        }
        self.phase = BattlePhase::Active;
        Ok(())
    }

    /// Moves to `Resolved`. The first resolution wins; later calls are ignored
    /// and return the resolution already recorded.
    pub fn resolve(&mut self, resolution: Resolution) -> Resolution {
        if let BattlePhase::Resolved(existing) = self.phase {
            return existing;
        }
        self.phase = BattlePhase::Resolved(resolution);
        self.acting = None;
        resolution
    }

    pub fn is_active(&self) -> bool {
        self.phase == BattlePhase::Active
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, BattlePhase::Resolved(_))
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self.phase {
            BattlePhase::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    pub fn combatant(&self, id: InstanceId) -> Option<&Combatant> {
        self.parties.get(id)
    }

    pub fn combatant_mut(&mut self, id: InstanceId) -> Option<&mut Combatant> {
        self.parties.get_mut(id)
    }

    pub fn own_party(&self) -> &[Combatant] {
        self.parties.party(self.local)
    }

    pub fn opponent_party(&self) -> &[Combatant] {
        self.parties.party(self.local.other())
    }

    /// Whether this participant declares actions for `id`.
    pub fn is_local(&self, id: InstanceId) -> bool {
        match self.mode {
            BattleMode::Local => true,
            BattleMode::Networked { .. } => id.origin == self.local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::combatant::fixtures::fighter;
    use crate::stats::BaseStats;

    fn party(origin: PartyOrigin, n: u8) -> Vec<Combatant> {
        (0..n)
            .map(|slot| fighter(origin, slot, BaseStats::default(), 50, 10))
            .collect()
    }

    #[test]
    fn start_requires_both_parties() {
        let mut session = BattleSession::forming(BattleMode::Local);
        session.set_party(PartyOrigin::Host, party(PartyOrigin::Host, 2)).unwrap();
        assert_eq!(
            session.start(),
            Err(SessionError::MissingParty {
                origin: PartyOrigin::Guest
            })
        );
        session.set_party(PartyOrigin::Guest, party(PartyOrigin::Guest, 1)).unwrap();
        session.start().unwrap();
        assert!(session.is_active());
        assert!(matches!(session.start(), Err(SessionError::NotForming { .. })));
    }

    #[test]
    fn party_origin_must_match_ids() {
        let mut session = BattleSession::forming(BattleMode::Local);
        let err = session
            .set_party(PartyOrigin::Guest, party(PartyOrigin::Host, 1))
            .unwrap_err();
        assert!(matches!(err, SessionError::ForeignCombatant { .. }));
    }

    #[test]
    fn first_resolution_sticks() {
        let mut session =
            BattleSession::local(party(PartyOrigin::Host, 1), party(PartyOrigin::Guest, 1))
                .unwrap();
        session.start().unwrap();
        let first = Resolution::new(BattleOutcome::Win, ResolutionReason::Defeat);
        session.resolve(first);
        let second = session.resolve(Resolution::new(
            BattleOutcome::Lose,
            ResolutionReason::Abandoned,
        ));
        assert_eq!(second, first);
        assert_eq!(session.resolution(), Some(first));
    }

    #[test]
    fn follower_is_local_only_for_guest_party() {
        let session = BattleSession::forming(BattleMode::Networked {
            role: AuthorityRole::Follower,
        });
        assert_eq!(session.local, PartyOrigin::Guest);
        assert!(session.is_local(InstanceId::guest(0)));
        assert!(!session.is_local(InstanceId::host(0)));
        assert!(!session.mode.is_authoritative());
    }

    #[test]
    fn enemies_exclude_defeated() {
        let mut session =
            BattleSession::local(party(PartyOrigin::Host, 1), party(PartyOrigin::Guest, 3))
                .unwrap();
        session
            .combatant_mut(InstanceId::guest(1))
            .unwrap()
            .apply_damage(999);
        assert_eq!(
            session.parties.enemies_of(InstanceId::host(0)),
            vec![InstanceId::guest(0), InstanceId::guest(2)]
        );
    }

    #[test]
    fn outcome_inversion() {
        assert_eq!(BattleOutcome::Win.invert(), BattleOutcome::Lose);
        assert_eq!(BattleOutcome::Draw.invert(), BattleOutcome::Draw);
    }
}
