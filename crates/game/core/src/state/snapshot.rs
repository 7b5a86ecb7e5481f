//! Authoritative state snapshots for follower reconciliation.
//!
//! A snapshot carries only what changes during a battle: resources, effects
//! and passive markers per combatant, plus the round counter and the active
//! flag. Identity, stats and skills were exchanged once in the handshake.
//!
//! Every snapshot is sealed with a [`StateRoot`]: SHA-256 over the bincode
//! encoding of its contents. Two participants holding equal roots hold equal
//! battle state.

use core::fmt;

use sha2::{Digest, Sha256};

use super::{
    BattlePhase, BattleSession, Combatant, InstanceId, PartyOrigin, PassiveMarks, Resources,
    StatusEffects,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StateRoot(pub [u8; 32]);

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl StateRoot {
    /// First 8 bytes as hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

/// Mutable state of one combatant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CombatantSnapshot {
    pub instance_id: InstanceId,
    pub resources: Resources,
    pub effects: StatusEffects,
    pub passive_marks: PassiveMarks,
}

impl From<&Combatant> for CombatantSnapshot {
    fn from(combatant: &Combatant) -> Self {
        Self {
            instance_id: combatant.instance_id,
            resources: *combatant.resources(),
            effects: combatant.effects.clone(),
            passive_marks: combatant.passive_marks,
        }
    }
}

/// Payload of `sync_game_state`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameStateSnapshot {
    pub host: Vec<CombatantSnapshot>,
    pub guest: Vec<CombatantSnapshot>,
    pub round: u32,
    pub active: bool,
    pub state_root: StateRoot,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encoding(String),

    #[error("state root mismatch: snapshot claims {claimed}, contents hash to {computed}")]
    RootMismatch {
        claimed: StateRoot,
        computed: StateRoot,
    },

    #[error("{origin:?} roster mismatch: snapshot has {snapshot} combatants, session has {session}")]
    RosterSize {
        origin: PartyOrigin,
        snapshot: usize,
        session: usize,
    },

    #[error("snapshot names unknown combatant {0}")]
    UnknownCombatant(InstanceId),

    #[error("snapshot arrived after the battle was resolved")]
    Resolved,
}

fn compute_root(
    host: &[CombatantSnapshot],
    guest: &[CombatantSnapshot],
    round: u32,
    active: bool,
) -> Result<StateRoot, SnapshotError> {
    let bytes = bincode::serialize(&(host, guest, round, active))
        .map_err(|e| SnapshotError::Encoding(e.to_string()))?;
    let digest = Sha256::digest(&bytes);
    Ok(StateRoot(digest.into()))
}

impl GameStateSnapshot {
    /// Recomputes the root from the contents.
    pub fn compute_root(&self) -> Result<StateRoot, SnapshotError> {
        compute_root(&self.host, &self.guest, self.round, self.active)
    }

    /// Checks that the carried root matches the contents.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        let computed = self.compute_root()?;
        if computed != self.state_root {
            return Err(SnapshotError::RootMismatch {
                claimed: self.state_root,
                computed,
            });
        }
        Ok(())
    }

    fn party(&self, origin: PartyOrigin) -> &[CombatantSnapshot] {
        match origin {
            PartyOrigin::Host => &self.host,
            PartyOrigin::Guest => &self.guest,
        }
    }
}

impl BattleSession {
    /// Captures the authoritative view of this session.
    pub fn snapshot(&self) -> Result<GameStateSnapshot, SnapshotError> {
        let host: Vec<_> = self.parties.host.iter().map(CombatantSnapshot::from).collect();
        let guest: Vec<_> = self.parties.guest.iter().map(CombatantSnapshot::from).collect();
        let active = self.is_active();
        let state_root = compute_root(&host, &guest, self.round, active)?;
        Ok(GameStateSnapshot {
            host,
            guest,
            round: self.round,
            active,
            state_root,
        })
    }

    /// Root of the current state, without building a full snapshot for the wire.
    pub fn state_root(&self) -> Result<StateRoot, SnapshotError> {
        self.snapshot().map(|snapshot| snapshot.state_root)
    }

    /// Replaces the local view wholesale with a host snapshot.
    ///
    /// The snapshot is verified before anything is written: either every
    /// combatant is updated or none is.
    pub fn apply_snapshot(&mut self, snapshot: &GameStateSnapshot) -> Result<(), SnapshotError> {
        if self.is_resolved() {
            return Err(SnapshotError::Resolved);
        }
        snapshot.verify()?;

        for origin in [PartyOrigin::Host, PartyOrigin::Guest] {
            let local = self.parties.party(origin);
            let remote = snapshot.party(origin);
            if local.len() != remote.len() {
                return Err(SnapshotError::RosterSize {
                    origin,
                    snapshot: remote.len(),
                    session: local.len(),
                });
            }
            if let Some(unknown) = remote
                .iter()
                .find(|entry| self.parties.get(entry.instance_id).is_none())
            {
                return Err(SnapshotError::UnknownCombatant(unknown.instance_id));
            }
        }

        for entry in snapshot.host.iter().chain(snapshot.guest.iter()) {
            if let Some(combatant) = self.parties.get_mut(entry.instance_id) {
                combatant.set_resources(entry.resources);
                combatant.effects = entry.effects.clone();
                combatant.passive_marks = entry.passive_marks;
            }
        }
        self.round = snapshot.round;
        if snapshot.active && self.phase == BattlePhase::Forming {
            self.phase = BattlePhase::Active;
        }
        Ok(())
    }
}
