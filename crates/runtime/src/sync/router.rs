//! Inbound message router.
//!
//! [`route`] is the only place a peer message touches a [`BattleSession`]. It
//! is a pure function: given the current session and one message it returns
//! the next session plus a [`Directive`] telling the driver what happened, or
//! a [`SyncError`] when the message is invalid for this role or phase. On
//! error the caller keeps its session unchanged.

use battle_core::{
    ActionIntent, AuthorityRole, BattleOutcome, BattleSession, CharacterTemplate,
    GameStateSnapshot, InstanceId, LogEntry, PartyError, Resolution, ResolutionReason,
    SessionError, Side, SnapshotError, StateRoot, instantiate_party,
};
use thiserror::Error;

use super::NetworkMessage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("{tag} is not accepted by the {role:?}")]
    WrongRole {
        tag: &'static str,
        role: AuthorityRole,
    },

    #[error("{tag} out of order: {reason}")]
    OutOfOrder { tag: &'static str, reason: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Party(#[from] PartyError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl SyncError {
    fn out_of_order(tag: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfOrder {
            tag,
            reason: reason.into(),
        }
    }
}

/// What the driver should do after a routed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// The opponent roster is installed.
    PartyReceived,
    /// The battle moved to `Active`.
    Started,
    /// Follower: ask the local player for this combatant's action.
    ActionRequested(InstanceId),
    /// Host: the follower declared the intent for the open turn.
    IntentReceived(ActionIntent),
    /// Follower: the host is resolving this intent.
    ActionRelayed(ActionIntent),
    /// Follower: the host state replaced the local view.
    StateSynced(StateRoot),
    Log(LogEntry),
    /// The battle is over. The resolution is from the receiver's point of view.
    Ended(Resolution),
}

/// Session after a message, plus what the driver should do next.
#[derive(Debug, Clone)]
pub struct Routed {
    pub session: BattleSession,
    pub directive: Directive,
}

impl Routed {
    fn new(session: BattleSession, directive: Directive) -> Self {
        Self { session, directive }
    }
}

/// Applies one inbound message for a participant playing `role`.
pub fn route(
    session: &BattleSession,
    message: NetworkMessage,
    role: AuthorityRole,
) -> Result<Routed, SyncError> {
    let tag = message.tag();
    match message {
        NetworkMessage::PartyData(templates) => on_party_data(session, &templates, role, tag),
        NetworkMessage::StartBattle => on_start_battle(session, role, tag),
        NetworkMessage::RequestAction { actor } => on_request_action(session, actor, role, tag),
        NetworkMessage::ExecuteAction(intent) => on_execute_action(session, intent, role, tag),
        NetworkMessage::SyncGameState(snapshot) => on_sync(session, &snapshot, role, tag),
        NetworkMessage::LogMessage(entry) => Ok(Routed::new(session.clone(), Directive::Log(entry))),
        NetworkMessage::BattleEnd { result, reason } => on_battle_end(session, result, reason, tag),
    }
}

fn require_role(
    role: AuthorityRole,
    expected: AuthorityRole,
    tag: &'static str,
) -> Result<(), SyncError> {
    if role != expected {
        return Err(SyncError::WrongRole { tag, role });
    }
    Ok(())
}

fn require_active(session: &BattleSession, tag: &'static str) -> Result<(), SyncError> {
    if !session.is_active() {
        return Err(SyncError::out_of_order(
            tag,
            format!("battle is {:?}", session.phase),
        ));
    }
    Ok(())
}

fn on_party_data(
    session: &BattleSession,
    templates: &[CharacterTemplate],
    role: AuthorityRole,
    tag: &'static str,
) -> Result<Routed, SyncError> {
    let origin = role.origin().other();
    if session.has_party(origin) {
        return Err(SyncError::out_of_order(tag, "opponent roster already received"));
    }
    let members = instantiate_party(templates, origin, Side::Opponent)?;
    let mut next = session.clone();
    next.set_party(origin, members)?;
    Ok(Routed::new(next, Directive::PartyReceived))
}

fn on_start_battle(
    session: &BattleSession,
    role: AuthorityRole,
    tag: &'static str,
) -> Result<Routed, SyncError> {
    require_role(role, AuthorityRole::Follower, tag)?;
    let mut next = session.clone();
    next.start()?;
    Ok(Routed::new(next, Directive::Started))
}

fn on_request_action(
    session: &BattleSession,
    actor: InstanceId,
    role: AuthorityRole,
    tag: &'static str,
) -> Result<Routed, SyncError> {
    require_role(role, AuthorityRole::Follower, tag)?;
    require_active(session, tag)?;
    if actor.origin != session.local {
        return Err(SyncError::out_of_order(tag, format!("{} is not ours", actor)));
    }
    match session.combatant(actor) {
        None => return Err(SyncError::out_of_order(tag, format!("unknown combatant {}", actor))),
        Some(combatant) if combatant.is_defeated() => {
            return Err(SyncError::out_of_order(tag, format!("{} is defeated", actor)));
        }
        Some(_) => {}
    }
    let mut next = session.clone();
    next.acting = Some(actor);
    Ok(Routed::new(next, Directive::ActionRequested(actor)))
}

fn on_execute_action(
    session: &BattleSession,
    intent: ActionIntent,
    role: AuthorityRole,
    tag: &'static str,
) -> Result<Routed, SyncError> {
    require_active(session, tag)?;
    match role {
        AuthorityRole::Host => {
            if intent.actor.origin != role.origin().other() {
                return Err(SyncError::out_of_order(
                    tag,
                    format!("peer declared an action for {}", intent.actor),
                ));
            }
            if session.acting != Some(intent.actor) {
                return Err(SyncError::out_of_order(
                    tag,
                    format!("no open turn for {}", intent.actor),
                ));
            }
            Ok(Routed::new(session.clone(), Directive::IntentReceived(intent)))
        }
        // Recorded only: the follower never resolves actions.
        AuthorityRole::Follower => Ok(Routed::new(session.clone(), Directive::ActionRelayed(intent))),
    }
}

fn on_sync(
    session: &BattleSession,
    snapshot: &GameStateSnapshot,
    role: AuthorityRole,
    tag: &'static str,
) -> Result<Routed, SyncError> {
    require_role(role, AuthorityRole::Follower, tag)?;
    let mut next = session.clone();
    next.apply_snapshot(snapshot)?;
    next.acting = None;
    Ok(Routed::new(next, Directive::StateSynced(snapshot.state_root)))
}

fn on_battle_end(
    session: &BattleSession,
    result: BattleOutcome,
    reason: ResolutionReason,
    tag: &'static str,
) -> Result<Routed, SyncError> {
    if session.is_resolved() {
        return Err(SyncError::out_of_order(tag, "battle already resolved"));
    }
    let mut next = session.clone();
    let resolution = next.resolve(Resolution::new(result.invert(), reason));
    Ok(Routed::new(next, Directive::Ended(resolution)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BaseStats, BattleMode, BattlePhase, PartyOrigin};

    fn template(id: &str, hp: u32) -> CharacterTemplate {
        CharacterTemplate {
            id: id.into(),
            name: id.into(),
            base_stats: BaseStats::default(),
            max_hp: hp,
            max_mp: 10,
            skills: Vec::new(),
            special: None,
            passive: None,
        }
    }

    fn forming(role: AuthorityRole) -> BattleSession {
        let mut session = BattleSession::forming(BattleMode::Networked { role });
        let own = instantiate_party(&[template("own", 30)], role.origin(), Side::Own).unwrap();
        session.set_party(role.origin(), own).unwrap();
        session
    }

    fn active_follower() -> BattleSession {
        let session = forming(AuthorityRole::Follower);
        let routed = route(
            &session,
            NetworkMessage::PartyData(vec![template("host", 40)]),
            AuthorityRole::Follower,
        )
        .unwrap();
        route(&routed.session, NetworkMessage::StartBattle, AuthorityRole::Follower)
            .unwrap()
            .session
    }

    #[test]
    fn party_data_installs_the_opponent_once() {
        let session = forming(AuthorityRole::Host);
        let message = NetworkMessage::PartyData(vec![template("guest", 25)]);
        let routed = route(&session, message.clone(), AuthorityRole::Host).unwrap();
        assert_eq!(routed.directive, Directive::PartyReceived);
        let guest = routed.session.combatant(InstanceId::guest(0)).unwrap();
        assert_eq!(guest.side, Side::Opponent);

        let again = route(&routed.session, message, AuthorityRole::Host);
        assert!(matches!(again, Err(SyncError::OutOfOrder { tag: "party_data", .. })));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let session = forming(AuthorityRole::Host);
        let result = route(&session, NetworkMessage::PartyData(vec![]), AuthorityRole::Host);
        assert_eq!(result.unwrap_err(), SyncError::Party(PartyError::Empty));
    }

    #[test]
    fn only_the_follower_accepts_start_and_sync() {
        let session = forming(AuthorityRole::Host);
        assert!(matches!(
            route(&session, NetworkMessage::StartBattle, AuthorityRole::Host),
            Err(SyncError::WrongRole { .. })
        ));
        let snapshot = session.snapshot().unwrap();
        assert!(matches!(
            route(&session, NetworkMessage::SyncGameState(snapshot), AuthorityRole::Host),
            Err(SyncError::WrongRole { tag: "sync_game_state", .. })
        ));
    }

    #[test]
    fn start_requires_both_rosters() {
        let session = forming(AuthorityRole::Follower);
        let result = route(&session, NetworkMessage::StartBattle, AuthorityRole::Follower);
        assert!(matches!(result, Err(SyncError::Session(SessionError::MissingParty { .. }))));
        assert_eq!(active_follower().phase, BattlePhase::Active);
    }

    #[test]
    fn request_action_opens_a_turn_for_our_own_combatant() {
        let session = active_follower();
        let routed = route(
            &session,
            NetworkMessage::RequestAction {
                actor: InstanceId::guest(0),
            },
            AuthorityRole::Follower,
        )
        .unwrap();
        assert_eq!(routed.directive, Directive::ActionRequested(InstanceId::guest(0)));
        assert_eq!(routed.session.acting, Some(InstanceId::guest(0)));

        let foreign = route(
            &session,
            NetworkMessage::RequestAction {
                actor: InstanceId::host(0),
            },
            AuthorityRole::Follower,
        );
        assert!(matches!(foreign, Err(SyncError::OutOfOrder { .. })));
    }

    #[test]
    fn host_accepts_intents_only_for_the_open_remote_turn() {
        let mut session = forming(AuthorityRole::Host);
        session
            .set_party(
                PartyOrigin::Guest,
                instantiate_party(&[template("guest", 20)], PartyOrigin::Guest, Side::Opponent)
                    .unwrap(),
            )
            .unwrap();
        session.start().unwrap();
        let intent = ActionIntent::attack(InstanceId::guest(0), InstanceId::host(0));

        let closed = route(&session, NetworkMessage::ExecuteAction(intent.clone()), AuthorityRole::Host);
        assert!(matches!(closed, Err(SyncError::OutOfOrder { .. })));

        session.acting = Some(InstanceId::guest(0));
        let routed = route(&session, NetworkMessage::ExecuteAction(intent.clone()), AuthorityRole::Host)
            .unwrap();
        assert_eq!(routed.directive, Directive::IntentReceived(intent));
        assert_eq!(routed.session, session);

        session.acting = Some(InstanceId::host(0));
        let spoofed = ActionIntent::defend(InstanceId::host(0));
        assert!(route(&session, NetworkMessage::ExecuteAction(spoofed), AuthorityRole::Host).is_err());
    }

    #[test]
    fn follower_replaces_its_view_with_the_host_snapshot() {
        let follower = active_follower();
        let mut host_view = follower.clone();
        host_view.parties.get_mut(InstanceId::guest(0)).unwrap().apply_damage(12);
        host_view.round = 2;
        let snapshot = host_view.snapshot().unwrap();

        let mut asked = follower.clone();
        asked.acting = Some(InstanceId::guest(0));
        let routed = route(&asked, NetworkMessage::SyncGameState(snapshot.clone()), AuthorityRole::Follower)
            .unwrap();
        assert_eq!(routed.directive, Directive::StateSynced(snapshot.state_root));
        assert_eq!(routed.session.acting, None);
        assert_eq!(routed.session.round, 2);
        assert_eq!(routed.session.state_root().unwrap(), snapshot.state_root);
    }

    #[test]
    fn tampered_snapshot_leaves_the_session_alone() {
        let follower = active_follower();
        let mut snapshot = follower.snapshot().unwrap();
        snapshot.round = 9;
        let result = route(&follower, NetworkMessage::SyncGameState(snapshot), AuthorityRole::Follower);
        assert!(matches!(result, Err(SyncError::Snapshot(SnapshotError::RootMismatch { .. }))));
    }

    #[test]
    fn battle_end_is_inverted_for_the_receiver() {
        let follower = active_follower();
        let routed = route(
            &follower,
            NetworkMessage::BattleEnd {
                result: BattleOutcome::Win,
                reason: ResolutionReason::Defeat,
            },
            AuthorityRole::Follower,
        )
        .unwrap();
        let expected = Resolution::new(BattleOutcome::Lose, ResolutionReason::Defeat);
        assert_eq!(routed.directive, Directive::Ended(expected));
        assert_eq!(routed.session.resolution(), Some(expected));

        let twice = route(
            &routed.session,
            NetworkMessage::BattleEnd {
                result: BattleOutcome::Draw,
                reason: ResolutionReason::Defeat,
            },
            AuthorityRole::Follower,
        );
        assert!(twice.is_err());
    }

    #[test]
    fn log_messages_change_nothing() {
        let follower = active_follower();
        let entry = LogEntry::system("Round 1");
        let routed = route(&follower, NetworkMessage::LogMessage(entry.clone()), AuthorityRole::Follower)
            .unwrap();
        assert_eq!(routed.directive, Directive::Log(entry));
        assert_eq!(routed.session, follower);
    }
}
