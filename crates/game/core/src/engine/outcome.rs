use crate::state::{BattleOutcome, BattleSession};

/// Outcome from the local participant's perspective, or `None` while both
/// sides still have a living member.
pub fn evaluate_outcome(session: &BattleSession) -> Option<BattleOutcome> {
    let own = session.parties.has_living(session.local);
    let opponent = session.parties.has_living(session.local.other());
    match (own, opponent) {
        (true, true) => None,
        (true, false) => Some(BattleOutcome::Win),
        (false, true) => Some(BattleOutcome::Lose),
        (false, false) => Some(BattleOutcome::Draw),
    }
}
