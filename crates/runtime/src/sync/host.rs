//! Host side of the handshake.

use battle_core::{
    AuthorityRole, BattleMode, BattleSession, CharacterTemplate, Side, instantiate_party,
};

use super::{Directive, NetworkMessage, RemotePeer};
use crate::api::{Result, RuntimeError};

/// Exchanges rosters with the follower and starts the battle.
///
/// Returns an `Active` host session. The round loop takes over from here.
pub async fn handshake(
    peer: &mut RemotePeer,
    party: Vec<CharacterTemplate>,
) -> Result<BattleSession> {
    let role = AuthorityRole::Host;
    let mut session = BattleSession::forming(BattleMode::Networked { role });
    let members = instantiate_party(&party, role.origin(), Side::Own)?;
    session.set_party(role.origin(), members)?;
    peer.send(&NetworkMessage::PartyData(party)).await?;

    loop {
        match peer.next_directive(&mut session, role).await? {
            Directive::PartyReceived => break,
            Directive::Ended(_) => {
                tracing::info!(target: "battle::sync", "peer left before the battle started");
                return Err(RuntimeError::PeerDisconnected);
            }
            other => {
                tracing::debug!(target: "battle::sync", directive = ?other, "ignored during handshake");
            }
        }
    }

    session.start()?;
    peer.send(&NetworkMessage::StartBattle).await?;
    tracing::info!(
        target: "battle::sync",
        own = session.own_party().len(),
        opponent = session.opponent_party().len(),
        "handshake complete"
    );
    Ok(session)
}
