//! Plain-text rendering of the battle event stream.

use battle_core::{LogCategory, ResolutionReason};
use battle_runtime::{BattleEvent, SkipReason};
use tokio::sync::broadcast::{self, error::RecvError};

/// One printable line per event worth showing.
///
/// Most of the story is already in the battle log, so only log lines and a
/// few structural events render.
pub fn render(event: &BattleEvent) -> Option<String> {
    match event {
        BattleEvent::Log(entry) => {
            let marker = match entry.category {
                LogCategory::Action => ">",
                LogCategory::Damage => "-",
                LogCategory::Heal => "+",
                LogCategory::Status => "~",
                LogCategory::System => "#",
                LogCategory::Error => "!",
            };
            Some(format!("{marker} {}", entry.text))
        }
        BattleEvent::TurnSkipped {
            actor,
            reason: SkipReason::RetriesExhausted | SkipReason::Aborted,
        } => Some(format!("! {actor} loses the turn")),
        BattleEvent::BattleEnded { resolution } => {
            let how = match resolution.reason {
                ResolutionReason::Defeat => "",
                ResolutionReason::Forfeit => " by forfeit",
                ResolutionReason::Abandoned => " (abandoned)",
            };
            Some(format!("= {}{how}", resolution.outcome.to_string().to_uppercase()))
        }
        _ => None,
    }
}

/// Prints events until every publisher is gone.
pub async fn print_events(mut rx: broadcast::Receiver<BattleEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(line) = render(&event) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "display fell behind, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleOutcome, InstanceId, LogEntry, Resolution};

    #[test]
    fn log_lines_are_prefixed_by_category() {
        let line = render(&BattleEvent::Log(LogEntry::heal("Cleric heals 12 HP")));
        assert_eq!(line.as_deref(), Some("+ Cleric heals 12 HP"));
    }

    #[test]
    fn structural_events_mostly_stay_quiet() {
        assert_eq!(render(&BattleEvent::RoundStarted { round: 0 }), None);
        assert_eq!(
            render(&BattleEvent::TurnSkipped {
                actor: InstanceId::host(1),
                reason: SkipReason::Stunned,
            }),
            None
        );
    }

    #[test]
    fn battle_end_names_the_outcome() {
        let line = render(&BattleEvent::BattleEnded {
            resolution: Resolution::new(BattleOutcome::Win, ResolutionReason::Forfeit),
        });
        assert_eq!(line.as_deref(), Some("= WIN by forfeit"));
    }
}
