//! Discussion persistence adapters
//!
//! Both stores implement the
//! [`DiscussionStore`](boardroom_application::DiscussionStore) port as a
//! snapshot plus an append-only turn log.

mod json_file;
mod memory;

pub use json_file::JsonFileDiscussionStore;
pub use memory::InMemoryDiscussionStore;

use boardroom_application::StoreError;
use boardroom_domain::{Discussion, Turn};
use tracing::info;

/// Fold logged turns the snapshot has not seen yet back into it
pub(crate) fn replay_pending(
    mut snapshot: Discussion,
    logged: Vec<Turn>,
) -> Result<Discussion, StoreError> {
    let seen = snapshot.next_sequence();
    let mut replayed = 0usize;

    for turn in logged.into_iter().filter(|t| t.sequence >= seen) {
        snapshot
            .replay_turn(turn)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        replayed += 1;
    }

    if replayed > 0 {
        info!(id = %snapshot.id(), replayed, "Replayed turns logged after the last snapshot");
    }
    Ok(snapshot)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use boardroom_domain::{
        Discussion, DiscussionId, Model, PhasePlan, Topic, TurnDraft,
    };
    use std::time::Duration;

    pub(crate) fn discussion(id: &str) -> Discussion {
        Discussion::new(
            DiscussionId::new(id),
            Topic::try_new("Should we hire more developers?").unwrap(),
            vec!["ceo".into(), "cto".into()],
            PhasePlan::default(),
        )
        .unwrap()
    }

    pub(crate) fn draft(speaker: &str) -> TurnDraft {
        TurnDraft {
            speaker: speaker.into(),
            content: format!("{} weighs in", speaker),
            model: Model::Gpt4,
            primary_model: Model::Gpt4,
            latency: Duration::from_millis(250),
            usage: None,
        }
    }
}
