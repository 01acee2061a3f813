use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::error::{Result, SeasonError};
use super::types::Season;
use crate::scoring::{ScoredPrediction, UserId};

impl Season {
    /// Copy each listed user's most recent prediction forward into an event
    /// they have not predicted.
    ///
    /// Runs regardless of the event's closing time, but only until a result
    /// is recorded. Users with nothing to copy are skipped. Returns the users
    /// that were filled in.
    pub fn autofill_event(
        &mut self,
        event_id: &str,
        users: &[UserId],
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>> {
        if self.event(event_id)?.result.is_some() {
            return Err(SeasonError::ResultRecorded(event_id.to_string()));
        }

        let mut filled = Vec::new();
        for user in users {
            if self.prediction(user, event_id).is_some() {
                continue;
            }

            let Some(latest) = self.latest_prediction(user, event_id) else {
                warn!(user = %user, event = event_id, "no earlier prediction to copy forward");
                continue;
            };

            debug!(user = %user, from = %latest.event_id, to = event_id, "copying prediction forward");
            let mut copy = ScoredPrediction::new(user.as_str(), event_id, latest.prediction.clone(), now);
            copy.autofilled = true;
            self.upsert_prediction(copy);
            filled.push(user.clone());
        }

        Ok(filled)
    }

    // Most recently submitted non-empty prediction of a user, outside `except_event`
    fn latest_prediction(&self, user_id: &str, except_event: &str) -> Option<&ScoredPrediction> {
        self.predictions
            .iter()
            .filter(|p| p.user_id == user_id && p.event_id != except_event)
            .filter(|p| !p.prediction.is_empty())
            .max_by_key(|p| p.submitted_at)
    }
}
