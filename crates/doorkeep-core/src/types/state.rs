use crate::errors::AccessError;
use crate::identifiers::{IdentityId, StateId};
use crate::time::{Interval, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Length in seconds of the open pulse written by a state change
pub const OPEN_PULSE_SECS: i64 = 10;

/// The open pulse as a duration
pub fn open_pulse() -> Duration {
    Duration::seconds(OPEN_PULSE_SECS)
}

/// One "open" interval of an actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorState {
    /// Row id
    pub id: StateId,
    /// Actor the interval belongs to
    pub subject_id: IdentityId,
    /// Start of the open interval
    pub begin: Option<Timestamp>,
    /// End of the open interval
    pub end: Option<Timestamp>,
    /// Creation instant
    pub created_at: Timestamp,
    /// Last mutation instant
    pub updated_at: Timestamp,
}

impl ActorState {
    /// Open interval of `duration` anchored at `now`.
    ///
    /// Pulses must stay strictly shorter than one minute.
    pub fn pulse(
        subject_id: IdentityId,
        now: Timestamp,
        duration: Duration,
    ) -> Result<Self, AccessError> {
        if duration <= Duration::zero() || duration >= Duration::minutes(1) {
            return Err(AccessError::InvalidPulse {
                millis: duration.num_milliseconds(),
            });
        }
        Ok(Self {
            id: StateId::new_random(),
            subject_id,
            begin: Some(now),
            end: Some(now + duration),
            created_at: now,
            updated_at: now,
        })
    }

    /// The stored interval
    pub fn interval(&self) -> Interval {
        Interval::new(self.begin, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn default_pulse_is_accepted() {
        let now = Utc::now();
        let state = ActorState::pulse(IdentityId::new_random(), now, open_pulse()).unwrap();
        assert_eq!(state.begin, Some(now));
        assert_eq!(state.end, Some(now + Duration::seconds(10)));
    }

    #[test]
    fn minute_long_pulse_is_rejected() {
        let now = Utc::now();
        let err = ActorState::pulse(IdentityId::new_random(), now, Duration::minutes(1));
        assert!(matches!(err, Err(AccessError::InvalidPulse { millis: 60_000 })));
        assert!(ActorState::pulse(IdentityId::new_random(), now, Duration::zero()).is_err());
    }
}
