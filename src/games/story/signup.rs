use poise::serenity_prelude::UserId;

use crate::games::{SessionStatus, UtcDateTime};

/// Tells a sign-up apart from any later one in the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignupId(pub(super) u64);

/// A story waiting for players to react to its sign-up message.
#[derive(Debug, Clone)]
pub struct Signup {
    pub(super) id: SignupId,
    pub(super) opener: UserId,
    pub(super) opener_name: String,
    pub(super) first_line: String,
    pub(super) opened_at: UtcDateTime,
    pub(super) status: SessionStatus,
}

impl Signup {
    pub fn new(
        id: SignupId,
        opener: UserId,
        opener_name: impl Into<String>,
        first_line: impl Into<String>,
        now: UtcDateTime,
    ) -> Self {
        Self {
            id,
            opener,
            opener_name: opener_name.into(),
            first_line: first_line.into(),
            opened_at: now,
            status: SessionStatus::InProgress,
        }
    }

    /// Everyone who reacted, in reaction order, then the opener if they
    /// didn't react themselves.
    pub fn roster(&self, joined: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
        let mut roster: Vec<UserId> = Vec::new();

        for user in joined.into_iter().chain(std::iter::once(self.opener)) {
            if !roster.contains(&user) {
                roster.push(user);
            }
        }

        roster
    }

    pub(super) fn cancel(&mut self) {
        self.status = SessionStatus::Ended;
    }
}
