use std::{collections::HashMap, sync::Arc};

use chrono::Utc;

use poise::serenity_prelude::{ChannelId, MessageId};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use super::{Game, SessionStatus, UtcDateTime};

/// One live game in one channel.
#[derive(Debug, Clone)]
pub struct Session<G> {
    game: G,
    created_at: UtcDateTime,
    board: Option<MessageId>,
}

impl<G: Game> Session<G> {
    pub fn new(game: G, created_at: UtcDateTime) -> Self {
        Self {
            game,
            created_at,
            board: None,
        }
    }

    pub const fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn status(&self) -> SessionStatus {
        self.game.status()
    }

    pub const fn created_at(&self) -> UtcDateTime {
        self.created_at
    }

    /// The last message the session was rendered to, if it still exists.
    pub const fn board(&self) -> Option<MessageId> {
        self.board
    }
}

#[derive(Debug, thiserror::Error)]
#[error("channel {0} already has a session")]
pub struct Occupied(pub ChannelId);

/// Live sessions of one game kind, at most one per channel.
///
/// Every check-then-mutate happens inside a single lock acquisition, and the
/// closures passed in are synchronous, so no session is ever observed halfway
/// through a transition.
#[derive(Debug)]
pub struct Registry<G>(Arc<Mutex<HashMap<ChannelId, Session<G>>>>);

impl<G> Clone for Registry<G> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<G> Default for Registry<G> {
    fn default() -> Self {
        Self(Arc::default())
    }
}

impl<G: Game> Registry<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn try_insert(
        &self,
        channel: ChannelId,
        game: G,
        now: UtcDateTime,
    ) -> Result<(), Occupied> {
        let mut guard = self.0.lock().await;

        if guard.contains_key(&channel) {
            trace!(%channel, kind = %G::KIND, "channel occupied");
            return Err(Occupied(channel));
        }

        guard.insert(channel, Session::new(game, now));
        debug!(%channel, kind = %G::KIND, "session started");

        Ok(())
    }

    /// Applies `f` to the channel's session. A session whose status is
    /// finished afterwards is dropped from the registry.
    pub async fn update<T>(
        &self,
        channel: ChannelId,
        f: impl FnOnce(&mut Session<G>) -> T,
    ) -> Option<T> {
        let mut guard = self.0.lock().await;
        let session = guard.get_mut(&channel)?;
        let output = f(session);

        if session.status().is_finished() {
            let status = session.status();
            let lasted = (Utc::now() - session.created_at()).num_seconds();
            guard.remove(&channel);
            debug!(%channel, kind = %G::KIND, ?status, lasted, "session finished");
        }

        Some(output)
    }

    pub async fn view<T>(&self, channel: ChannelId, f: impl FnOnce(&Session<G>) -> T) -> Option<T> {
        let guard = self.0.lock().await;
        guard.get(&channel).map(f)
    }

    pub async fn contains(&self, channel: ChannelId) -> bool {
        self.0.lock().await.contains_key(&channel)
    }

    pub async fn remove(&self, channel: ChannelId) -> Option<Session<G>> {
        let removed = self.0.lock().await.remove(&channel);

        if removed.is_some() {
            debug!(%channel, kind = %G::KIND, "session removed");
        }

        removed
    }

    pub async fn board(&self, channel: ChannelId) -> Option<MessageId> {
        self.view(channel, Session::board).await.flatten()
    }

    pub async fn set_board(&self, channel: ChannelId, message: MessageId) {
        if let Some(session) = self.0.lock().await.get_mut(&channel) {
            session.board = Some(message);
        }
    }

    /// Clears the board if `message` was it, so the next render posts anew.
    pub async fn forget_board(&self, channel: ChannelId, message: MessageId) -> bool {
        let mut guard = self.0.lock().await;

        match guard.get_mut(&channel) {
            Some(session) if session.board == Some(message) => {
                session.board = None;
                trace!(%channel, %message, "board message deleted");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use poise::serenity_prelude::{ChannelId, MessageId};
    use pretty_assertions::assert_eq;

    use super::Registry;
    use crate::games::{Game, GameKind, SessionStatus};

    #[derive(Debug)]
    struct Counter {
        count: u8,
        status: SessionStatus,
    }

    impl Game for Counter {
        const KIND: GameKind = GameKind::Hangman;

        fn status(&self) -> SessionStatus {
            self.status
        }
    }

    fn counter() -> Counter {
        Counter {
            count: 0,
            status: SessionStatus::InProgress,
        }
    }

    #[tokio::test]
    async fn one_session_per_channel() {
        let registry = Registry::new();
        let channel = ChannelId::new(1);

        registry
            .try_insert(channel, counter(), Utc::now())
            .await
            .expect("channel is empty");

        assert!(registry
            .try_insert(channel, counter(), Utc::now())
            .await
            .is_err());

        registry
            .try_insert(ChannelId::new(2), counter(), Utc::now())
            .await
            .expect("other channel is empty");

        assert!(registry.contains(channel).await);
        assert!(registry.contains(ChannelId::new(2)).await);
        assert!(!registry.contains(ChannelId::new(3)).await);
    }

    #[tokio::test]
    async fn finished_sessions_are_dropped() {
        let registry = Registry::new();
        let channel = ChannelId::new(1);
        registry
            .try_insert(channel, counter(), Utc::now())
            .await
            .expect("channel is empty");

        let count = registry
            .update(channel, |session| {
                session.game_mut().count += 1;
                session.game().count
            })
            .await;
        assert_eq!(count, Some(1));
        assert!(registry.contains(channel).await);

        registry
            .update(channel, |session| {
                session.game_mut().status = SessionStatus::Won;
            })
            .await;
        assert!(!registry.contains(channel).await);
        assert_eq!(registry.update(channel, |_| ()).await, None);
    }

    #[tokio::test]
    async fn boards_are_forgotten_only_when_they_match() {
        let registry = Registry::new();
        let channel = ChannelId::new(1);
        registry
            .try_insert(channel, counter(), Utc::now())
            .await
            .expect("channel is empty");

        registry.set_board(channel, MessageId::new(10)).await;
        assert!(!registry.forget_board(channel, MessageId::new(11)).await);
        assert_eq!(registry.board(channel).await, Some(MessageId::new(10)));

        assert!(registry.forget_board(channel, MessageId::new(10)).await);
        assert_eq!(registry.board(channel).await, None);
    }
}
