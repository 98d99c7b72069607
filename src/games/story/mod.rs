//! Collaborative stories: a fixed roster of players takes turns adding one
//! sentence each until the story reaches its length limit.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::Duration;
use poise::serenity_prelude::{ChannelId, MessageId, UserId};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info};

use super::{Game, GameKind, Registry, SessionStatus, UtcDateTime};
use crate::utils::format_duration::FormatDuration;

mod signup;

pub use signup::{Signup, SignupId};

pub const DEFAULT_LIMIT: usize = 15;
pub const MIN_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryError {
    #[error("A story is already in progress in this channel. Use `story stop` to end it first.")]
    AlreadyInProgress,

    #[error("There's no story running. Start one with `story start`.")]
    NoActiveSession,

    #[error("Not enough players joined. The story has been cancelled.")]
    InsufficientPlayers,

    #[error("Not enough active players to continue.")]
    NoEligiblePlayers,

    #[error("It's not your turn!")]
    NotYourTurn,

    #[error("It's already your turn!")]
    AlreadyYourTurn,

    #[error("Please wait {} more before taking the turn.", .remaining.format_full())]
    TooEarly { remaining: Duration },

    #[error("You don't have permission to stop this story.")]
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub author: UserId,
    pub author_name: String,
    pub text: String,
}

/// What happened after a sentence was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Next(UserId),
    Finished,
}

#[derive(Debug, Clone)]
pub struct Story {
    contributions: Vec<Contribution>,
    roster: Vec<UserId>,
    turn: Option<UserId>,
    turn_started_at: UtcDateTime,
    limit: usize,
    creator: UserId,
    status: SessionStatus,
}

impl Story {
    /// A story seeded with the creator's first line. Nobody holds the turn
    /// until [`Story::pick_next_turn`] is called.
    pub fn new(
        creator: UserId,
        creator_name: impl Into<String>,
        first_line: impl Into<String>,
        roster: impl IntoIterator<Item = UserId>,
        limit: usize,
        now: UtcDateTime,
    ) -> Self {
        let mut players = Vec::new();
        for user in roster {
            if !players.contains(&user) {
                players.push(user);
            }
        }

        Self {
            contributions: vec![Contribution {
                author: creator,
                author_name: creator_name.into(),
                text: first_line.into(),
            }],
            roster: players,
            turn: None,
            turn_started_at: now,
            limit,
            creator,
            status: SessionStatus::InProgress,
        }
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn roster(&self) -> &[UserId] {
        &self.roster
    }

    pub const fn turn(&self) -> Option<UserId> {
        self.turn
    }

    pub const fn turn_started_at(&self) -> UtcDateTime {
        self.turn_started_at
    }

    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    fn last_author(&self) -> Option<UserId> {
        self.contributions.last().map(|c| c.author)
    }

    /// Hands the turn to a random player other than the last author. With
    /// nobody else on the roster, the last author may go again.
    pub fn pick_next_turn(
        &mut self,
        rng: &mut impl Rng,
        now: UtcDateTime,
    ) -> Result<UserId, StoryError> {
        let last = self.last_author();
        let eligible: Vec<UserId> = self
            .roster
            .iter()
            .copied()
            .filter(|user| Some(*user) != last)
            .collect();

        let pool = if eligible.is_empty() {
            &self.roster
        } else {
            &eligible
        };

        match pool.choose(rng).copied() {
            Some(next) => {
                self.turn = Some(next);
                self.turn_started_at = now;
                Ok(next)
            }
            None => {
                self.turn = None;
                self.status = SessionStatus::Ended;
                Err(StoryError::NoEligiblePlayers)
            }
        }
    }

    pub fn add_sentence(
        &mut self,
        author: UserId,
        author_name: impl Into<String>,
        text: impl Into<String>,
        rng: &mut impl Rng,
        now: UtcDateTime,
    ) -> Result<TurnOutcome, StoryError> {
        if self.status.is_finished() {
            return Err(StoryError::NoActiveSession);
        }

        if self.turn != Some(author) {
            return Err(StoryError::NotYourTurn);
        }

        self.contributions.push(Contribution {
            author,
            author_name: author_name.into(),
            text: text.into(),
        });

        if self.contributions.len() >= self.limit {
            self.turn = None;
            self.status = SessionStatus::Ended;
            return Ok(TurnOutcome::Finished);
        }

        self.pick_next_turn(rng, now).map(TurnOutcome::Next)
    }

    /// Lets `claimant` steal the turn once the holder has had it for
    /// `window`. Returns the previous holder.
    pub fn take_turn(
        &mut self,
        claimant: UserId,
        now: UtcDateTime,
        window: Duration,
    ) -> Result<UserId, StoryError> {
        let holder = self.turn.ok_or(StoryError::NoActiveSession)?;

        if holder == claimant {
            return Err(StoryError::AlreadyYourTurn);
        }

        let elapsed = now - self.turn_started_at;
        if elapsed < window {
            return Err(StoryError::TooEarly {
                remaining: window - elapsed,
            });
        }

        self.turn = Some(claimant);
        self.turn_started_at = now;

        Ok(holder)
    }

    /// `privileged` is whether the requester can manage the server.
    pub fn stop(&mut self, requester: UserId, privileged: bool) -> Result<(), StoryError> {
        if requester != self.creator && !privileged {
            return Err(StoryError::Forbidden);
        }

        self.turn = None;
        self.status = SessionStatus::Ended;

        Ok(())
    }

    pub fn snapshot(&self) -> StorySnapshot {
        StorySnapshot {
            entries: self
                .contributions
                .iter()
                .map(|c| (c.author_name.clone(), c.text.clone()))
                .collect(),
            holder: self.turn,
            limit: self.limit,
        }
    }

    /// The finished story, one `**name:** sentence` line per contribution.
    pub fn transcript(&self) -> String {
        transcript(
            self.contributions
                .iter()
                .map(|c| (c.author_name.as_str(), c.text.as_str())),
        )
    }

    fn ending(&self, reason: Option<String>, board: Option<MessageId>) -> StoryEnding {
        StoryEnding {
            transcript: self.transcript(),
            reason,
            board,
        }
    }
}

fn transcript<'a>(lines: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    lines
        .map(|(name, text)| format!("**{name}:** {text}\n"))
        .collect()
}

/// Everything needed to draw a running story's board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySnapshot {
    pub entries: Vec<(String, String)>,
    pub holder: Option<UserId>,
    pub limit: usize,
}

impl StorySnapshot {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn description(&self) -> String {
        let mut description: String = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (name, text))| format!("**{}. {name}:** {text}\n", i + 1))
            .collect();

        if let Some(holder) = self.holder {
            description += &format!("\nIt's <@{holder}>'s turn!");
        }

        description
    }

    pub fn footer(&self, take_turn_after: Duration) -> String {
        let mut footer = if self.holder.is_some() && self.count() < self.limit {
            format!(
                "Use `story add <sentence>` on your turn.\n\
                If they're AFK, use `story take` after {} to steal the turn.\n",
                take_turn_after.format_largest()
            )
        } else {
            "The story has ended!\n".to_string()
        };

        footer += &format!("Progress: {}/{}", self.count(), self.limit);
        footer
    }
}

/// A story that just ended, ready to be posted in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryEnding {
    pub transcript: String,
    /// Set when the story was cut short.
    pub reason: Option<String>,
    /// The old board, to be cleaned up.
    pub board: Option<MessageId>,
}

impl StoryEnding {
    pub fn title(&self) -> &'static str {
        match self.reason {
            Some(_) => "📖 Story Ended",
            None => "📖 Story Complete!",
        }
    }

    pub fn description(&self) -> String {
        match &self.reason {
            Some(reason) => format!(
                "The story was ended early: {reason}\n\n---\n\n{}",
                self.transcript
            ),
            None => self.transcript.clone(),
        }
    }
}

/// A channel's story, from sign-up onwards.
#[derive(Debug, Clone)]
pub enum StorySlot {
    SigningUp(Signup),
    Running(Story),
}

impl Game for StorySlot {
    const KIND: GameKind = GameKind::Story;

    fn status(&self) -> SessionStatus {
        match self {
            Self::SigningUp(signup) => signup.status,
            Self::Running(story) => story.status(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoryStart {
    pub players: usize,
    pub first_turn: UserId,
    pub snapshot: StorySnapshot,
}

#[derive(Debug, Clone)]
pub enum SentenceReport {
    Next {
        holder: UserId,
        snapshot: StorySnapshot,
        board: Option<MessageId>,
    },
    Finished(StoryEnding),
}

#[derive(Debug, Clone)]
pub struct TakeReport {
    pub previous: UserId,
    pub snapshot: StorySnapshot,
    pub board: Option<MessageId>,
}

/// Story sessions for every channel.
#[derive(Debug, Clone)]
pub struct StoryTable {
    sessions: Registry<StorySlot>,
    next_signup: Arc<AtomicU64>,
    limit: usize,
    take_turn_after: Duration,
}

impl StoryTable {
    pub fn new(limit: usize, take_turn_after: Duration) -> Self {
        Self {
            sessions: Registry::new(),
            next_signup: Arc::default(),
            limit,
            take_turn_after,
        }
    }

    pub const fn sessions(&self) -> &Registry<StorySlot> {
        &self.sessions
    }

    pub const fn take_turn_after(&self) -> Duration {
        self.take_turn_after
    }

    pub async fn begin_signup(
        &self,
        channel: ChannelId,
        opener: UserId,
        opener_name: impl Into<String>,
        first_line: impl Into<String>,
        now: UtcDateTime,
    ) -> Result<SignupId, StoryError> {
        let id = SignupId(self.next_signup.fetch_add(1, Ordering::Relaxed));
        let signup = Signup::new(id, opener, opener_name, first_line, now);

        self.sessions
            .try_insert(channel, StorySlot::SigningUp(signup), now)
            .await
            .map_err(|_| StoryError::AlreadyInProgress)?;

        info!(%channel, %opener, "story sign-up opened");

        Ok(id)
    }

    /// Freezes the roster and starts the story, or cancels it if too few
    /// players joined. Only the sign-up `id` names is closed; any other
    /// session in the channel counts as no session at all.
    pub async fn close_signup(
        &self,
        channel: ChannelId,
        id: SignupId,
        joined: Vec<UserId>,
        now: UtcDateTime,
    ) -> Result<StoryStart, StoryError> {
        let limit = self.limit;

        let start = self
            .sessions
            .update(channel, |session| -> Result<StoryStart, StoryError> {
                let signup = match session.game_mut() {
                    StorySlot::SigningUp(signup) if signup.id == id => signup,
                    _ => return Err(StoryError::NoActiveSession),
                };

                let roster = signup.roster(joined);
                debug!(
                    %channel,
                    waited = (now - signup.opened_at).num_seconds(),
                    players = roster.len(),
                    "sign-up closed"
                );

                if roster.len() < MIN_PLAYERS {
                    signup.cancel();
                    return Err(StoryError::InsufficientPlayers);
                }

                let mut story = Story::new(
                    signup.opener,
                    signup.opener_name.clone(),
                    signup.first_line.clone(),
                    roster,
                    limit,
                    now,
                );

                let first_turn = match story.pick_next_turn(&mut rand::thread_rng(), now) {
                    Ok(user) => user,
                    Err(err) => {
                        signup.cancel();
                        return Err(err);
                    }
                };

                let start = StoryStart {
                    players: story.roster().len(),
                    first_turn,
                    snapshot: story.snapshot(),
                };

                *session.game_mut() = StorySlot::Running(story);

                Ok(start)
            })
            .await
            .ok_or(StoryError::NoActiveSession)??;

        info!(%channel, players = start.players, "story started");

        Ok(start)
    }

    /// Drops the sign-up `id` names, e.g. when its message disappeared.
    /// Returns whether it was still open.
    pub async fn abort_signup(&self, channel: ChannelId, id: SignupId) -> bool {
        let aborted = self
            .sessions
            .update(channel, |session| match session.game_mut() {
                StorySlot::SigningUp(signup) if signup.id == id => {
                    signup.cancel();
                    true
                }
                _ => false,
            })
            .await
            .unwrap_or(false);

        if aborted {
            info!(%channel, "story sign-up aborted");
        }

        aborted
    }

    pub async fn add_sentence(
        &self,
        channel: ChannelId,
        author: UserId,
        author_name: String,
        text: String,
        now: UtcDateTime,
    ) -> Result<SentenceReport, StoryError> {
        let report = self
            .sessions
            .update(channel, |session| -> Result<SentenceReport, StoryError> {
                let board = session.board();
                let StorySlot::Running(story) = session.game_mut() else {
                    return Err(StoryError::NoActiveSession);
                };

                let outcome =
                    story.add_sentence(author, author_name, text, &mut rand::thread_rng(), now);

                match outcome {
                    Ok(TurnOutcome::Next(holder)) => Ok(SentenceReport::Next {
                        holder,
                        snapshot: story.snapshot(),
                        board,
                    }),
                    Ok(TurnOutcome::Finished) => {
                        Ok(SentenceReport::Finished(story.ending(None, board)))
                    }
                    Err(StoryError::NoEligiblePlayers) => Ok(SentenceReport::Finished(
                        story.ending(Some(StoryError::NoEligiblePlayers.to_string()), board),
                    )),
                    Err(err) => Err(err),
                }
            })
            .await
            .ok_or(StoryError::NoActiveSession)??;

        match &report {
            SentenceReport::Next { holder, snapshot, .. } => {
                debug!(%channel, %author, next = %holder, count = snapshot.count(), "story sentence added");
            }
            SentenceReport::Finished(ending) => {
                info!(%channel, reason = ?ending.reason, "story finished");
            }
        }

        Ok(report)
    }

    pub async fn take_turn(
        &self,
        channel: ChannelId,
        claimant: UserId,
        now: UtcDateTime,
    ) -> Result<TakeReport, StoryError> {
        let window = self.take_turn_after;

        let report = self
            .sessions
            .update(channel, |session| -> Result<TakeReport, StoryError> {
                let board = session.board();
                let StorySlot::Running(story) = session.game_mut() else {
                    return Err(StoryError::NoActiveSession);
                };

                let previous = story.take_turn(claimant, now, window)?;

                Ok(TakeReport {
                    previous,
                    snapshot: story.snapshot(),
                    board,
                })
            })
            .await
            .ok_or(StoryError::NoActiveSession)??;

        info!(%channel, %claimant, previous = %report.previous, "story turn taken");

        Ok(report)
    }

    /// Ends the channel's story, or cancels its sign-up.
    pub async fn stop(
        &self,
        channel: ChannelId,
        requester: UserId,
        requester_name: &str,
        privileged: bool,
    ) -> Result<StoryEnding, StoryError> {
        let reason = format!("Stopped by {requester_name}.");

        let ending = self
            .sessions
            .update(channel, |session| -> Result<StoryEnding, StoryError> {
                let board = session.board();

                match session.game_mut() {
                    StorySlot::Running(story) => {
                        story.stop(requester, privileged)?;
                        Ok(story.ending(Some(reason), board))
                    }
                    StorySlot::SigningUp(signup) => {
                        if requester != signup.opener && !privileged {
                            return Err(StoryError::Forbidden);
                        }

                        signup.cancel();

                        Ok(StoryEnding {
                            transcript: transcript(std::iter::once((
                                signup.opener_name.as_str(),
                                signup.first_line.as_str(),
                            ))),
                            reason: Some(reason),
                            board,
                        })
                    }
                }
            })
            .await
            .ok_or(StoryError::NoActiveSession)??;

        info!(%channel, %requester, "story stopped");

        Ok(ending)
    }

    pub async fn render(
        &self,
        channel: ChannelId,
    ) -> Result<(StorySnapshot, Option<MessageId>), StoryError> {
        self.sessions
            .view(channel, |session| match session.game() {
                StorySlot::Running(story) => Some((story.snapshot(), session.board())),
                StorySlot::SigningUp(_) => None,
            })
            .await
            .flatten()
            .ok_or(StoryError::NoActiveSession)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use poise::serenity_prelude::{ChannelId, UserId};
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::{
        SentenceReport, Story, StoryError, StorySlot, StoryTable, TurnOutcome, DEFAULT_LIMIT,
    };
    use crate::games::{Game, SessionStatus};

    fn users(n: u64) -> Vec<UserId> {
        (1..=n).map(UserId::new).collect()
    }

    #[test]
    fn never_picks_the_last_author() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc::now();

        for size in 2..=5 {
            let roster = users(size);

            for _ in 0..1000 {
                let mut story = Story::new(roster[0], "first", "It begins.", roster.clone(), 100, now);
                let next = story.pick_next_turn(&mut rng, now).expect("roster isn't empty");

                assert_ne!(next, roster[0]);
                assert!(roster.contains(&next));

                story
                    .add_sentence(next, "next", "And then.", &mut rng, now)
                    .expect("it's their turn");
                assert_ne!(story.turn(), Some(next));
            }
        }
    }

    #[test]
    fn lone_player_goes_again() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let solo = UserId::new(1);

        let mut story = Story::new(solo, "solo", "Alone.", [solo], DEFAULT_LIMIT, now);
        assert_eq!(story.pick_next_turn(&mut rng, now), Ok(solo));
    }

    #[test]
    fn empty_roster_ends_the_story() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();

        let mut story = Story::new(UserId::new(1), "a", "Hi.", [], DEFAULT_LIMIT, now);
        assert_eq!(
            story.pick_next_turn(&mut rng, now),
            Err(StoryError::NoEligiblePlayers)
        );
        assert_eq!(story.status, SessionStatus::Ended);
    }

    #[test]
    fn take_turn_waits_for_the_window() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = Utc::now();
        let window = Duration::minutes(5);
        let roster = users(3);

        let mut story = Story::new(roster[0], "a", "Hi.", roster.clone(), DEFAULT_LIMIT, start);
        let holder = story.pick_next_turn(&mut rng, start).expect("roster isn't empty");
        let claimant = if holder == roster[1] { roster[2] } else { roster[1] };

        assert_eq!(
            story.take_turn(holder, start, window),
            Err(StoryError::AlreadyYourTurn)
        );

        let early = start + Duration::seconds(30);
        assert_eq!(
            story.take_turn(claimant, early, window),
            Err(StoryError::TooEarly {
                remaining: Duration::seconds(270)
            })
        );
        assert_eq!(story.turn(), Some(holder));
        assert_eq!(story.turn_started_at(), start);

        let late = start + window;
        assert_eq!(story.take_turn(claimant, late, window), Ok(holder));
        assert_eq!(story.turn(), Some(claimant));
        assert_eq!(story.turn_started_at(), late);

        assert!(matches!(
            story.take_turn(holder, late + Duration::seconds(1), window),
            Err(StoryError::TooEarly { .. })
        ));
    }

    #[test]
    fn too_early_message() {
        let err = StoryError::TooEarly {
            remaining: Duration::seconds(270),
        };
        assert_eq!(
            err.to_string(),
            "Please wait 4m 30s more before taking the turn."
        );
    }

    #[test]
    fn two_players_alternate_to_the_limit() {
        let mut rng = StdRng::seed_from_u64(9);
        let now = Utc::now();
        let (a, b) = (UserId::new(1), UserId::new(2));

        let mut story = Story::new(a, "A", "Once upon a time", [a, b], DEFAULT_LIMIT, now);
        assert_eq!(story.pick_next_turn(&mut rng, now), Ok(b));

        let mut last = TurnOutcome::Next(b);
        for i in 0..14 {
            let holder = story.turn().expect("story is running");
            let expected = if i % 2 == 0 { b } else { a };
            assert_eq!(holder, expected);

            last = story
                .add_sentence(holder, "someone", format!("Sentence {i}."), &mut rng, now)
                .expect("it's their turn");
        }

        assert_eq!(last, TurnOutcome::Finished);
        assert_eq!(story.status(), SessionStatus::Ended);
        assert_eq!(story.contributions().len(), 15);
        assert_eq!(story.transcript().lines().count(), 15);
        assert_eq!(
            story.add_sentence(a, "A", "More?", &mut rng, now),
            Err(StoryError::NoActiveSession)
        );
    }

    #[test]
    fn only_the_holder_may_add() {
        let mut rng = StdRng::seed_from_u64(5);
        let now = Utc::now();
        let (a, b) = (UserId::new(1), UserId::new(2));

        let mut story = Story::new(a, "A", "Hi.", [a, b], DEFAULT_LIMIT, now);
        assert_eq!(
            story.add_sentence(b, "B", "Too soon.", &mut rng, now),
            Err(StoryError::NotYourTurn)
        );

        story.pick_next_turn(&mut rng, now).expect("roster isn't empty");
        assert_eq!(
            story.add_sentence(a, "A", "Me again.", &mut rng, now),
            Err(StoryError::NotYourTurn)
        );
        assert_eq!(story.contributions().len(), 1);
    }

    #[test]
    fn stopping_needs_creator_or_privilege() {
        let now = Utc::now();
        let (a, b) = (UserId::new(1), UserId::new(2));

        let mut story = Story::new(a, "A", "Hi.", [a, b], DEFAULT_LIMIT, now);
        assert_eq!(story.stop(b, false), Err(StoryError::Forbidden));
        assert_eq!(story.status(), SessionStatus::InProgress);
        assert_eq!(story.stop(b, true), Ok(()));
        assert_eq!(story.status(), SessionStatus::Ended);

        let mut story = Story::new(a, "A", "Hi.", [a, b], DEFAULT_LIMIT, now);
        assert_eq!(story.stop(a, false), Ok(()));
    }

    #[test]
    fn snapshot_text() {
        let mut rng = StdRng::seed_from_u64(5);
        let now = Utc::now();
        let (a, b) = (UserId::new(1), UserId::new(2));

        let mut story = Story::new(a, "Ann", "Hi.", [a, b], 3, now);
        story.pick_next_turn(&mut rng, now).expect("roster isn't empty");
        story
            .add_sentence(b, "Bob", "Hello.", &mut rng, now)
            .expect("it's their turn");

        let snapshot = story.snapshot();
        assert_eq!(
            snapshot.description(),
            "**1. Ann:** Hi.\n**2. Bob:** Hello.\n\nIt's <@1>'s turn!"
        );
        assert!(snapshot
            .footer(Duration::minutes(5))
            .ends_with("after 5 minutes to steal the turn.\nProgress: 2/3"));
    }

    #[tokio::test]
    async fn table_lifecycle() {
        let table = StoryTable::new(DEFAULT_LIMIT, Duration::minutes(5));
        let channel = ChannelId::new(10);
        let (a, b, c) = (UserId::new(1), UserId::new(2), UserId::new(3));
        let now = Utc::now();

        let first = table
            .begin_signup(channel, a, "A", "Once upon a time", now)
            .await
            .expect("channel is free");
        assert_eq!(
            table.begin_signup(channel, b, "B", "Nope", now).await,
            Err(StoryError::AlreadyInProgress)
        );
        assert_eq!(
            table.render(channel).await.err(),
            Some(StoryError::NoActiveSession)
        );

        assert_eq!(
            table.close_signup(channel, first, vec![a], now).await.err(),
            Some(StoryError::InsufficientPlayers)
        );
        assert!(!table.sessions().contains(channel).await);

        let second = table
            .begin_signup(channel, a, "A", "Once upon a time", now)
            .await
            .expect("channel is free again");
        let start = table
            .close_signup(channel, second, vec![b], now)
            .await
            .expect("two players joined");
        assert_eq!(start.players, 2);
        assert_eq!(start.first_turn, b);

        assert_eq!(
            table
                .add_sentence(channel, c, "C".into(), "Hijack!".into(), now)
                .await
                .err(),
            Some(StoryError::NotYourTurn)
        );

        let report = table
            .add_sentence(channel, b, "B".into(), "There was a bot.".into(), now)
            .await
            .expect("b's turn");
        assert!(matches!(report, SentenceReport::Next { holder, .. } if holder == a));

        let taken = table
            .take_turn(channel, c, now + Duration::minutes(6))
            .await
            .expect("a has been idle");
        assert_eq!(taken.previous, a);
        assert_eq!(taken.snapshot.holder, Some(c));

        assert_eq!(
            table.stop(channel, b, "B", false).await.err(),
            Some(StoryError::Forbidden)
        );

        let ending = table.stop(channel, a, "A", false).await.expect("a created it");
        assert_eq!(ending.reason.as_deref(), Some("Stopped by A."));
        assert_eq!(ending.transcript.lines().count(), 2);
        assert!(!table.sessions().contains(channel).await);
    }

    #[tokio::test]
    async fn aborted_signup_frees_the_channel() {
        let table = StoryTable::new(DEFAULT_LIMIT, Duration::minutes(5));
        let channel = ChannelId::new(10);
        let now = Utc::now();

        let id = table
            .begin_signup(channel, UserId::new(1), "A", "Hi.", now)
            .await
            .expect("channel is free");
        assert!(table
            .sessions()
            .view(channel, |s| matches!(s.game(), StorySlot::SigningUp(_)))
            .await
            .unwrap_or(false));

        assert!(table.abort_signup(channel, id).await);
        assert!(!table.abort_signup(channel, id).await);
        assert!(!table.sessions().contains(channel).await);
        assert_eq!(
            table
                .close_signup(channel, id, vec![UserId::new(2)], now)
                .await
                .err(),
            Some(StoryError::NoActiveSession)
        );
    }

    #[tokio::test]
    async fn stale_signup_leaves_the_next_one_alone() {
        let table = StoryTable::new(DEFAULT_LIMIT, Duration::minutes(5));
        let channel = ChannelId::new(10);
        let (a, b, c) = (UserId::new(1), UserId::new(2), UserId::new(3));
        let now = Utc::now();

        let stale = table
            .begin_signup(channel, a, "A", "A's story", now)
            .await
            .expect("channel is free");
        table
            .stop(channel, a, "A", false)
            .await
            .expect("a opened the sign-up");

        let fresh = table
            .begin_signup(channel, b, "B", "B's story", now)
            .await
            .expect("channel is free again");
        assert_ne!(stale, fresh);

        assert_eq!(
            table.close_signup(channel, stale, vec![c], now).await.err(),
            Some(StoryError::NoActiveSession)
        );
        assert!(!table.abort_signup(channel, stale).await);
        assert!(table
            .sessions()
            .view(channel, |s| matches!(s.game(), StorySlot::SigningUp(_)))
            .await
            .unwrap_or(false));

        let start = table
            .close_signup(channel, fresh, vec![a], now)
            .await
            .expect("b's own sign-up closes");
        assert_eq!(start.players, 2);
        assert_eq!(start.snapshot.entries[0], ("B".to_owned(), "B's story".to_owned()));
    }
}
