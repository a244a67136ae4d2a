//! The per-room state machine: speak queue, current speaker + timer, chair
//! role, poll lifecycle, and config. Every mutator runs under `Room`'s
//! internal mutex, mirroring the teacher's single-guard-per-resource style
//! (`PresenceTracker`, `RateLimiter`) rather than splitting locks per field.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::models::{
    CurrentSpeaker, Participant, PollResults, PollStateView, PollStatus, PollType, PollTypeTag,
    RoomConfig, Snapshot,
};
use crate::validation;

fn now_sec() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    ChairAccessDenied { session_id: Uuid },
    ChairOccupied,
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomError::ChairAccessDenied { session_id } => {
                write!(f, "session {session_id} is not the chair")
            }
            RoomError::ChairOccupied => write!(f, "chair is already occupied"),
        }
    }
}

/// A single session's ballot in the active poll.
#[derive(Debug, Clone)]
enum Ballot {
    Single(String),
    Multi(BTreeSet<String>),
}

#[derive(Debug)]
struct PollState {
    status: PollStatus,
    question: Option<String>,
    poll_type: Option<PollType>,
    tallies: BTreeMap<String, u64>,
    session_ballots: HashMap<Uuid, Ballot>,
    last_results: Option<PollResults>,
}

impl PollState {
    fn new() -> Self {
        PollState {
            status: PollStatus::None,
            question: None,
            poll_type: None,
            tallies: BTreeMap::new(),
            session_ballots: HashMap::new(),
            last_results: None,
        }
    }

    fn view(&self) -> Option<PollStateView> {
        match self.status {
            PollStatus::Active | PollStatus::Ended if self.question.is_some() => {
                let poll_type = self.poll_type.as_ref().unwrap();
                let total_votes: u64 = self.tallies.values().sum();
                Some(PollStateView {
                    status: self.status,
                    question: self.question.clone(),
                    poll_type: Some(poll_type.tag()),
                    options: poll_type.options().map(|o| o.to_vec()),
                    tallies: Some(self.tallies.clone()),
                    total_votes: Some(total_votes),
                    votes_per_participant: Some(poll_type.votes_per_participant()),
                    last_results: self.last_results.clone(),
                })
            }
            PollStatus::Closed if self.last_results.is_some() => Some(PollStateView {
                status: PollStatus::Closed,
                question: None,
                poll_type: None,
                options: None,
                tallies: None,
                total_votes: None,
                votes_per_participant: None,
                last_results: self.last_results.clone(),
            }),
            PollStatus::None if self.last_results.is_some() => Some(PollStateView {
                status: PollStatus::None,
                question: None,
                poll_type: None,
                options: None,
                tallies: None,
                total_votes: None,
                votes_per_participant: None,
                last_results: self.last_results.clone(),
            }),
            _ => None,
        }
    }

    fn start(&mut self, question: String, poll_type: PollType) {
        let keys = poll_type.option_keys();
        self.status = PollStatus::Active;
        self.question = Some(question);
        self.tallies = keys.into_iter().map(|k| (k, 0)).collect();
        self.session_ballots.clear();
        self.poll_type = Some(poll_type);
    }

    /// Returns `true` if the vote was accepted.
    fn cast_vote(&mut self, session_id: Uuid, key: &str) -> bool {
        if self.status != PollStatus::Active {
            return false;
        }
        let Some(poll_type) = &self.poll_type else { return false };
        if !self.tallies.contains_key(key) {
            return false;
        }

        match poll_type {
            PollType::MultiselectMultiple { votes_per_participant, .. } => {
                let cap = *votes_per_participant as usize;
                let set = match self.session_ballots.entry(session_id).or_insert_with(|| {
                    Ballot::Multi(BTreeSet::new())
                }) {
                    Ballot::Multi(s) => s,
                    Ballot::Single(_) => unreachable!("multi poll always uses Multi ballots"),
                };
                if set.remove(key) {
                    *self.tallies.get_mut(key).unwrap() -= 1;
                    true
                } else if set.len() < cap {
                    set.insert(key.to_string());
                    *self.tallies.get_mut(key).unwrap() += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                if let Some(Ballot::Single(prev)) = self.session_ballots.get(&session_id) {
                    let prev = prev.clone();
                    if prev == key {
                        // Re-voting for the same option is accepted as a no-op win.
                        return true;
                    }
                    *self.tallies.get_mut(&prev).unwrap() -= 1;
                }
                self.session_ballots.insert(session_id, Ballot::Single(key.to_string()));
                *self.tallies.get_mut(key).unwrap() += 1;
                true
            }
        }
    }

    fn end(&mut self) {
        if self.status != PollStatus::Active {
            return;
        }
        let poll_type = self.poll_type.as_ref().unwrap();
        let total_votes: u64 = self.tallies.values().sum();
        self.last_results = Some(PollResults {
            question: self.question.clone().unwrap(),
            poll_type: poll_type.tag(),
            tallies: self.tallies.clone(),
            total_votes,
            options: poll_type.options().map(|o| o.to_vec()),
        });
        self.status = PollStatus::Ended;
    }

    fn close(&mut self) {
        if self.status != PollStatus::Ended {
            return;
        }
        self.question = None;
        self.poll_type = None;
        self.tallies.clear();
        self.session_ballots.clear();
        self.status = PollStatus::Closed;
    }

    fn cancel(&mut self) {
        self.status = PollStatus::None;
        self.question = None;
        self.poll_type = None;
        self.tallies.clear();
        self.session_ballots.clear();
        self.last_results = None;
    }
}

struct RoomState {
    queue: VecDeque<Participant>,
    current: Option<CurrentSpeaker>,
    default_limit_sec: u32,
    chair_session_id: Option<Uuid>,
    config: RoomConfig,
    poll: PollState,
}

/// The stateful unit owning a single meeting room's queue, timer, chair,
/// config, and poll. `code`/`created_at_nanos`/`order_seq` are immutable
/// and safe to read without the lock.
pub struct Room {
    pub code: String,
    pub created_at_sec: i64,
    pub created_at_nanos: i64,
    pub order_seq: u64,
    state: Mutex<RoomState>,
}

const DEFAULT_LIMIT_SEC: u32 = 180;

impl Room {
    pub fn new(code: String, created_at_nanos: i64, order_seq: u64) -> Self {
        Room {
            code,
            created_at_sec: created_at_nanos / 1_000_000_000,
            created_at_nanos,
            order_seq,
            state: Mutex::new(RoomState {
                queue: VecDeque::new(),
                current: None,
                default_limit_sec: DEFAULT_LIMIT_SEC,
                chair_session_id: None,
                config: RoomConfig::default(),
                poll: PollState::new(),
            }),
        }
    }

    fn name_taken(state: &RoomState, name: &str) -> bool {
        let lower = name.to_lowercase();
        state
            .current
            .as_ref()
            .is_some_and(|c| c.participant.name.to_lowercase() == lower)
            || state.queue.iter().any(|p| p.name.to_lowercase() == lower)
    }

    pub fn add_to_queue(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        if Self::name_taken(&state, name) {
            return;
        }
        state.queue.push_back(Participant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            requested_at_sec: now_sec(),
        });
    }

    pub fn withdraw(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let lower = name.to_lowercase();
        if let Some(pos) = state.queue.iter().position(|p| p.name.to_lowercase() == lower) {
            state.queue.remove(pos);
        }
    }

    pub fn next_participant(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        state.current = None;
        if let Some(p) = state.queue.pop_front() {
            let limit_sec = state.default_limit_sec;
            state.current = Some(CurrentSpeaker {
                participant: p,
                started_at_sec: now_sec(),
                elapsed_ms: 0,
                running: true,
                limit_sec,
            });
        }
        Ok(())
    }

    pub fn start_timer(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        if let Some(c) = state.current.as_mut() {
            if !c.running {
                c.running = true;
                c.started_at_sec = now_sec();
            }
        }
        Ok(())
    }

    pub fn pause_timer(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        let now = now_sec();
        if let Some(c) = state.current.as_mut() {
            if c.running {
                c.elapsed_ms += (now - c.started_at_sec) * 1000;
                c.running = false;
            }
        }
        Ok(())
    }

    pub fn reset_timer(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        if let Some(c) = state.current.as_mut() {
            c.elapsed_ms = 0;
            c.started_at_sec = now_sec();
            c.running = true;
        }
        Ok(())
    }

    pub fn update_limit(&self, chair_session: Uuid, seconds: i64) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        let clamped = validation::clamp_limit_sec(seconds);
        state.default_limit_sec = clamped;
        if let Some(c) = state.current.as_mut() {
            c.limit_sec = clamped;
        }
        Ok(())
    }

    pub fn assume_chair(&self, session_id: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        match state.chair_session_id {
            Some(existing) if existing == session_id => Ok(()),
            Some(_) => Err(RoomError::ChairOccupied),
            None => {
                state.chair_session_id = Some(session_id);
                Ok(())
            }
        }
    }

    pub fn release_chair(&self, session_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if state.chair_session_id == Some(session_id) {
            state.chair_session_id = None;
        }
    }

    pub fn is_chair(&self, session_id: Uuid) -> bool {
        self.state.lock().unwrap().chair_session_id == Some(session_id)
    }

    fn require_chair(&self, state: &RoomState, session_id: Uuid) -> Result<(), RoomError> {
        if state.chair_session_id == Some(session_id) {
            Ok(())
        } else {
            Err(RoomError::ChairAccessDenied { session_id })
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start_poll(
        &self,
        chair_session: Uuid,
        question: String,
        poll_type: PollType,
    ) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        state.poll.start(question, poll_type);
        Ok(())
    }

    /// Open to anyone; only accepted while the poll is Active. Returns
    /// whether the vote was accepted (unknown keys / over-cap are rejected
    /// silently, per spec.md §4.2).
    pub fn cast_vote(&self, session_id: Uuid, key: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        state.poll.cast_vote(session_id, key)
    }

    pub fn end_poll(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        state.poll.end();
        Ok(())
    }

    pub fn close_poll(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        state.poll.close();
        Ok(())
    }

    pub fn cancel_poll(&self, chair_session: Uuid) -> Result<(), RoomError> {
        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        state.poll.cancel();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_config(
        &self,
        chair_session: Uuid,
        topic: Option<String>,
        meeting_goal: Option<String>,
        participation_format: Option<String>,
        decision_rule: Option<String>,
        deliverable: Option<String>,
    ) -> Result<(), RoomError> {
        use crate::models::{DecisionRule, Deliverable, MeetingGoal, ParticipationFormat};

        let mut state = self.state.lock().unwrap();
        self.require_chair(&state, chair_session)?;
        if let Some(t) = topic {
            state.config.topic = if t.is_empty() { None } else { Some(t) };
        }
        if let Some(g) = meeting_goal {
            state.config.meeting_goal = MeetingGoal::parse(&g);
        }
        if let Some(f) = participation_format {
            state.config.participation_format = ParticipationFormat::parse(&f);
        }
        if let Some(d) = decision_rule {
            state.config.decision_rule = DecisionRule::parse(&d);
        }
        if let Some(d) = deliverable {
            state.config.deliverable = Deliverable::parse(&d);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().unwrap();
        Snapshot {
            queue: state.queue.iter().cloned().collect(),
            current: state.current.clone(),
            meeting_start_sec: self.created_at_sec,
            default_limit_sec: state.default_limit_sec,
            room_code: self.code.clone(),
            chair_occupied: state.chair_session_id.is_some(),
            poll_state: state.poll.view(),
            room_config: state.config.clone(),
        }
    }
}

/// Parses the wire poll-type tag plus options into the tagged `PollType`.
/// Chair-only callers are expected to have already validated the question
/// and options lengths; this only shapes the variant.
pub fn build_poll_type(
    tag: PollTypeTag,
    options: Option<Vec<String>>,
    votes_per_participant: Option<u32>,
) -> PollType {
    match tag {
        PollTypeTag::YesNo => PollType::YesNo,
        PollTypeTag::Gradients => PollType::Gradients,
        PollTypeTag::Multiselect => PollType::Multiselect {
            options: options.unwrap_or_default(),
        },
        PollTypeTag::MultiselectMultiple => PollType::MultiselectMultiple {
            options: options.unwrap_or_default(),
            votes_per_participant: votes_per_participant.unwrap_or(1).max(1),
        },
    }
}
