use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A waiting (or currently-speaking) participant.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "requestedAtSec")]
    pub requested_at_sec: i64,
}

/// The one participant presently holding the floor, with its timer.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSpeaker {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(rename = "startedAtSec")]
    pub started_at_sec: i64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: i64,
    pub running: bool,
    #[serde(rename = "limitSec")]
    pub limit_sec: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingGoal {
    ShareInformation,
    AdvanceThinking,
    ObtainInput,
    MakeDecisions,
    ImproveCommunication,
    BuildCapacity,
    BuildCommunity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationFormat {
    StructuredGoArounds,
    PresentationsAndReports,
    SmallGroups,
    ListingIdeas,
    Jigsaw,
    IndividualWriting,
    MultiTasking,
    OpenDiscussion,
    Fishbowls,
    Tradeshow,
    Scrambler,
    Roleplays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionRule {
    Unanimity,
    GradientsOfAgreement,
    DotVoting,
    Supermajority,
    Majority,
    Plurality,
    Consent,
    PersonInCharge,
    Commission,
    FlipACoin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Deliverable {
    DefineProblem,
    CreateMilestoneMap,
    AnalyzeProblem,
    CreateWorkBreakdown,
    IdentifyRootCauses,
    ConductResourceAnalysis,
    IdentifyPatterns,
    ConductRiskAssessment,
    SortIdeasIntoThemes,
    DefineSelectionCriteria,
    RearrangeByPriority,
    EvaluateOptions,
    DrawFlowchart,
    IdentifySuccessFactors,
    IdentifyCoreValues,
    EditStatement,
}

/// Parses a SCREAMING_SNAKE_CASE enum value leniently: unknown input is
/// `None` rather than an error, per spec.md §4.2's "null on parse failure
/// is accepted to mean unset".
fn parse_enum_lenient<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

impl MeetingGoal {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum_lenient(raw)
    }
}

impl ParticipationFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum_lenient(raw)
    }
}

impl DecisionRule {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum_lenient(raw)
    }
}

impl Deliverable {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum_lenient(raw)
    }
}

/// Room-level configuration, every field individually nullable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomConfig {
    pub topic: Option<String>,
    #[serde(rename = "meetingGoal")]
    pub meeting_goal: Option<MeetingGoal>,
    #[serde(rename = "participationFormat")]
    pub participation_format: Option<ParticipationFormat>,
    #[serde(rename = "decisionRule")]
    pub decision_rule: Option<DecisionRule>,
    pub deliverable: Option<Deliverable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollTypeTag {
    YesNo,
    Gradients,
    Multiselect,
    MultiselectMultiple,
}

/// Tagged poll-type variant, per spec.md §9's design note: a discriminated
/// union rather than a bag of nullable fields. `options`/`votes_per_participant`
/// only exist where they're meaningful.
#[derive(Debug, Clone)]
pub enum PollType {
    YesNo,
    Gradients,
    Multiselect { options: Vec<String> },
    MultiselectMultiple { options: Vec<String>, votes_per_participant: u32 },
}

impl PollType {
    pub fn tag(&self) -> PollTypeTag {
        match self {
            PollType::YesNo => PollTypeTag::YesNo,
            PollType::Gradients => PollTypeTag::Gradients,
            PollType::Multiselect { .. } => PollTypeTag::Multiselect,
            PollType::MultiselectMultiple { .. } => PollTypeTag::MultiselectMultiple,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            PollType::Multiselect { options } => Some(options),
            PollType::MultiselectMultiple { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn votes_per_participant(&self) -> u32 {
        match self {
            PollType::MultiselectMultiple { votes_per_participant, .. } => *votes_per_participant,
            _ => 1,
        }
    }

    /// All valid option keys for this poll type, in canonical order.
    pub fn option_keys(&self) -> Vec<String> {
        match self {
            PollType::YesNo => vec!["YES".to_string(), "NO".to_string()],
            PollType::Gradients => (1..=8).map(|n| format!("OPT_{n}")).collect(),
            PollType::Multiselect { options } | PollType::MultiselectMultiple { options, .. } => {
                (0..options.len()).map(|i| format!("OPT_{i}")).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollStatus {
    None,
    Active,
    Ended,
    Closed,
}

/// Terminal tally of the most recently ended/closed poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollResults {
    pub question: String,
    #[serde(rename = "type")]
    pub poll_type: PollTypeTag,
    pub tallies: BTreeMap<String, u64>,
    #[serde(rename = "totalVotes")]
    pub total_votes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Derived, read-only view of poll state exposed in a room snapshot.
/// Projection rules per spec.md §4.2.
#[derive(Debug, Clone, Serialize)]
pub struct PollStateView {
    pub status: PollStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub poll_type: Option<PollTypeTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tallies: Option<BTreeMap<String, u64>>,
    #[serde(rename = "totalVotes", skip_serializing_if = "Option::is_none")]
    pub total_votes: Option<u64>,
    #[serde(rename = "votesPerParticipant", skip_serializing_if = "Option::is_none")]
    pub votes_per_participant: Option<u32>,
    #[serde(rename = "lastResults", skip_serializing_if = "Option::is_none")]
    pub last_results: Option<PollResults>,
}

/// The immutable, authoritative view of a room broadcast to subscribers
/// after every state mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub queue: Vec<Participant>,
    pub current: Option<CurrentSpeaker>,
    #[serde(rename = "meetingStartSec")]
    pub meeting_start_sec: i64,
    #[serde(rename = "defaultLimitSec")]
    pub default_limit_sec: u32,
    #[serde(rename = "roomCode")]
    pub room_code: String,
    #[serde(rename = "chairOccupied")]
    pub chair_occupied: bool,
    #[serde(rename = "pollState")]
    pub poll_state: Option<PollStateView>,
    #[serde(rename = "roomConfig")]
    pub room_config: RoomConfig,
}

// --- Command payloads (deserialized from JSON request bodies) ---

#[derive(Debug, Deserialize)]
pub struct JoinCommand {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AssumeChairCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(rename = "participantName")]
    pub participant_name: String,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NameCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Option<Uuid>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChairOnlyCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Reset,
}

#[derive(Debug, Deserialize)]
pub struct TimerCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub action: TimerAction,
}

#[derive(Debug, Deserialize)]
pub struct SetLimitCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct PollStartCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub question: String,
    #[serde(rename = "pollType")]
    pub poll_type: PollTypeTag,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(rename = "votesPerParticipant", default)]
    pub votes_per_participant: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PollVoteCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub vote: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConfigCommand {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(rename = "meetingGoal", default)]
    pub meeting_goal: Option<String>,
    #[serde(rename = "participationFormat", default)]
    pub participation_format: Option<String>,
    #[serde(rename = "decisionRule", default)]
    pub decision_rule: Option<String>,
    #[serde(default)]
    pub deliverable: Option<String>,
}
