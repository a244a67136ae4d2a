//! Static lookup tables for the four configuration enumerations, exposed
//! over HTTP as versioned JSON. No business logic depends on which variant
//! is selected — these exist purely so front-ends can render a picker.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MetadataEntry {
    pub value: &'static str,
    #[serde(rename = "displayName")]
    pub display_name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub version: &'static str,
    pub data: Vec<MetadataEntry>,
}

macro_rules! entries {
    ($($value:expr, $display:expr, $desc:expr;)+) => {
        vec![$(MetadataEntry { value: $value, display_name: $display, description: $desc }),+]
    };
}

pub fn meeting_goals() -> MetadataResponse {
    MetadataResponse {
        version: "1.0",
        data: entries! {
            "SHARE_INFORMATION", "Share Information", "Convey facts, updates, or context to attendees.";
            "ADVANCE_THINKING", "Advance Thinking", "Develop ideas further as a group.";
            "OBTAIN_INPUT", "Obtain Input", "Gather feedback or opinions from attendees.";
            "MAKE_DECISIONS", "Make Decisions", "Reach a concrete decision.";
            "IMPROVE_COMMUNICATION", "Improve Communication", "Strengthen understanding between attendees.";
            "BUILD_CAPACITY", "Build Capacity", "Grow skills or capability within the group.";
            "BUILD_COMMUNITY", "Build Community", "Strengthen relationships among attendees.";
        },
    }
}

pub fn participation_formats() -> MetadataResponse {
    MetadataResponse {
        version: "1.0",
        data: entries! {
            "STRUCTURED_GO_AROUNDS", "Structured Go-Arounds", "Each attendee speaks in turn.";
            "PRESENTATIONS_AND_REPORTS", "Presentations and Reports", "One or more attendees present to the group.";
            "SMALL_GROUPS", "Small Groups", "Attendees break into small groups.";
            "LISTING_IDEAS", "Listing Ideas", "Attendees contribute ideas to a shared list.";
            "JIGSAW", "Jigsaw", "Groups specialize then recombine to share findings.";
            "INDIVIDUAL_WRITING", "Individual Writing", "Attendees write independently before discussing.";
            "MULTI_TASKING", "Multi-Tasking", "Attendees work on several items in parallel.";
            "OPEN_DISCUSSION", "Open Discussion", "Unstructured, free-form discussion.";
            "FISHBOWLS", "Fishbowls", "A small inner group discusses while others observe.";
            "TRADESHOW", "Tradeshow", "Attendees circulate between stations.";
            "SCRAMBLER", "Scrambler", "Attendees are reshuffled between rounds.";
            "ROLEPLAYS", "Roleplays", "Attendees act out scenarios.";
        },
    }
}

pub fn decision_rules() -> MetadataResponse {
    MetadataResponse {
        version: "1.0",
        data: entries! {
            "UNANIMITY", "Unanimity", "All attendees must agree.";
            "GRADIENTS_OF_AGREEMENT", "Gradients of Agreement", "Attendees indicate their level of agreement.";
            "DOT_VOTING", "Dot Voting", "Attendees allocate a fixed number of votes across options.";
            "SUPERMAJORITY", "Supermajority", "A large majority threshold is required.";
            "MAJORITY", "Majority", "More than half must agree.";
            "PLURALITY", "Plurality", "The option with the most votes wins.";
            "CONSENT", "Consent", "Decision proceeds absent a reasoned objection.";
            "PERSON_IN_CHARGE", "Person in Charge", "A designated individual decides.";
            "COMMISSION", "Commission", "A subgroup is delegated to decide.";
            "FLIP_A_COIN", "Flip a Coin", "Decided at random.";
        },
    }
}

pub fn deliverables() -> MetadataResponse {
    MetadataResponse {
        version: "1.0",
        data: entries! {
            "DEFINE_PROBLEM", "Define Problem", "Articulate the problem to be solved.";
            "CREATE_MILESTONE_MAP", "Create Milestone Map", "Lay out major milestones.";
            "ANALYZE_PROBLEM", "Analyze Problem", "Break the problem down for analysis.";
            "CREATE_WORK_BREAKDOWN", "Create Work Breakdown", "Decompose work into tasks.";
            "IDENTIFY_ROOT_CAUSES", "Identify Root Causes", "Find underlying causes of an issue.";
            "CONDUCT_RESOURCE_ANALYSIS", "Conduct Resource Analysis", "Assess available resources.";
            "IDENTIFY_PATTERNS", "Identify Patterns", "Surface recurring patterns in the data.";
            "CONDUCT_RISK_ASSESSMENT", "Conduct Risk Assessment", "Evaluate risks and their impact.";
            "SORT_IDEAS_INTO_THEMES", "Sort Ideas into Themes", "Group related ideas together.";
            "DEFINE_SELECTION_CRITERIA", "Define Selection Criteria", "Agree on criteria for choosing among options.";
            "REARRANGE_BY_PRIORITY", "Rearrange by Priority", "Order items by importance.";
            "EVALUATE_OPTIONS", "Evaluate Options", "Assess candidate options against criteria.";
            "DRAW_FLOWCHART", "Draw Flowchart", "Diagram a process or decision flow.";
            "IDENTIFY_SUCCESS_FACTORS", "Identify Success Factors", "Determine what success requires.";
            "IDENTIFY_CORE_VALUES", "Identify Core Values", "Surface the group's guiding values.";
            "EDIT_STATEMENT", "Edit Statement", "Refine the wording of a shared statement.";
        },
    }
}
