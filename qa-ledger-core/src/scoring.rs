//! Score deltas caused by vote transitions.
//!
//! Everything here is pure: given the target kind and the polarity before and
//! after a vote request, it returns how much the content author's and the
//! voter's scores move. Applying the deltas is up to the caller.
use qa_ledger_shared::types::{Polarity, TargetKind};

pub const QUESTION_UPVOTE_SCORE: f64 = 2.5;
pub const QUESTION_DOWNVOTE_SCORE: f64 = -1.5;
pub const ANSWER_UPVOTE_SCORE: f64 = 5.0;
pub const ANSWER_DOWNVOTE_SCORE: f64 = -2.5;
/// Charged to the voter, not the author, while a downvote is active.
pub const DOWNVOTE_PENALTY: f64 = -1.5;

/// The score a single active vote contributes to the author of the target.
pub fn score(kind: TargetKind, polarity: Polarity) -> f64 {
    match (kind, polarity) {
        (TargetKind::Question, Polarity::Upvote) => QUESTION_UPVOTE_SCORE,
        (TargetKind::Question, Polarity::Downvote) => QUESTION_DOWNVOTE_SCORE,
        (TargetKind::Answer, Polarity::Upvote) => ANSWER_UPVOTE_SCORE,
        (TargetKind::Answer, Polarity::Downvote) => ANSWER_DOWNVOTE_SCORE,
    }
}

fn penalty(polarity: Polarity) -> f64 {
    if polarity.is_downvote() { DOWNVOTE_PENALTY } else { 0.0 }
}

/// A change of a voter's vote on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No vote existed; one is created.
    Create(Polarity),
    /// The existing vote is withdrawn.
    Remove(Polarity),
    /// The existing vote changes polarity.
    Flip { from: Polarity, to: Polarity },
}

impl Transition {
    /// Classifies the move from `old` to `new`.
    ///
    /// Returns `None` for the shapes that never reach the scoring engine:
    /// nothing to nothing, and a polarity to itself (callers treat the latter as
    /// a toggle-off and pass `new = None`).
    pub fn between(old: Option<Polarity>, new: Option<Polarity>) -> Option<Self> {
        match (old, new) {
            (None, Some(to)) => Some(Transition::Create(to)),
            (Some(from), None) => Some(Transition::Remove(from)),
            (Some(from), Some(to)) if from != to => Some(Transition::Flip { from, to }),
            _ => None,
        }
    }
}

/// Score changes for the target's author and for the voter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDeltas {
    pub author: f64,
    pub voter: f64,
}

impl ScoreDeltas {
    pub fn for_transition(kind: TargetKind, transition: Transition) -> Self {
        match transition {
            Transition::Create(to) => ScoreDeltas {
                author: score(kind, to),
                voter: penalty(to),
            },
            Transition::Remove(from) => ScoreDeltas {
                author: -score(kind, from),
                voter: -penalty(from),
            },
            Transition::Flip { from, to } => ScoreDeltas {
                author: score(kind, to) - score(kind, from),
                voter: penalty(to) - penalty(from),
            },
        }
    }
}
