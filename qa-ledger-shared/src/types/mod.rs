mod answer;
mod changeset;
mod question;
mod target;
mod user;
mod vote;
mod votes_count;

pub use answer::{Answer, RankedAnswer};
pub use changeset::{AnswerChangeset, BalanceDelta, VoteChangeset, VoteMutation};
pub use question::{Question, QuestionStatus};
pub use target::{Target, TargetKind};
pub use user::User;
pub use vote::{Polarity, Vote};
pub use votes_count::VotesCount;

use uuid::Uuid;

pub type UserId = Uuid;
pub type QuestionId = Uuid;
pub type AnswerId = Uuid;
pub type VoteId = Uuid;
