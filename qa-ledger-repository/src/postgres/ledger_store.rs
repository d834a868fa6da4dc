//! PostgreSQL implementation of the ledger store.
//!
//! Provides a production-ready PostgreSQL backend for the `LedgerStore` trait
//! with connection pooling and transaction safety.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - ACID transactions with automatic rollback on drop
//! - Balance changes as in-place increments (`score = score + $2`)
//! - Guarded vote mutations: updates and deletes match on the stored polarity
//! - Partial unique indexes enforcing one vote per (voter, target)
//!
//! ## Database Tables
//!
//! - `users`: Accounts with their score and reputation
//! - `questions`: Questions with lifecycle status and accepted answer
//! - `answers`: Answers, ordered per question by insertion sequence
//! - `votes`: Current votes, one row per (voter, target)
use async_trait::async_trait;
use qa_ledger_shared::types::{
    Answer, AnswerChangeset, AnswerId, BalanceDelta, Question, QuestionId, QuestionStatus, Target,
    User, UserId, Vote, VoteChangeset, VoteId, VoteMutation,
};
use tracing::debug;
use uuid::Uuid;

use super::rows::{vote_type, AnswerRow, QuestionRow, UserRow, VoteRow};
use crate::{LedgerStore, LedgerStoreError};

const USER_COLUMNS: &str =
    "id, username, email, score, reputation, is_moderator, is_banned, ban_reason, created_at";
const QUESTION_COLUMNS: &str =
    "id, author_id, title, text, image, tags, status, accepted_answer_id, created_at";
const ANSWER_COLUMNS: &str = "id, question_id, author_id, text, image, created_at";
const VOTE_COLUMNS: &str = "id, voter_id, question_id, answer_id, vote_type, voted_at";

/// Splits a target into its `(question_id, answer_id)` column values.
fn target_columns(target: Target) -> (Option<Uuid>, Option<Uuid>) {
    match target {
        Target::Question(id) => (Some(id), None),
        Target::Answer(id) => (None, Some(id)),
    }
}

fn target_column(target: Target) -> &'static str {
    match target {
        Target::Question(_) => "question_id",
        Target::Answer(_) => "answer_id",
    }
}

/// Returns true when the error is a unique or foreign key violation.
fn is_constraint_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation() || db.is_foreign_key_violation(),
        _ => false,
    }
}

/// PostgreSQL implementation of the ledger store.
///
/// ## Features
///
/// - Connection pooling with `sqlx::PgPool`
/// - Vote changesets and answer changesets each run in a single transaction
/// - Embedded migrations (`src/postgres/migrations`)
pub struct PostgresLedgerStore {
    pool: sqlx::PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL store instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresLedgerStore)` - Ready-to-use store instance
    /// * `Err(LedgerStoreError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, LedgerStoreError> {
        Ok(Self { pool })
    }

    /// Applies the embedded migrations to the connected database.
    pub async fn migrate(&self) -> Result<(), LedgerStoreError> {
        sqlx::migrate!("src/postgres/migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Applies a vote mutation within an active transaction.
    ///
    /// Inserts rely on the partial unique indexes to reject a second vote for the
    /// same (voter, target); updates and deletes only match a row that still has
    /// the polarity the caller read.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The mutation was applied
    /// * `Err(LedgerStoreError::VoteConflict)` - The row no longer matches the precondition
    async fn apply_vote_mutation_tx(
        &self,
        mutation: &VoteMutation,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), LedgerStoreError> {
        let rows_affected = match mutation {
            VoteMutation::Insert(vote) => {
                let (question_id, answer_id) = target_columns(vote.target);
                let result = sqlx::query(
                    r#"
                    INSERT INTO votes (id, voter_id, question_id, answer_id, vote_type, voted_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(vote.id)
                .bind(vote.voter_id)
                .bind(question_id)
                .bind(answer_id)
                .bind(vote_type(vote.polarity))
                .bind(vote.voted_at)
                .execute(&mut **tx)
                .await;
                match result {
                    Ok(done) => done.rows_affected(),
                    Err(e) if is_constraint_violation(&e) => return Err(LedgerStoreError::VoteConflict),
                    Err(e) => return Err(e.into()),
                }
            }
            VoteMutation::UpdatePolarity { vote_id, from, to } => sqlx::query(
                "UPDATE votes SET vote_type = $3, voted_at = NOW() WHERE id = $1 AND vote_type = $2",
            )
            .bind(vote_id)
            .bind(vote_type(*from))
            .bind(vote_type(*to))
            .execute(&mut **tx)
            .await?
            .rows_affected(),
            VoteMutation::Delete { vote_id, polarity } => {
                sqlx::query("DELETE FROM votes WHERE id = $1 AND vote_type = $2")
                    .bind(vote_id)
                    .bind(vote_type(*polarity))
                    .execute(&mut **tx)
                    .await?
                    .rows_affected()
            }
        };

        if rows_affected != 1 {
            return Err(LedgerStoreError::VoteConflict);
        }
        Ok(())
    }

    /// Increments user scores within an active transaction.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every delta was applied
    /// * `Err(LedgerStoreError::UserNotFound)` - A delta names a missing user
    async fn apply_balances_tx(
        &self,
        balances: &[BalanceDelta],
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), LedgerStoreError> {
        for delta in balances {
            let updated = sqlx::query("UPDATE users SET score = score + $2 WHERE id = $1")
                .bind(delta.user_id)
                .bind(delta.score)
                .execute(&mut **tx)
                .await?
                .rows_affected();
            if updated == 0 {
                return Err(LedgerStoreError::UserNotFound(delta.user_id));
            }
        }
        Ok(())
    }

    async fn fetch_votes(&self, sql: &str, id: Uuid) -> Result<Vec<Vote>, LedgerStoreError> {
        let rows: Vec<VoteRow> = sqlx::query_as(sql).bind(id).fetch_all(&self.pool).await?;
        rows.into_iter().map(Vote::try_from).collect()
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert_user(&self, user: &User) -> Result<(), LedgerStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, score, reputation, is_moderator, is_banned, ban_reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.score)
        .bind(user.reputation)
        .bind(user.is_moderator)
        .bind(user.is_banned)
        .bind(&user.ban_reason)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(LedgerStoreError::DuplicateUser(user.username.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn exists_moderator(&self) -> Result<bool, LedgerStoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE is_moderator)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn set_moderator(&self, id: UserId, is_moderator: bool) -> Result<Option<User>, LedgerStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET is_moderator = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_moderator)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn set_banned(
        &self,
        id: UserId,
        banned: bool,
        reason: Option<&str>,
    ) -> Result<Option<User>, LedgerStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET is_banned = $2, ban_reason = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(banned)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Deletes the user row; questions, answers and votes follow through
    /// `ON DELETE CASCADE`.
    async fn delete_user(&self, id: UserId) -> Result<bool, LedgerStoreError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        debug!(user_id = %id, deleted, "User delete executed");
        Ok(deleted > 0)
    }

    async fn adjust_score(&self, id: UserId, delta: f64) -> Result<(), LedgerStoreError> {
        let mut tx = self.pool.begin().await?;
        self.apply_balances_tx(&[BalanceDelta { user_id: id, score: delta }], &mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn adjust_reputation(&self, id: UserId, delta: i64) -> Result<(), LedgerStoreError> {
        let updated = sqlx::query("UPDATE users SET reputation = reputation + $2 WHERE id = $1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(LedgerStoreError::UserNotFound(id));
        }
        Ok(())
    }

    async fn insert_question(&self, question: &Question) -> Result<(), LedgerStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO questions (id, author_id, title, text, image, tags, status, accepted_answer_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(question.id)
        .bind(question.author_id)
        .bind(&question.title)
        .bind(&question.text)
        .bind(&question.image)
        .bind(&question.tags)
        .bind(question.status.as_str())
        .bind(question.accepted_answer_id)
        .bind(question.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(LedgerStoreError::UserNotFound(question.author_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_question(&self, id: QuestionId) -> Result<Option<Question>, LedgerStoreError> {
        let row: Option<QuestionRow> =
            sqlx::query_as(&format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Question::try_from).transpose()
    }

    async fn accept_answer(
        &self,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Option<Question>, LedgerStoreError> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            "UPDATE questions SET accepted_answer_id = $2, status = $3 WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(question_id)
        .bind(answer_id)
        .bind(QuestionStatus::Solved.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Question::try_from).transpose()
    }

    async fn delete_question(&self, id: QuestionId) -> Result<bool, LedgerStoreError> {
        let deleted = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn find_answer(&self, id: AnswerId) -> Result<Option<Answer>, LedgerStoreError> {
        let row: Option<AnswerRow> = sqlx::query_as(&format!("SELECT {ANSWER_COLUMNS} FROM answers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Answer::from))
    }

    async fn find_answers_of(&self, question_id: QuestionId) -> Result<Vec<Answer>, LedgerStoreError> {
        let rows: Vec<AnswerRow> = sqlx::query_as(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE question_id = $1 ORDER BY seq"
        ))
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Answer::from).collect())
    }

    /// Inserts an answer and applies its status transition in one transaction.
    ///
    /// The question row is locked with `FOR UPDATE` so a concurrent acceptance
    /// cannot slip between the status check and the insert.
    async fn persist_answer(&self, changeset: &AnswerChangeset<'_>) -> Result<(), LedgerStoreError> {
        let answer = changeset.answer;
        let mut tx = self.pool.begin().await?;

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM questions WHERE id = $1 FOR UPDATE")
            .bind(answer.question_id)
            .fetch_optional(&mut *tx)
            .await?;
        let status = status.ok_or(LedgerStoreError::QuestionNotFound(answer.question_id))?;
        if QuestionStatus::parse(&status) != Some(changeset.expected_status) {
            debug!(question_id = %answer.question_id, status = %status, "Question status moved");
            return Err(LedgerStoreError::StaleQuestionStatus(answer.question_id));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO answers (id, question_id, author_id, text, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(answer.id)
        .bind(answer.question_id)
        .bind(answer.author_id)
        .bind(&answer.text)
        .bind(&answer.image)
        .bind(answer.created_at)
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(LedgerStoreError::UserNotFound(answer.author_id)),
            Err(e) => return Err(e.into()),
        }

        if let Some(next) = changeset.next_status {
            sqlx::query("UPDATE questions SET status = $2 WHERE id = $1")
                .bind(answer.question_id)
                .bind(next.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_answer(&self, id: AnswerId) -> Result<bool, LedgerStoreError> {
        let deleted = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn find_vote(&self, voter_id: UserId, target: Target) -> Result<Option<Vote>, LedgerStoreError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE voter_id = $1 AND {} = $2",
            target_column(target)
        ))
        .bind(voter_id)
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Vote::try_from).transpose()
    }

    async fn find_vote_by_id(&self, id: VoteId) -> Result<Option<Vote>, LedgerStoreError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!("SELECT {VOTE_COLUMNS} FROM votes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Vote::try_from).transpose()
    }

    async fn find_votes_for(&self, target: Target) -> Result<Vec<Vote>, LedgerStoreError> {
        let sql = format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE {} = $1",
            target_column(target)
        );
        self.fetch_votes(&sql, target.id()).await
    }

    async fn find_votes_by_user(&self, voter_id: UserId) -> Result<Vec<Vote>, LedgerStoreError> {
        let sql = format!("SELECT {VOTE_COLUMNS} FROM votes WHERE voter_id = $1 ORDER BY voted_at");
        self.fetch_votes(&sql, voter_id).await
    }

    /// Atomically persists a vote changeset in a single transaction.
    ///
    /// Either the vote mutation and every balance increment commit, or the
    /// transaction is rolled back when it is dropped on the error path.
    async fn persist_vote_changeset(&self, changeset: &VoteChangeset<'_>) -> Result<(), LedgerStoreError> {
        let mut tx = self.pool.begin().await?;
        self.apply_vote_mutation_tx(changeset.mutation, &mut tx).await?;
        self.apply_balances_tx(changeset.balances, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Checks if the tables are created in the database.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If every ledger table exists
    async fn check_tables_created(&self) -> Result<bool, LedgerStoreError> {
        for table in ["users", "questions", "answers", "votes"] {
            let table_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
