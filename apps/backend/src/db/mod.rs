//! PostgreSQL database operations

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::Result;
use crate::models::*;
use vocab_core::PersistedState;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Handle to a closed port with a short acquire timeout.
    #[cfg(test)]
    pub(crate) fn unreachable() -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://vocab@127.0.0.1:1/vocab")
            .expect("valid database url");
        Self { pool }
    }

    /// Load everything the vocabulary workspace needs at startup.
    pub async fn load_state(&self) -> Result<PersistedState> {
        let items_saved: Option<i16> = sqlx::query_scalar("SELECT id FROM vocabulary_meta WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        let items = match items_saved {
            Some(_) => Some(self.get_items().await?),
            None => None,
        };

        Ok(PersistedState {
            items,
            daily_stats: self.get_daily_progress().await?,
            test_history: self.get_test_results().await?,
            settings: self.get_settings().await?,
        })
    }

    // === Item Repository ===

    /// Get all items in store order
    pub async fn get_items(&self) -> Result<Vec<VocabularyItem>> {
        let rows = sqlx::query_as::<_, DbItem>(
            r#"
            SELECT id, position, word, translation, example, category, difficulty,
                   repetition_level, correct_count, incorrect_count,
                   last_reviewed, next_review_date, created_at
            FROM vocabulary_items
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbItem::to_core).collect())
    }

    /// Replace the stored item list in one transaction
    pub async fn replace_items(&self, items: &[VocabularyItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM vocabulary_items")
            .execute(&mut *tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            let row = DbItem::from_core(position, item);
            sqlx::query(
                r#"
                INSERT INTO vocabulary_items (
                    id, position, word, translation, example, category, difficulty,
                    repetition_level, correct_count, incorrect_count,
                    last_reviewed, next_review_date, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(row.id)
            .bind(row.position)
            .bind(&row.word)
            .bind(&row.translation)
            .bind(&row.example)
            .bind(&row.category)
            .bind(&row.difficulty)
            .bind(row.repetition_level)
            .bind(row.correct_count)
            .bind(row.incorrect_count)
            .bind(row.last_reviewed)
            .bind(row.next_review_date)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO vocabulary_meta (id, items_saved_at)
            VALUES (1, NOW())
            ON CONFLICT (id) DO UPDATE SET items_saved_at = NOW()
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // === Daily Progress Repository ===

    pub async fn get_daily_progress(&self) -> Result<Vec<DailyProgressStat>> {
        let rows = sqlx::query_as::<_, DbDailyProgress>(
            r#"
            SELECT date, words_reviewed, correct, incorrect
            FROM daily_progress
            ORDER BY date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbDailyProgress::to_core).collect())
    }

    /// Insert or overwrite the record of one day
    pub async fn upsert_daily_progress(&self, stat: &DailyProgressStat) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_progress (date, words_reviewed, correct, incorrect)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (date) DO UPDATE SET
                words_reviewed = EXCLUDED.words_reviewed,
                correct = EXCLUDED.correct,
                incorrect = EXCLUDED.incorrect
            "#,
        )
        .bind(stat.date)
        .bind(stat.words_reviewed as i32)
        .bind(stat.correct as i32)
        .bind(stat.incorrect as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Test Result Repository ===

    pub async fn get_test_results(&self) -> Result<Vec<TestResult>> {
        let rows = sqlx::query_as::<_, DbTestResult>(
            r#"
            SELECT id, started_at, ended_at, total_questions, correct_answers,
                   wrong_answers, timed_out, answers, settings
            FROM test_results
            ORDER BY ended_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DbTestResult::into_core).collect())
    }

    pub async fn insert_test_result(&self, result: &TestResult) -> Result<()> {
        let row = DbTestResult::from_core(result);
        sqlx::query(
            r#"
            INSERT INTO test_results (
                id, started_at, ended_at, total_questions, correct_answers,
                wrong_answers, timed_out, answers, settings
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(row.id)
        .bind(row.started_at)
        .bind(row.ended_at)
        .bind(row.total_questions)
        .bind(row.correct_answers)
        .bind(row.wrong_answers)
        .bind(row.timed_out)
        .bind(&row.answers)
        .bind(&row.settings)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Settings Repository ===

    pub async fn get_settings(&self) -> Result<Option<UserSettings>> {
        let goal: Option<i32> = sqlx::query_scalar("SELECT daily_goal FROM user_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(goal.map(|daily_goal| UserSettings {
            daily_goal: daily_goal.max(0) as u32,
        }))
    }

    pub async fn upsert_settings(&self, settings: &UserSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (id, daily_goal, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET
                daily_goal = EXCLUDED.daily_goal,
                updated_at = NOW()
            "#,
        )
        .bind(settings.daily_goal as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
