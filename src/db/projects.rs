//! Project and card database operations

use super::AppState;
use crate::document::Card;
use crate::projects::models::{CardRecord, Project, PAYMENT_PAID, STATUS_COMPLETED};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, user_id, template, cards_per_page, signer_names, status, payment_status, payment_id, pdf_path, created_at";
const CARD_COLUMNS: &str = "id, project_id, recipient_name, gift, message, sort_order";

impl AppState {
    pub async fn create_project(
        &self,
        user_id: &Uuid,
        template: &str,
        cards_per_page: i16,
        signer_names: Option<&str>,
    ) -> Result<Project, sqlx::Error> {
        let sql = format!(
            "INSERT INTO projects (id, user_id, template, cards_per_page, signer_names) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(template)
            .bind(cards_per_page)
            .bind(signer_names)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn get_projects_for_user(&self, user_id: &Uuid) -> Result<Vec<Project>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Project by id, only if it belongs to `user_id`.
    pub async fn get_project_for_user(
        &self,
        id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Project>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND user_id = $2",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Append cards after any existing ones, keeping their order.
    pub async fn insert_cards(&self, project_id: &Uuid, cards: &[Card]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let start: i32 = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(sort_order) FROM cards WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?
        .map(|max| max + 1)
        .unwrap_or(0);

        for (offset, card) in cards.iter().enumerate() {
            sqlx::query(
                "INSERT INTO cards (id, project_id, recipient_name, gift, message, sort_order) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(&card.recipient_name)
            .bind(card.gift.as_deref())
            .bind(&card.message)
            .bind(start + offset as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(cards.len())
    }

    pub async fn get_cards(
        &self,
        project_id: &Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<CardRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM cards WHERE project_id = $1 ORDER BY sort_order, id LIMIT $2",
            CARD_COLUMNS
        );
        sqlx::query_as::<_, CardRecord>(&sql)
            .bind(project_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count_cards(&self, project_id: &Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cards WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Update a card's message; returns false when the card is not the user's.
    pub async fn update_card_message(
        &self,
        card_id: &Uuid,
        user_id: &Uuid,
        message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE cards SET message = $1
            WHERE id = $2
              AND project_id IN (SELECT id FROM projects WHERE user_id = $3)
            "#,
        )
        .bind(message)
        .bind(card_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_card_messages(&self, updates: &[(Uuid, String)]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for (card_id, message) in updates {
            sqlx::query("UPDATE cards SET message = $1 WHERE id = $2")
                .bind(message)
                .bind(card_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }

    /// Whether `payment_id` already paid for a project other than `project_id`.
    pub async fn payment_used_elsewhere(
        &self,
        payment_id: &str,
        project_id: &Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE payment_id = $1 AND id <> $2)",
        )
        .bind(payment_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn mark_project_paid(&self, id: &Uuid, payment_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET payment_status = $1, payment_id = $2 WHERE id = $3")
            .bind(PAYMENT_PAID)
            .bind(payment_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_project_pdf(&self, id: &Uuid, pdf_path: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET pdf_path = $1, status = $2 WHERE id = $3")
            .bind(pdf_path)
            .bind(STATUS_COMPLETED)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
