//! Repository for the `roadmaps` and `roadmap_steps` tables.

use learnlabs_core::types::DbId;
use sqlx::PgPool;

use crate::models::roadmap::{CreateRoadmap, Roadmap, RoadmapStep};

const COLUMNS: &str = "id, name, slug, description, difficulty, created_at";

const STEP_COLUMNS: &str = "id, roadmap_id, title, description, topic_slug, order_index, course_id";

/// Provides operations for roadmaps and their steps.
pub struct RoadmapRepo;

impl RoadmapRepo {
    /// Insert a roadmap and its steps in one transaction.
    ///
    /// Steps whose `topic_slug` already names an existing course are linked
    /// to it on insert.
    pub async fn create_with_steps(
        pool: &PgPool,
        input: &CreateRoadmap,
    ) -> Result<(Roadmap, Vec<RoadmapStep>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO roadmaps (name, slug, description, difficulty)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let roadmap = sqlx::query_as::<_, Roadmap>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.difficulty)
            .fetch_one(&mut *tx)
            .await?;

        let step_query = format!(
            "INSERT INTO roadmap_steps (roadmap_id, title, description, topic_slug, order_index, course_id)
             VALUES ($1, $2, $3, $4, $5, (SELECT id FROM courses WHERE slug = $4))
             RETURNING {STEP_COLUMNS}"
        );
        let mut steps = Vec::with_capacity(input.steps.len());
        for step in &input.steps {
            let row = sqlx::query_as::<_, RoadmapStep>(&step_query)
                .bind(roadmap.id)
                .bind(&step.title)
                .bind(&step.description)
                .bind(&step.topic_slug)
                .bind(step.order_index)
                .fetch_one(&mut *tx)
                .await?;
            steps.push(row);
        }

        tx.commit().await?;
        steps.sort_by_key(|s| s.order_index);
        Ok((roadmap, steps))
    }

    /// Find a roadmap by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Roadmap>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roadmaps WHERE id = $1");
        sqlx::query_as::<_, Roadmap>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a roadmap by its unique slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Roadmap>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roadmaps WHERE slug = $1");
        sqlx::query_as::<_, Roadmap>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all roadmaps ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Roadmap>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roadmaps ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Roadmap>(&query).fetch_all(pool).await
    }

    /// List a roadmap's steps in `order_index` order.
    pub async fn list_steps(
        pool: &PgPool,
        roadmap_id: DbId,
    ) -> Result<Vec<RoadmapStep>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM roadmap_steps WHERE roadmap_id = $1 \
             ORDER BY order_index ASC, id ASC"
        );
        sqlx::query_as::<_, RoadmapStep>(&query)
            .bind(roadmap_id)
            .fetch_all(pool)
            .await
    }

    /// Find the step of a roadmap that targets the given topic slug.
    pub async fn find_step_by_topic(
        pool: &PgPool,
        roadmap_id: DbId,
        topic_slug: &str,
    ) -> Result<Option<RoadmapStep>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM roadmap_steps \
             WHERE roadmap_id = $1 AND topic_slug = $2 \
             ORDER BY order_index ASC LIMIT 1"
        );
        sqlx::query_as::<_, RoadmapStep>(&query)
            .bind(roadmap_id)
            .bind(topic_slug)
            .fetch_optional(pool)
            .await
    }
}
