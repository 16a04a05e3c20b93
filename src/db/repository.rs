//! Database repository for the member and task tables.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Availability, AvailabilitySource, CalendarEntry, CreateMemberRequest, CreateTaskRequest,
    Datastore, Priority, RevisionInfo, SeedData, SkillScore, Task, TaskStatus, TeamMember,
};

const MEMBER_COLUMNS: &str = "id, name, role, skills, availability, is_out_of_office, source, manual_override_active, slack_ooo_from, slack_ooo_until, slack_pending_until, calendar_free_pct, updated_at, version";

const TASK_COLUMNS: &str =
    "id, title, project_name, priority, deadline, assignee_id, status, needs_rescoring, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        bump_revision(&self.pool).await?;
        self.get_revision_id().await
    }

    /// Get the full datastore.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let members = self.list_members().await?;
        let tasks = self.list_tasks().await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            members,
            tasks,
        })
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members in roster order (name, then id).
    pub async fn list_members(&self) -> Result<Vec<TeamMember>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members ORDER BY name, id",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<TeamMember>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Create a new member with default availability.
    pub async fn create_member(
        &self,
        request: &CreateMemberRequest,
    ) -> Result<TeamMember, AppError> {
        let mut tx = self.pool.begin().await?;
        let member = insert_member(&mut tx, request).await?;
        bump_revision(&mut *tx).await?;
        tx.commit().await?;
        Ok(member)
    }

    /// Set a manual availability override. Clears any Slack window.
    pub async fn set_override(
        &self,
        id: &str,
        availability: Availability,
    ) -> Result<TeamMember, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"UPDATE members SET
                availability = ?, is_out_of_office = ?, source = ?,
                manual_override_active = 1,
                slack_ooo_from = NULL, slack_ooo_until = NULL, slack_pending_until = NULL,
                updated_at = ?, version = version + 1
            WHERE id = ?"#,
        )
        .bind(availability.as_str())
        .bind((availability == Availability::Ooo) as i32)
        .bind(AvailabilitySource::Manual.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.finish_member_write(id, result.rows_affected()).await
    }

    /// Drop a manual override and hand the member back to automated signals.
    pub async fn clear_override(&self, id: &str) -> Result<TeamMember, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"UPDATE members SET
                availability = ?, is_out_of_office = 0, source = ?,
                manual_override_active = 0,
                slack_ooo_from = NULL, slack_ooo_until = NULL, slack_pending_until = NULL,
                updated_at = ?, version = version + 1
            WHERE id = ?"#,
        )
        .bind(Availability::Available.as_str())
        .bind(AvailabilitySource::Default.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.finish_member_write(id, result.rows_affected()).await
    }

    /// Store the latest calendar free percentage for one member.
    pub async fn set_calendar_free_pct(&self, id: &str, pct: f64) -> Result<TeamMember, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE members SET calendar_free_pct = ?, updated_at = ?, version = version + 1 WHERE id = ?",
        )
        .bind(pct)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.finish_member_write(id, result.rows_affected()).await
    }

    /// Store a whole calendar import in one transaction.
    pub async fn batch_set_calendar(
        &self,
        entries: &[CalendarEntry],
    ) -> Result<Vec<TeamMember>, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            let result = sqlx::query(
                "UPDATE members SET calendar_free_pct = ?, updated_at = ?, version = version + 1 WHERE id = ?",
            )
            .bind(entry.calendar_free_pct)
            .bind(&now)
            .bind(&entry.member_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier entries
                return Err(AppError::member_not_found(&entry.member_id));
            }
        }

        bump_revision(&mut *tx).await?;
        tx.commit().await?;

        let mut updated = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(member) = self.get_member(&entry.member_id).await? {
                updated.push(member);
            }
        }
        Ok(updated)
    }

    /// Commit the availability fields of members changed by a reconciliation
    /// pass or sweep, all in one transaction.
    ///
    /// Each update only lands while the member has no manual override. Returns
    /// the ids whose update was refused because an override appeared after
    /// the roster was read.
    pub async fn commit_automated_updates(
        &self,
        members: &[TeamMember],
    ) -> Result<Vec<String>, AppError> {
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now().to_rfc3339();
        let mut refused = Vec::new();
        let mut tx = self.pool.begin().await?;

        for member in members {
            let result = sqlx::query(
                r#"UPDATE members SET
                    availability = ?, is_out_of_office = ?, source = ?,
                    slack_ooo_from = ?, slack_ooo_until = ?, slack_pending_until = ?,
                    updated_at = ?, version = version + 1
                WHERE id = ? AND manual_override_active = 0"#,
            )
            .bind(member.availability.as_str())
            .bind(member.is_out_of_office as i32)
            .bind(member.source.as_str())
            .bind(member.slack_ooo_from)
            .bind(member.slack_ooo_until)
            .bind(member.slack_pending_until)
            .bind(&now)
            .bind(&member.id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                refused.push(member.id.clone());
            }
        }

        if refused.len() < members.len() {
            bump_revision(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(refused)
    }

    async fn finish_member_write(
        &self,
        id: &str,
        rows_affected: u64,
    ) -> Result<TeamMember, AppError> {
        if rows_affected == 0 {
            return Err(AppError::member_not_found(id));
        }
        self.increment_revision().await?;
        self.get_member(id)
            .await?
            .ok_or_else(|| AppError::member_not_found(id))
    }

    // ==================== TASK OPERATIONS ====================

    /// List all tasks, earliest deadline first.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tasks ORDER BY deadline, id",
            TASK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(task_from_row).collect())
    }

    /// Get a task by ID.
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(task_from_row))
    }

    /// Create a new task.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;
        let task = insert_task(&mut tx, request).await?;
        bump_revision(&mut *tx).await?;
        tx.commit().await?;
        Ok(task)
    }

    /// Persist the lifecycle fields of `task`, guarded by the version it was read at.
    pub async fn save_task_state(&self, task: &Task) -> Result<Task, AppError> {
        let now = Utc::now().to_rfc3339();
        let new_version = task.version + 1;

        let result = sqlx::query(
            r#"UPDATE tasks SET
                assignee_id = ?, status = ?, needs_rescoring = ?,
                updated_at = ?, version = ?
            WHERE id = ? AND version = ?"#,
        )
        .bind(&task.assignee_id)
        .bind(task.status.as_str())
        .bind(task.needs_rescoring as i32)
        .bind(&now)
        .bind(new_version)
        .bind(&task.id)
        .bind(task.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_task(&task.id).await? {
                Some(_) => Err(AppError::Conflict(format!(
                    "Task {} was modified concurrently",
                    task.id
                ))),
                None => Err(AppError::task_not_found(&task.id)),
            };
        }

        self.increment_revision().await?;

        Ok(Task {
            updated_at: now,
            version: new_version,
            ..task.clone()
        })
    }

    // ==================== SKILL SCORES ====================

    /// Skill scores recorded for a task.
    pub async fn list_skill_scores(&self, task_id: &str) -> Result<Vec<SkillScore>, AppError> {
        let rows = sqlx::query(
            "SELECT member_id, skill_match_pct, context_reason FROM skill_scores WHERE task_id = ? ORDER BY member_id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SkillScore {
                member_id: row.get("member_id"),
                skill_match_pct: row.get("skill_match_pct"),
                context_reason: row.get("context_reason"),
            })
            .collect())
    }

    /// Upsert skill scores for a task and clear its re-scoring flag.
    pub async fn upsert_skill_scores(
        &self,
        task_id: &str,
        scores: &[SkillScore],
    ) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let task_exists = sqlx::query("SELECT 1 FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !task_exists {
            return Err(AppError::task_not_found(task_id));
        }

        for score in scores {
            let member_exists = sqlx::query("SELECT 1 FROM members WHERE id = ?")
                .bind(&score.member_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            if !member_exists {
                return Err(AppError::member_not_found(&score.member_id));
            }

            sqlx::query(
                r#"INSERT INTO skill_scores (task_id, member_id, skill_match_pct, context_reason)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(task_id, member_id) DO UPDATE SET
                    skill_match_pct = excluded.skill_match_pct,
                    context_reason = excluded.context_reason"#,
            )
            .bind(task_id)
            .bind(&score.member_id)
            .bind(score.skill_match_pct)
            .bind(&score.context_reason)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE tasks SET needs_rescoring = 0, updated_at = ?, version = version + 1 WHERE id = ?",
        )
        .bind(&now)
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== SEED ====================

    /// Insert a seed roster and task list in one transaction.
    pub async fn seed(&self, seed: &SeedData) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for member in &seed.members {
            insert_member(&mut tx, member).await?;
        }
        for task in &seed.tasks {
            insert_task(&mut tx, task).await?;
        }
        bump_revision(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn bump_revision<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

async fn insert_member(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    request: &CreateMemberRequest,
) -> Result<TeamMember, AppError> {
    let id = request
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let now = Utc::now().to_rfc3339();
    let skills_json = serde_json::to_string(&request.skills)?;

    let exists = sqlx::query("SELECT 1 FROM members WHERE id = ?")
        .bind(&id)
        .fetch_optional(&mut **tx)
        .await?
        .is_some();
    if exists {
        return Err(AppError::Conflict(format!("Member {} already exists", id)));
    }

    sqlx::query(
        r#"INSERT INTO members (id, name, role, skills, availability, is_out_of_office, source,
            manual_override_active, slack_ooo_from, slack_ooo_until, slack_pending_until,
            calendar_free_pct, updated_at, version)
        VALUES (?, ?, ?, ?, ?, 0, ?, 0, NULL, NULL, NULL, ?, ?, 1)"#,
    )
    .bind(&id)
    .bind(&request.name)
    .bind(&request.role)
    .bind(&skills_json)
    .bind(Availability::Available.as_str())
    .bind(AvailabilitySource::Default.as_str())
    .bind(request.calendar_free_pct)
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    Ok(TeamMember {
        id,
        name: request.name.clone(),
        role: request.role.clone(),
        skills: request.skills.clone(),
        availability: Availability::Available,
        is_out_of_office: false,
        source: AvailabilitySource::Default,
        manual_override_active: false,
        slack_ooo_from: None,
        slack_ooo_until: None,
        slack_pending_until: None,
        calendar_free_pct: request.calendar_free_pct,
        updated_at: now,
        version: 1,
    })
}

async fn insert_task(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    request: &CreateTaskRequest,
) -> Result<Task, AppError> {
    let id = request
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let now = Utc::now().to_rfc3339();

    let exists = sqlx::query("SELECT 1 FROM tasks WHERE id = ?")
        .bind(&id)
        .fetch_optional(&mut **tx)
        .await?
        .is_some();
    if exists {
        return Err(AppError::Conflict(format!("Task {} already exists", id)));
    }

    sqlx::query(
        r#"INSERT INTO tasks (id, title, project_name, priority, deadline, assignee_id, status,
            needs_rescoring, updated_at, version)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, 1)"#,
    )
    .bind(&id)
    .bind(&request.title)
    .bind(&request.project_name)
    .bind(request.priority.as_str())
    .bind(request.deadline)
    .bind(&request.assignee_id)
    .bind(request.status.as_str())
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    Ok(Task {
        id,
        title: request.title.clone(),
        project_name: request.project_name.clone(),
        priority: request.priority,
        deadline: request.deadline,
        assignee_id: request.assignee_id.clone(),
        status: request.status,
        needs_rescoring: true,
        suggestions: Vec::new(),
        updated_at: now,
        version: 1,
    })
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    let skills_str: Option<String> = row.get("skills");
    let availability: String = row.get("availability");
    let source: String = row.get("source");
    let is_out_of_office: i32 = row.get("is_out_of_office");
    let manual_override_active: i32 = row.get("manual_override_active");

    TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        role: row.get("role"),
        skills: skills_str.map(|s| parse_json_array(&s)).unwrap_or_default(),
        availability: Availability::from_str(&availability).unwrap_or_default(),
        is_out_of_office: is_out_of_office != 0,
        source: AvailabilitySource::from_str(&source).unwrap_or_default(),
        manual_override_active: manual_override_active != 0,
        slack_ooo_from: row.get("slack_ooo_from"),
        slack_ooo_until: row.get("slack_ooo_until"),
        slack_pending_until: row.get("slack_pending_until"),
        calendar_free_pct: row.get("calendar_free_pct"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn task_from_row(row: &sqlx::sqlite::SqliteRow) -> Task {
    let priority: String = row.get("priority");
    let status: String = row.get("status");
    let needs_rescoring: i32 = row.get("needs_rescoring");

    Task {
        id: row.get("id"),
        title: row.get("title"),
        project_name: row.get("project_name"),
        priority: Priority::from_str(&priority).unwrap_or(Priority::P2),
        deadline: row.get("deadline"),
        assignee_id: row.get("assignee_id"),
        status: TaskStatus::from_str(&status).unwrap_or(TaskStatus::Unassigned),
        needs_rescoring: needs_rescoring != 0,
        suggestions: Vec::new(),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
