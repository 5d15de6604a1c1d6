use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, ValidationError},
    models::{
        activity::Activity,
        collaborator::{CollaboratorEntry, TripCollaborator, TripInvite},
        collection::{CollectionForm, TripCollection},
        day::Day,
        friendship::{Friend, FriendRequest, Friendship, LinkStatus},
        trip::{Trip, TripDraft, TripRole, TripSummary},
        user::Profile,
    },
    planner::{
        confirm::DeleteTarget,
        dates::{scaffold_days, validate_trip_range},
        itinerary::{ActivityDraft, ItineraryStore},
        normalize_optional,
        overlap::{check_activity_placement, check_trip_placement},
        permissions::TripAccess,
        relations::{self, RemovalOutcome},
    },
};

const TRIP_COLUMNS: &str = "id, owner_id, title, destination, start_date, end_date, lodging_name, \
     arrival_info, image_url, collection_id, position, created_at";

/// Relational store for trips and everything hanging off them. Every
/// check-then-write runs inside one transaction.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // ---- trips -------------------------------------------------------

    pub async fn create_trip(
        &self,
        owner_uuid: &str,
        draft: &TripDraft,
        image_url: Option<String>,
    ) -> Result<(Trip, Vec<Day>), AppError> {
        validate_trip_range(draft.start_date, draft.end_date)?;
        let mut tx = self.pool.begin().await?;

        if let Some(collection_id) = draft.collection_id.as_deref() {
            let collection = fetch_collection(&mut tx, collection_id).await?;
            if collection.owner_id != owner_uuid {
                return Err(AppError::Forbidden);
            }
            let siblings = fetch_collection_trips(&mut tx, collection_id).await?;
            check_trip_placement(draft.start_date, draft.end_date, &siblings, None)?;
        }

        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_uuid.to_string(),
            title: draft.title.clone(),
            destination: draft.destination.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            lodging_name: draft.lodging_name.clone(),
            arrival_info: draft.arrival_info.clone(),
            image_url,
            collection_id: draft.collection_id.clone(),
            position: draft.position,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO trips (id, owner_id, title, destination, start_date, end_date,
                lodging_name, arrival_info, image_url, collection_id, position, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
        )
        .bind(&trip.id)
        .bind(&trip.owner_id)
        .bind(&trip.title)
        .bind(&trip.destination)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(&trip.lodging_name)
        .bind(&trip.arrival_info)
        .bind(&trip.image_url)
        .bind(&trip.collection_id)
        .bind(trip.position)
        .bind(trip.created_at)
        .execute(&mut *tx)
        .await?;

        let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);
        insert_days(&mut tx, &days).await?;

        tx.commit().await?;
        info!(trip = %trip.id, days = days.len(), "trip created");
        Ok((trip, days))
    }

    pub async fn trip(&self, trip_id: &str) -> Result<Trip, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_trip(&mut conn, trip_id).await
    }

    pub async fn trip_access(&self, trip: &Trip, user_uuid: &str) -> Result<TripAccess, AppError> {
        if trip.is_owned_by(user_uuid) {
            return Ok(TripAccess::Owner);
        }
        let membership = self.collaborator_for(&trip.id, user_uuid).await?;
        Ok(TripAccess::resolve(trip, user_uuid, membership.as_ref()))
    }

    pub async fn list_trips(&self, user_uuid: &str) -> Result<Vec<TripSummary>, AppError> {
        let sql = format!(
            r#"SELECT {TRIP_COLUMNS} FROM trips
               WHERE owner_id = ?1
                  OR id IN (SELECT trip_id FROM trip_collaborators
                            WHERE user_id = ?1 AND status = 'accepted')
               ORDER BY start_date ASC, created_at ASC"#
        );
        let trips: Vec<Trip> = sqlx::query_as(&sql)
            .bind(user_uuid)
            .fetch_all(&self.pool)
            .await?;

        Ok(trips
            .into_iter()
            .map(|trip| {
                let role = if trip.is_owned_by(user_uuid) {
                    TripRole::Owner
                } else {
                    TripRole::Shared
                };
                TripSummary { trip, role }
            })
            .collect())
    }

    /// Updates trip details. A changed date range rebuilds the days, which is
    /// only allowed while none of them holds an activity.
    pub async fn update_trip(
        &self,
        trip_id: &str,
        draft: &TripDraft,
        image_url: Option<String>,
    ) -> Result<Trip, AppError> {
        validate_trip_range(draft.start_date, draft.end_date)?;
        let mut tx = self.pool.begin().await?;
        let current = fetch_trip(&mut tx, trip_id).await?;

        if let Some(collection_id) = current.collection_id.as_deref() {
            let siblings = fetch_collection_trips(&mut tx, collection_id).await?;
            check_trip_placement(draft.start_date, draft.end_date, &siblings, Some(trip_id))?;
        }

        let dates_changed =
            current.start_date != draft.start_date || current.end_date != draft.end_date;
        if dates_changed {
            let activity_count: i64 = sqlx::query_scalar(
                r#"SELECT COUNT(*) FROM activities a JOIN days d ON d.id = a.day_id
                   WHERE d.trip_id = ?1"#,
            )
            .bind(trip_id)
            .fetch_one(&mut *tx)
            .await?;
            if activity_count > 0 {
                return Err(ValidationError::DatesLocked.into());
            }
            sqlx::query("DELETE FROM days WHERE trip_id = ?1")
                .bind(trip_id)
                .execute(&mut *tx)
                .await?;
            let days = scaffold_days(trip_id, draft.start_date, draft.end_date);
            insert_days(&mut tx, &days).await?;
            debug!(trip = %trip_id, days = days.len(), "days rebuilt after date change");
        }

        sqlx::query(
            r#"UPDATE trips SET title = ?1, destination = ?2, start_date = ?3, end_date = ?4,
                lodging_name = ?5, arrival_info = ?6, image_url = ?7, position = ?8
               WHERE id = ?9"#,
        )
        .bind(&draft.title)
        .bind(&draft.destination)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.lodging_name)
        .bind(&draft.arrival_info)
        .bind(&image_url)
        .bind(draft.position)
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;

        let updated = fetch_trip(&mut tx, trip_id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_trip(&self, trip_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?1")
            .bind(trip_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        info!(trip = %trip_id, "trip deleted");
        Ok(())
    }

    pub async fn set_trip_collection(
        &self,
        trip_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Trip, AppError> {
        let mut tx = self.pool.begin().await?;
        let trip = fetch_trip(&mut tx, trip_id).await?;
        if let Some(collection_id) = collection_id {
            let collection = fetch_collection(&mut tx, collection_id).await?;
            if collection.owner_id != trip.owner_id {
                return Err(AppError::Forbidden);
            }
            let siblings = fetch_collection_trips(&mut tx, collection_id).await?;
            check_trip_placement(trip.start_date, trip.end_date, &siblings, Some(trip_id))?;
        }
        sqlx::query("UPDATE trips SET collection_id = ?1 WHERE id = ?2")
            .bind(collection_id)
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        let moved = fetch_trip(&mut tx, trip_id).await?;
        tx.commit().await?;
        Ok(moved)
    }

    // ---- days & activities -------------------------------------------

    pub async fn days(&self, trip_id: &str) -> Result<Vec<Day>, AppError> {
        let days = sqlx::query_as(
            "SELECT id, trip_id, date, day_number FROM days WHERE trip_id = ?1 ORDER BY day_number ASC",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(days)
    }

    pub async fn day(&self, day_id: &str) -> Result<Day, AppError> {
        sqlx::query_as("SELECT id, trip_id, date, day_number FROM days WHERE id = ?1")
            .bind(day_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn day_activities(&self, day_id: &str) -> Result<Vec<Activity>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_day_activities(&mut conn, day_id).await
    }

    pub async fn trip_activities(&self, trip_id: &str) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as(
            r#"SELECT a.id, a.day_id, a.title, a.category, a.start_time, a.duration_minutes, a.notes
               FROM activities a JOIN days d ON d.id = a.day_id
               WHERE d.trip_id = ?1
               ORDER BY a.start_time ASC"#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    pub async fn activity(&self, activity_id: &str) -> Result<Activity, AppError> {
        sqlx::query_as(
            r#"SELECT id, day_id, title, category, start_time, duration_minutes, notes
               FROM activities WHERE id = ?1"#,
        )
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn activity_trip(&self, activity_id: &str) -> Result<Trip, AppError> {
        let trip_id: Option<String> = sqlx::query_scalar(
            "SELECT d.trip_id FROM activities a JOIN days d ON d.id = a.day_id WHERE a.id = ?1",
        )
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?;
        let trip_id = trip_id.ok_or(AppError::NotFound)?;
        self.trip(&trip_id).await
    }

    pub async fn add_activity(&self, day_id: &str, draft: &ActivityDraft) -> Result<Activity, AppError> {
        let mut tx = self.pool.begin().await?;
        let same_day = fetch_day_activities(&mut tx, day_id).await?;
        check_activity_placement(Some(draft.start_time), draft.duration_minutes, &same_day, None)?;

        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            day_id: day_id.to_string(),
            title: draft.title.clone(),
            category: draft.category,
            start_time: Some(draft.start_time),
            duration_minutes: draft.duration_minutes,
            notes: draft.notes.clone(),
        };
        sqlx::query(
            r#"INSERT INTO activities (id, day_id, title, category, start_time, duration_minutes, notes)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        )
        .bind(&activity.id)
        .bind(&activity.day_id)
        .bind(&activity.title)
        .bind(activity.category)
        .bind(activity.start_time)
        .bind(activity.duration_minutes)
        .bind(&activity.notes)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(activity)
    }

    pub async fn edit_activity(
        &self,
        activity_id: &str,
        draft: &ActivityDraft,
    ) -> Result<Activity, AppError> {
        let mut tx = self.pool.begin().await?;
        let day_id: Option<String> = sqlx::query_scalar("SELECT day_id FROM activities WHERE id = ?1")
            .bind(activity_id)
            .fetch_optional(&mut *tx)
            .await?;
        let day_id = day_id.ok_or(AppError::NotFound)?;
        let same_day = fetch_day_activities(&mut tx, &day_id).await?;
        check_activity_placement(
            Some(draft.start_time),
            draft.duration_minutes,
            &same_day,
            Some(activity_id),
        )?;

        sqlx::query(
            r#"UPDATE activities SET title = ?1, category = ?2, start_time = ?3,
                duration_minutes = ?4, notes = ?5
               WHERE id = ?6"#,
        )
        .bind(&draft.title)
        .bind(draft.category)
        .bind(draft.start_time)
        .bind(draft.duration_minutes)
        .bind(&draft.notes)
        .bind(activity_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Activity {
            id: activity_id.to_string(),
            day_id,
            title: draft.title.clone(),
            category: draft.category,
            start_time: Some(draft.start_time),
            duration_minutes: draft.duration_minutes,
            notes: draft.notes.clone(),
        })
    }

    pub async fn remove_activity(&self, activity_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = ?1")
            .bind(activity_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // ---- collections -------------------------------------------------

    pub async fn create_collection(
        &self,
        owner_uuid: &str,
        form: CollectionForm,
    ) -> Result<TripCollection, AppError> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        let collection = TripCollection {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_uuid.to_string(),
            title: title.to_string(),
            description: normalize_optional(form.description),
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO collections (id, owner_id, title, description, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&collection.id)
        .bind(&collection.owner_id)
        .bind(&collection.title)
        .bind(&collection.description)
        .bind(collection.created_at)
        .execute(&self.pool)
        .await?;
        Ok(collection)
    }

    pub async fn list_collections(&self, owner_uuid: &str) -> Result<Vec<TripCollection>, AppError> {
        let collections = sqlx::query_as(
            r#"SELECT id, owner_id, title, description, created_at FROM collections
               WHERE owner_id = ?1 ORDER BY created_at DESC"#,
        )
        .bind(owner_uuid)
        .fetch_all(&self.pool)
        .await?;
        Ok(collections)
    }

    pub async fn collection(&self, collection_id: &str) -> Result<TripCollection, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_collection(&mut conn, collection_id).await
    }

    pub async fn collection_trips(&self, collection_id: &str) -> Result<Vec<Trip>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_collection_trips(&mut conn, collection_id).await
    }

    pub async fn update_collection(
        &self,
        collection_id: &str,
        form: CollectionForm,
    ) -> Result<TripCollection, AppError> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        sqlx::query("UPDATE collections SET title = ?1, description = ?2 WHERE id = ?3")
            .bind(title)
            .bind(normalize_optional(form.description))
            .bind(collection_id)
            .execute(&self.pool)
            .await?;
        self.collection(collection_id).await
    }

    pub async fn delete_collection(&self, collection_id: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let detached = sqlx::query("UPDATE trips SET collection_id = NULL WHERE collection_id = ?1")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let result = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(collection_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        tx.commit().await?;
        info!(collection = %collection_id, detached, "collection deleted");
        Ok(detached)
    }

    // ---- users & friendships -----------------------------------------

    pub async fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as(
            "SELECT uuid, email, display_name FROM users WHERE lower(email) = lower(?1)",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn friendship(&self, friendship_id: &str) -> Result<Friendship, AppError> {
        sqlx::query_as(
            "SELECT id, sender_id, receiver_id, status, created_at FROM friendships WHERE id = ?1",
        )
        .bind(friendship_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn friendship_between(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError> {
        let friendship = sqlx::query_as(
            r#"SELECT id, sender_id, receiver_id, status, created_at FROM friendships
               WHERE (sender_id = ?1 AND receiver_id = ?2) OR (sender_id = ?2 AND receiver_id = ?1)"#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(friendship)
    }

    pub async fn send_friend_request(
        &self,
        sender_uuid: &str,
        receiver_email: &str,
    ) -> Result<Friendship, AppError> {
        if !receiver_email.contains('@') {
            return Err(AppError::BadRequest("invalid email".into()));
        }
        let receiver = self
            .profile_by_email(receiver_email)
            .await?
            .ok_or_else(|| AppError::BadRequest("user not found".into()))?;
        let existing = self.friendship_between(sender_uuid, &receiver.uuid).await?;
        relations::check_friend_request(sender_uuid, &receiver.uuid, existing.as_ref())?;

        let friendship = Friendship {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_uuid.to_string(),
            receiver_id: receiver.uuid,
            status: LinkStatus::Pending,
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"INSERT INTO friendships (id, sender_id, receiver_id, status, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(&friendship.id)
        .bind(&friendship.sender_id)
        .bind(&friendship.receiver_id)
        .bind(friendship.status)
        .bind(friendship.created_at)
        .execute(&self.pool)
        .await?;
        Ok(friendship)
    }

    pub async fn accept_friendship(
        &self,
        friendship_id: &str,
        actor_uuid: &str,
    ) -> Result<Friendship, AppError> {
        let mut friendship = self.friendship(friendship_id).await?;
        friendship.status = relations::accept_friendship(&friendship, actor_uuid)?;
        sqlx::query("UPDATE friendships SET status = ?1 WHERE id = ?2")
            .bind(friendship.status)
            .bind(friendship_id)
            .execute(&self.pool)
            .await?;
        Ok(friendship)
    }

    pub async fn remove_friendship(&self, friendship_id: &str, actor_uuid: &str) -> Result<(), AppError> {
        let friendship = self.friendship(friendship_id).await?;
        relations::check_friendship_removal(&friendship, actor_uuid)?;
        sqlx::query("DELETE FROM friendships WHERE id = ?1")
            .bind(friendship_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_friends(&self, user_uuid: &str) -> Result<Vec<Friend>, AppError> {
        let rows = sqlx::query(
            r#"SELECT f.id AS friendship_id, u.uuid, u.email, u.display_name
               FROM friendships f
               JOIN users u ON u.uuid = CASE WHEN f.sender_id = ?1 THEN f.receiver_id ELSE f.sender_id END
               WHERE f.status = 'accepted' AND (f.sender_id = ?1 OR f.receiver_id = ?1)
               ORDER BY u.email ASC"#,
        )
        .bind(user_uuid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| Friend {
                friendship_id: row.get("friendship_id"),
                profile: profile_from_row(row),
            })
            .collect())
    }

    pub async fn list_friend_requests(&self, user_uuid: &str) -> Result<Vec<FriendRequest>, AppError> {
        let rows = sqlx::query(
            r#"SELECT f.id AS friendship_id, f.created_at, u.uuid, u.email, u.display_name
               FROM friendships f JOIN users u ON u.uuid = f.sender_id
               WHERE f.receiver_id = ?1 AND f.status = 'pending'
               ORDER BY f.created_at ASC"#,
        )
        .bind(user_uuid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| FriendRequest {
                friendship_id: row.get("friendship_id"),
                sender: profile_from_row(row),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ---- collaborators -----------------------------------------------

    pub async fn collaborator(&self, collaborator_id: &str) -> Result<TripCollaborator, AppError> {
        sqlx::query_as(
            "SELECT id, trip_id, user_id, status, created_at FROM trip_collaborators WHERE id = ?1",
        )
        .bind(collaborator_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn collaborator_for(
        &self,
        trip_id: &str,
        user_uuid: &str,
    ) -> Result<Option<TripCollaborator>, AppError> {
        let row = sqlx::query_as(
            r#"SELECT id, trip_id, user_id, status, created_at FROM trip_collaborators
               WHERE trip_id = ?1 AND user_id = ?2"#,
        )
        .bind(trip_id)
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn invite_collaborator(
        &self,
        trip_id: &str,
        actor_uuid: &str,
        invitee_uuid: &str,
    ) -> Result<TripCollaborator, AppError> {
        let trip = self.trip(trip_id).await?;
        let are_friends = self
            .friendship_between(actor_uuid, invitee_uuid)
            .await?
            .is_some_and(|friendship| friendship.status == LinkStatus::Accepted);
        let existing = self.collaborator_for(trip_id, invitee_uuid).await?;
        relations::check_invite(
            &trip.owner_id,
            actor_uuid,
            invitee_uuid,
            are_friends,
            existing.as_ref(),
        )?;

        let collaborator = TripCollaborator {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            user_id: invitee_uuid.to_string(),
            status: LinkStatus::Pending,
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"INSERT INTO trip_collaborators (id, trip_id, user_id, status, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(&collaborator.id)
        .bind(&collaborator.trip_id)
        .bind(&collaborator.user_id)
        .bind(collaborator.status)
        .bind(collaborator.created_at)
        .execute(&self.pool)
        .await?;
        info!(trip = %trip_id, invitee = %invitee_uuid, "collaborator invited");
        Ok(collaborator)
    }

    pub async fn list_collaborators(&self, trip_id: &str) -> Result<Vec<CollaboratorEntry>, AppError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.status, u.uuid, u.email, u.display_name
               FROM trip_collaborators c JOIN users u ON u.uuid = c.user_id
               WHERE c.trip_id = ?1 ORDER BY c.created_at ASC"#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| CollaboratorEntry {
                id: row.get("id"),
                status: row.get("status"),
                user: profile_from_row(row),
            })
            .collect())
    }

    pub async fn available_friends(&self, trip_id: &str, user_uuid: &str) -> Result<Vec<Profile>, AppError> {
        let collaborators = self.list_collaborators(trip_id).await?;
        Ok(self
            .list_friends(user_uuid)
            .await?
            .into_iter()
            .map(|friend| friend.profile)
            .filter(|profile| !collaborators.iter().any(|c| c.user.uuid == profile.uuid))
            .collect())
    }

    pub async fn list_invites(&self, user_uuid: &str) -> Result<Vec<TripInvite>, AppError> {
        let rows = sqlx::query(
            r#"SELECT c.id AS collaborator_id, t.id AS trip_id, t.title, u.uuid, u.email, u.display_name
               FROM trip_collaborators c
               JOIN trips t ON t.id = c.trip_id
               JOIN users u ON u.uuid = t.owner_id
               WHERE c.user_id = ?1 AND c.status = 'pending'
               ORDER BY c.created_at ASC"#,
        )
        .bind(user_uuid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| TripInvite {
                collaborator_id: row.get("collaborator_id"),
                trip_id: row.get("trip_id"),
                trip_title: row.get("title"),
                owner: profile_from_row(row),
            })
            .collect())
    }

    pub async fn accept_invite(
        &self,
        collaborator_id: &str,
        actor_uuid: &str,
    ) -> Result<TripCollaborator, AppError> {
        let mut collaborator = self.collaborator(collaborator_id).await?;
        collaborator.status = relations::accept_invite(&collaborator, actor_uuid)?;
        sqlx::query("UPDATE trip_collaborators SET status = ?1 WHERE id = ?2")
            .bind(collaborator.status)
            .bind(collaborator_id)
            .execute(&self.pool)
            .await?;
        Ok(collaborator)
    }

    pub async fn remove_collaborator(
        &self,
        collaborator_id: &str,
        actor_uuid: &str,
    ) -> Result<RemovalOutcome, AppError> {
        let collaborator = self.collaborator(collaborator_id).await?;
        let trip = self.trip(&collaborator.trip_id).await?;
        let outcome = relations::resolve_removal(&trip.owner_id, &collaborator.user_id, actor_uuid)?;
        sqlx::query("DELETE FROM trip_collaborators WHERE id = ?1")
            .bind(collaborator_id)
            .execute(&self.pool)
            .await?;
        info!(trip = %trip.id, user = %collaborator.user_id, ?outcome, "collaborator removed");
        Ok(outcome)
    }

    // ---- confirmed deletions -----------------------------------------

    pub async fn delete_target(
        &self,
        actor_uuid: &str,
        target: &DeleteTarget,
    ) -> Result<Option<RemovalOutcome>, AppError> {
        match target {
            DeleteTarget::Trip(trip_id) => {
                let trip = self.trip(trip_id).await?;
                self.trip_access(&trip, actor_uuid).await?.require_manage()?;
                self.delete_trip(trip_id).await?;
                Ok(None)
            }
            DeleteTarget::Collection(collection_id) => {
                let collection = self.collection(collection_id).await?;
                if collection.owner_id != actor_uuid {
                    return Err(AppError::Forbidden);
                }
                self.delete_collection(collection_id).await?;
                Ok(None)
            }
            DeleteTarget::Activity(activity_id) => {
                let trip = self.activity_trip(activity_id).await?;
                self.trip_access(&trip, actor_uuid)
                    .await?
                    .require_edit_activities()?;
                self.remove_activity(activity_id).await?;
                Ok(None)
            }
            DeleteTarget::Friendship(friendship_id) => {
                self.remove_friendship(friendship_id, actor_uuid).await?;
                Ok(None)
            }
            DeleteTarget::Collaborator(collaborator_id) => self
                .remove_collaborator(collaborator_id, actor_uuid)
                .await
                .map(Some),
        }
    }
}

#[async_trait]
impl ItineraryStore for Store {
    async fn load_trip(&self, trip_id: &str) -> Result<Trip, AppError> {
        self.trip(trip_id).await
    }

    async fn load_days(&self, trip_id: &str) -> Result<Vec<Day>, AppError> {
        self.days(trip_id).await
    }

    async fn load_day_activities(&self, day_id: &str) -> Result<Vec<Activity>, AppError> {
        self.day_activities(day_id).await
    }

    async fn insert_activity(&self, day_id: &str, draft: &ActivityDraft) -> Result<Activity, AppError> {
        self.add_activity(day_id, draft).await
    }

    async fn update_activity(
        &self,
        activity_id: &str,
        draft: &ActivityDraft,
    ) -> Result<Activity, AppError> {
        self.edit_activity(activity_id, draft).await
    }

    async fn delete_activity(&self, activity_id: &str) -> Result<(), AppError> {
        self.remove_activity(activity_id).await
    }

    async fn load_collection_trips(&self, collection_id: &str) -> Result<Vec<Trip>, AppError> {
        self.collection_trips(collection_id).await
    }

    async fn assign_collection(
        &self,
        trip_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Trip, AppError> {
        self.set_trip_collection(trip_id, collection_id).await
    }
}

async fn fetch_trip(conn: &mut SqliteConnection, trip_id: &str) -> Result<Trip, AppError> {
    let sql = format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1");
    let trip = sqlx::query_as(&sql)
        .bind(trip_id)
        .fetch_optional(&mut *conn)
        .await?;
    trip.ok_or(AppError::NotFound)
}

async fn fetch_collection(
    conn: &mut SqliteConnection,
    collection_id: &str,
) -> Result<TripCollection, AppError> {
    sqlx::query_as("SELECT id, owner_id, title, description, created_at FROM collections WHERE id = ?1")
        .bind(collection_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn fetch_collection_trips(
    conn: &mut SqliteConnection,
    collection_id: &str,
) -> Result<Vec<Trip>, AppError> {
    let sql = format!(
        r#"SELECT {TRIP_COLUMNS} FROM trips WHERE collection_id = ?1
           ORDER BY position IS NULL, position ASC, start_date ASC"#
    );
    let trips = sqlx::query_as(&sql)
        .bind(collection_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(trips)
}

async fn fetch_day_activities(
    conn: &mut SqliteConnection,
    day_id: &str,
) -> Result<Vec<Activity>, AppError> {
    let activities = sqlx::query_as(
        r#"SELECT id, day_id, title, category, start_time, duration_minutes, notes
           FROM activities WHERE day_id = ?1 ORDER BY start_time ASC"#,
    )
    .bind(day_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(activities)
}

async fn insert_days(conn: &mut SqliteConnection, days: &[Day]) -> Result<(), AppError> {
    for day in days {
        sqlx::query("INSERT INTO days (id, trip_id, date, day_number) VALUES (?1, ?2, ?3, ?4)")
            .bind(&day.id)
            .bind(&day.trip_id)
            .bind(day.date)
            .bind(day.day_number)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn profile_from_row(row: &SqliteRow) -> Profile {
    Profile {
        uuid: row.get("uuid"),
        email: row.get("email"),
        display_name: row.get("display_name"),
    }
}
