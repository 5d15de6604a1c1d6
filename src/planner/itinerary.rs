use async_trait::async_trait;
use chrono::NaiveTime;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{AppError, ValidationError},
    models::{
        activity::{Activity, ActivityCategory, ActivityForm, MAX_ACTIVITY_MINUTES},
        day::Day,
        trip::Trip,
    },
};

use super::{
    confirm::{DeleteTarget, PendingDeletion},
    normalize_optional,
    overlap::{check_activity_placement, check_trip_placement},
    permissions::TripAccess,
};

/// Reads and writes the itinerary needs. Every call is a fresh round trip;
/// nothing is cached between calls.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn load_trip(&self, trip_id: &str) -> Result<Trip, AppError>;
    async fn load_days(&self, trip_id: &str) -> Result<Vec<Day>, AppError>;
    async fn load_day_activities(&self, day_id: &str) -> Result<Vec<Activity>, AppError>;
    async fn insert_activity(&self, day_id: &str, draft: &ActivityDraft)
        -> Result<Activity, AppError>;
    async fn update_activity(
        &self,
        activity_id: &str,
        draft: &ActivityDraft,
    ) -> Result<Activity, AppError>;
    async fn delete_activity(&self, activity_id: &str) -> Result<(), AppError>;
    async fn load_collection_trips(&self, collection_id: &str) -> Result<Vec<Trip>, AppError>;
    async fn assign_collection(
        &self,
        trip_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Trip, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub category: ActivityCategory,
    pub title: String,
    pub start_time: NaiveTime,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

pub fn validate_activity_form(form: ActivityForm) -> Result<ActivityDraft, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    let start_time = form
        .start_time
        .ok_or(ValidationError::MissingField("start_time"))?;
    if form.duration_minutes.is_some_and(|minutes| minutes < 0) {
        return Err(ValidationError::NegativeDuration);
    }
    if form
        .duration_minutes
        .is_some_and(|minutes| minutes > MAX_ACTIVITY_MINUTES)
    {
        return Err(ValidationError::DurationTooLong {
            max: MAX_ACTIVITY_MINUTES,
        });
    }
    Ok(ActivityDraft {
        category: form.category.unwrap_or(ActivityCategory::Leisure),
        title: title.to_string(),
        start_time,
        duration_minutes: form.duration_minutes,
        notes: normalize_optional(form.notes),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    trip: Trip,
    access: TripAccess,
    days: Vec<Day>,
    selected_day: Option<String>,
    activities: Vec<Activity>,
    #[serde(skip)]
    pending_delete: PendingDeletion,
}

impl Itinerary {
    pub async fn open(
        store: &dyn ItineraryStore,
        trip_id: &str,
        access: TripAccess,
    ) -> Result<Self, AppError> {
        access.require_view()?;
        let trip = store.load_trip(trip_id).await?;
        let days = store.load_days(trip_id).await?;
        let mut itinerary = Self {
            trip,
            access,
            days,
            selected_day: None,
            activities: Vec::new(),
            pending_delete: PendingDeletion::default(),
        };
        if let Some(first) = itinerary.days.first().map(|day| day.id.clone()) {
            itinerary.select_day(store, &first).await?;
        }
        Ok(itinerary)
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn selected_day(&self) -> Option<&Day> {
        let id = self.selected_day.as_deref()?;
        self.days.iter().find(|day| day.id == id)
    }

    pub async fn select_day(
        &mut self,
        store: &dyn ItineraryStore,
        day_id: &str,
    ) -> Result<&[Activity], AppError> {
        if !self.days.iter().any(|day| day.id == day_id) {
            return Err(AppError::NotFound);
        }
        self.activities = store.load_day_activities(day_id).await?;
        self.selected_day = Some(day_id.to_string());
        debug!(trip = %self.trip.id, day = %day_id, count = self.activities.len(), "day selected");
        Ok(&self.activities)
    }

    pub async fn create_activity(
        &mut self,
        store: &dyn ItineraryStore,
        day_id: &str,
        form: ActivityForm,
    ) -> Result<Activity, AppError> {
        self.access.require_edit_activities()?;
        if self.selected_day.as_deref() != Some(day_id) {
            self.select_day(store, day_id).await?;
        }
        let draft = validate_activity_form(form)?;
        check_activity_placement(
            Some(draft.start_time),
            draft.duration_minutes,
            &self.activities,
            None,
        )?;
        let created = store.insert_activity(day_id, &draft).await?;
        self.select_day(store, day_id).await?;
        Ok(created)
    }

    pub async fn update_activity(
        &mut self,
        store: &dyn ItineraryStore,
        activity_id: &str,
        form: ActivityForm,
    ) -> Result<Activity, AppError> {
        self.access.require_edit_activities()?;
        let day_id = self
            .activities
            .iter()
            .find(|activity| activity.id == activity_id)
            .map(|activity| activity.day_id.clone())
            .ok_or(AppError::NotFound)?;
        let draft = validate_activity_form(form)?;
        check_activity_placement(
            Some(draft.start_time),
            draft.duration_minutes,
            &self.activities,
            Some(activity_id),
        )?;
        let updated = store.update_activity(activity_id, &draft).await?;
        self.select_day(store, &day_id).await?;
        Ok(updated)
    }

    pub fn request_delete(&mut self, activity_id: &str) -> Result<&DeleteTarget, AppError> {
        self.access.require_edit_activities()?;
        if !self.activities.iter().any(|activity| activity.id == activity_id) {
            return Err(AppError::NotFound);
        }
        self.pending_delete
            .request(DeleteTarget::Activity(activity_id.to_string()));
        self.pending_delete.pending().ok_or(AppError::NotFound)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete.cancel();
    }

    pub async fn confirm_delete(
        &mut self,
        store: &dyn ItineraryStore,
    ) -> Result<Option<String>, AppError> {
        let Some(DeleteTarget::Activity(activity_id)) = self.pending_delete.confirm() else {
            return Ok(None);
        };
        store.delete_activity(&activity_id).await?;
        if let Some(day_id) = self.selected_day.clone() {
            self.select_day(store, &day_id).await?;
        }
        Ok(Some(activity_id))
    }

    pub async fn move_trip_into_collection(
        &mut self,
        store: &dyn ItineraryStore,
        trip_id: &str,
        collection_id: &str,
    ) -> Result<Trip, AppError> {
        self.access.require_manage()?;
        let trip = if trip_id == self.trip.id {
            self.trip.clone()
        } else {
            store.load_trip(trip_id).await?
        };
        let siblings = store.load_collection_trips(collection_id).await?;
        check_trip_placement(trip.start_date, trip.end_date, &siblings, Some(trip_id))?;
        let moved = store.assign_collection(trip_id, Some(collection_id)).await?;
        if moved.id == self.trip.id {
            self.trip = moved.clone();
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::{models::activity::time_of_day, planner::dates::scaffold_days};

    #[derive(Default)]
    struct MemoryStore {
        trips: Mutex<Vec<Trip>>,
        days: Mutex<Vec<Day>>,
        activities: Mutex<Vec<Activity>>,
        reads: Mutex<usize>,
    }

    impl MemoryStore {
        fn with_trip(trip: Trip) -> Self {
            let store = Self::default();
            let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);
            store.days.lock().unwrap().extend(days);
            store.trips.lock().unwrap().push(trip);
            store
        }

        fn reads(&self) -> usize {
            *self.reads.lock().unwrap()
        }
    }

    fn draft_to_activity(id: String, day_id: &str, draft: &ActivityDraft) -> Activity {
        Activity {
            id,
            day_id: day_id.to_string(),
            title: draft.title.clone(),
            category: draft.category,
            start_time: Some(draft.start_time),
            duration_minutes: draft.duration_minutes,
            notes: draft.notes.clone(),
        }
    }

    #[async_trait]
    impl ItineraryStore for MemoryStore {
        async fn load_trip(&self, trip_id: &str) -> Result<Trip, AppError> {
            self.trips
                .lock()
                .unwrap()
                .iter()
                .find(|trip| trip.id == trip_id)
                .cloned()
                .ok_or(AppError::NotFound)
        }

        async fn load_days(&self, trip_id: &str) -> Result<Vec<Day>, AppError> {
            Ok(self
                .days
                .lock()
                .unwrap()
                .iter()
                .filter(|day| day.trip_id == trip_id)
                .cloned()
                .collect())
        }

        async fn load_day_activities(&self, day_id: &str) -> Result<Vec<Activity>, AppError> {
            *self.reads.lock().unwrap() += 1;
            Ok(self
                .activities
                .lock()
                .unwrap()
                .iter()
                .filter(|activity| activity.day_id == day_id)
                .cloned()
                .collect())
        }

        async fn insert_activity(
            &self,
            day_id: &str,
            draft: &ActivityDraft,
        ) -> Result<Activity, AppError> {
            let mut activities = self.activities.lock().unwrap();
            let activity = draft_to_activity(format!("a{}", activities.len() + 1), day_id, draft);
            activities.push(activity.clone());
            Ok(activity)
        }

        async fn update_activity(
            &self,
            activity_id: &str,
            draft: &ActivityDraft,
        ) -> Result<Activity, AppError> {
            let mut activities = self.activities.lock().unwrap();
            let slot = activities
                .iter_mut()
                .find(|activity| activity.id == activity_id)
                .ok_or(AppError::NotFound)?;
            *slot = draft_to_activity(slot.id.clone(), &slot.day_id.clone(), draft);
            Ok(slot.clone())
        }

        async fn delete_activity(&self, activity_id: &str) -> Result<(), AppError> {
            self.activities
                .lock()
                .unwrap()
                .retain(|activity| activity.id != activity_id);
            Ok(())
        }

        async fn load_collection_trips(&self, collection_id: &str) -> Result<Vec<Trip>, AppError> {
            Ok(self
                .trips
                .lock()
                .unwrap()
                .iter()
                .filter(|trip| trip.collection_id.as_deref() == Some(collection_id))
                .cloned()
                .collect())
        }

        async fn assign_collection(
            &self,
            trip_id: &str,
            collection_id: Option<&str>,
        ) -> Result<Trip, AppError> {
            let mut trips = self.trips.lock().unwrap();
            let trip = trips
                .iter_mut()
                .find(|trip| trip.id == trip_id)
                .ok_or(AppError::NotFound)?;
            trip.collection_id = collection_id.map(str::to_string);
            Ok(trip.clone())
        }
    }

    fn trip(id: &str, start: &str, end: &str) -> Trip {
        Trip {
            id: id.into(),
            owner_id: "alice".into(),
            title: format!("Trip {id}"),
            destination: "Rome".into(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            lodging_name: None,
            arrival_info: None,
            image_url: None,
            collection_id: None,
            position: None,
            created_at: Utc::now(),
        }
    }

    fn form(title: &str, start: &str, minutes: i64) -> ActivityForm {
        ActivityForm {
            category: Some(ActivityCategory::Culture),
            title: title.into(),
            start_time: time_of_day::parse(start).unwrap(),
            duration_minutes: Some(minutes),
            notes: None,
        }
    }

    #[test]
    fn duration_is_capped_at_one_day() {
        validate_activity_form(form("Day hike", "08:00", MAX_ACTIVITY_MINUTES)).unwrap();
        assert_eq!(
            validate_activity_form(form("Day hike", "08:00", MAX_ACTIVITY_MINUTES + 1)),
            Err(ValidationError::DurationTooLong {
                max: MAX_ACTIVITY_MINUTES
            })
        );
        assert_eq!(
            validate_activity_form(form("Day hike", "08:00", i64::MAX)),
            Err(ValidationError::DurationTooLong {
                max: MAX_ACTIVITY_MINUTES
            })
        );
    }

    #[tokio::test]
    async fn open_selects_first_day() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-03"));
        let itinerary = Itinerary::open(&store, "rome", TripAccess::Owner).await.unwrap();
        assert_eq!(itinerary.days().len(), 3);
        assert_eq!(itinerary.selected_day().unwrap().day_number, 1);
    }

    #[tokio::test]
    async fn every_day_switch_reads_again() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-03"));
        let mut itinerary = Itinerary::open(&store, "rome", TripAccess::Owner).await.unwrap();
        let first = itinerary.days()[0].id.clone();
        let second = itinerary.days()[1].id.clone();
        itinerary.select_day(&store, &second).await.unwrap();
        itinerary.select_day(&store, &first).await.unwrap();
        assert_eq!(store.reads(), 3);
    }

    #[tokio::test]
    async fn overlapping_activity_is_rejected_before_writing() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-03"));
        let mut itinerary = Itinerary::open(&store, "rome", TripAccess::Owner).await.unwrap();
        let day = itinerary.days()[0].id.clone();

        itinerary
            .create_activity(&store, &day, form("A", "09:00", 60))
            .await
            .unwrap();
        let err = itinerary
            .create_activity(&store, &day, form("B", "09:30", 30))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::Overlap { ref title, .. }) if title == "A"
        ));
        itinerary
            .create_activity(&store, &day, form("C", "10:00", 30))
            .await
            .unwrap();

        assert_eq!(itinerary.activities().len(), 2);
        assert_eq!(store.activities.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_start_time_is_a_validation_error() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-01"));
        let mut itinerary = Itinerary::open(&store, "rome", TripAccess::Owner).await.unwrap();
        let day = itinerary.days()[0].id.clone();
        let mut no_time = form("Museum", "09:00", 60);
        no_time.start_time = None;
        let err = itinerary.create_activity(&store, &day, no_time).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingField("start_time"))
        ));
    }

    #[tokio::test]
    async fn editing_keeps_own_slot() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-01"));
        let mut itinerary = Itinerary::open(&store, "rome", TripAccess::Collaborator)
            .await
            .unwrap();
        let day = itinerary.days()[0].id.clone();
        let created = itinerary
            .create_activity(&store, &day, form("A", "09:00", 60))
            .await
            .unwrap();
        let updated = itinerary
            .update_activity(&store, &created.id, form("A renamed", "09:00", 60))
            .await
            .unwrap();
        assert_eq!(updated.title, "A renamed");
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-01"));
        let mut itinerary = Itinerary::open(&store, "rome", TripAccess::Owner).await.unwrap();
        let day = itinerary.days()[0].id.clone();
        let created = itinerary
            .create_activity(&store, &day, form("A", "09:00", 60))
            .await
            .unwrap();

        itinerary.request_delete(&created.id).unwrap();
        itinerary.cancel_delete();
        assert_eq!(itinerary.confirm_delete(&store).await.unwrap(), None);
        assert_eq!(itinerary.activities().len(), 1);

        itinerary.request_delete(&created.id).unwrap();
        let deleted = itinerary.confirm_delete(&store).await.unwrap();
        assert_eq!(deleted, Some(created.id));
        assert!(itinerary.activities().is_empty());
    }

    #[tokio::test]
    async fn pending_invitee_cannot_open() {
        let store = MemoryStore::with_trip(trip("rome", "2025-06-01", "2025-06-01"));
        let err = Itinerary::open(&store, "rome", TripAccess::Invited).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn moving_into_collection_checks_siblings() {
        let store = MemoryStore::with_trip(trip("y", "2025-06-04", "2025-06-06"));
        let mut x = trip("x", "2025-06-01", "2025-06-05");
        x.collection_id = Some("summer".into());
        store.trips.lock().unwrap().push(x);
        store.trips.lock().unwrap().push(trip("z", "2025-06-06", "2025-06-08"));

        let mut itinerary = Itinerary::open(&store, "y", TripAccess::Owner).await.unwrap();
        let err = itinerary
            .move_trip_into_collection(&store, "y", "summer")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::Overlap { .. })));
        assert_eq!(itinerary.trip().collection_id, None);

        let moved = itinerary
            .move_trip_into_collection(&store, "z", "summer")
            .await
            .unwrap();
        assert_eq!(moved.collection_id.as_deref(), Some("summer"));
    }

    #[tokio::test]
    async fn collaborators_cannot_move_trips() {
        let store = MemoryStore::with_trip(trip("y", "2025-06-04", "2025-06-06"));
        let mut itinerary = Itinerary::open(&store, "y", TripAccess::Collaborator)
            .await
            .unwrap();
        let err = itinerary
            .move_trip_into_collection(&store, "y", "summer")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
