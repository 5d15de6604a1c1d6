use chrono::NaiveDate;

use crate::{
    error::ValidationError,
    models::{
        activity::{format_time_label, minute_range, Activity},
        trip::Trip,
    },
};

/// `[a_start, a_end)` and `[b_start, b_end)` share at least one point.
/// Touching ranges do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

pub trait Scheduled {
    type Point: PartialOrd + Copy;

    fn item_id(&self) -> &str;
    fn range(&self) -> Option<(Self::Point, Self::Point)>;
    fn conflict(&self) -> ValidationError;
}

pub fn find_conflict<'a, S: Scheduled>(
    candidate: (S::Point, S::Point),
    existing: &'a [S],
    exclude: Option<&str>,
) -> Option<&'a S> {
    existing
        .iter()
        .filter(|item| exclude != Some(item.item_id()))
        .find(|item| {
            item.range()
                .is_some_and(|(start, end)| overlaps(candidate.0, candidate.1, start, end))
        })
}

impl Scheduled for Trip {
    type Point = NaiveDate;

    fn item_id(&self) -> &str {
        &self.id
    }

    fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date, self.end_date))
    }

    fn conflict(&self) -> ValidationError {
        ValidationError::Overlap {
            title: self.title.clone(),
            range: self.date_range_label(),
        }
    }
}

impl Scheduled for Activity {
    type Point = i64;

    fn item_id(&self) -> &str {
        &self.id
    }

    fn range(&self) -> Option<(i64, i64)> {
        self.minute_range()
    }

    fn conflict(&self) -> ValidationError {
        let end = self
            .start_time
            .zip(self.duration_minutes)
            .and_then(|(start, minutes)| {
                chrono::Duration::try_minutes(minutes).map(|length| start + length)
            });
        ValidationError::Overlap {
            title: self.title.clone(),
            range: format!(
                "{}-{}",
                format_time_label(self.start_time),
                format_time_label(end.or(self.start_time))
            ),
        }
    }
}

pub fn check_trip_placement(
    start: NaiveDate,
    end: NaiveDate,
    siblings: &[Trip],
    exclude: Option<&str>,
) -> Result<(), ValidationError> {
    match find_conflict((start, end), siblings, exclude) {
        Some(trip) => Err(trip.conflict()),
        None => Ok(()),
    }
}

pub fn check_activity_placement(
    start: Option<chrono::NaiveTime>,
    duration: Option<i64>,
    same_day: &[Activity],
    exclude: Option<&str>,
) -> Result<(), ValidationError> {
    let Some(candidate) = minute_range(start, duration) else {
        return Ok(());
    };
    match find_conflict(candidate, same_day, exclude) {
        Some(activity) => Err(activity.conflict()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};

    use super::*;
    use crate::models::activity::ActivityCategory;

    fn trip(id: &str, title: &str, start: &str, end: &str) -> Trip {
        Trip {
            id: id.into(),
            owner_id: "owner".into(),
            title: title.into(),
            destination: "Anywhere".into(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            lodging_name: None,
            arrival_info: None,
            image_url: None,
            collection_id: Some("summer".into()),
            position: None,
            created_at: Utc::now(),
        }
    }

    fn activity(id: &str, title: &str, hour: u32, minute: u32, duration: i64) -> Activity {
        Activity {
            id: id.into(),
            day_id: "day".into(),
            title: title.into(),
            category: ActivityCategory::Culture,
            start_time: NaiveTime::from_hms_opt(hour, minute, 0),
            duration_minutes: Some(duration),
            notes: None,
        }
    }

    #[test]
    fn overlap_is_symmetric() {
        let ranges = [(0, 10), (5, 15), (10, 20), (20, 30), (0, 30), (3, 4)];
        for a in ranges {
            for b in ranges {
                assert_eq!(
                    overlaps(a.0, a.1, b.0, b.1),
                    overlaps(b.0, b.1, a.0, a.1),
                    "{a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn touching_ranges_do_not_overlap_and_identical_ones_do() {
        assert!(!overlaps(0, 10, 10, 20));
        assert!(!overlaps(10, 20, 0, 10));
        assert!(overlaps(0, 10, 0, 10));
    }

    #[test]
    fn activity_inside_existing_slot_is_rejected() {
        let day = vec![activity("a", "Colosseum", 9, 0, 60)];
        let err = check_activity_placement(NaiveTime::from_hms_opt(9, 30, 0), Some(30), &day, None)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Overlap {
                title: "Colosseum".into(),
                range: "09:00-10:00".into(),
            }
        );
    }

    #[test]
    fn activity_starting_when_another_ends_is_accepted() {
        let day = vec![activity("a", "Colosseum", 9, 0, 60)];
        check_activity_placement(NaiveTime::from_hms_opt(10, 0, 0), Some(30), &day, None).unwrap();
    }

    #[test]
    fn editing_an_activity_never_conflicts_with_itself() {
        let day = vec![
            activity("a", "Colosseum", 9, 0, 60),
            activity("b", "Lunch", 12, 0, 60),
        ];
        check_activity_placement(NaiveTime::from_hms_opt(9, 0, 0), Some(60), &day, Some("a"))
            .unwrap();
        assert!(
            check_activity_placement(NaiveTime::from_hms_opt(11, 30, 0), Some(60), &day, Some("a"))
                .is_err()
        );
    }

    #[test]
    fn huge_duration_saturates_instead_of_wrapping() {
        let day = vec![activity("a", "Dinner", 20, 0, 60)];
        let err = check_activity_placement(
            NaiveTime::from_hms_opt(9, 0, 0),
            Some(i64::MAX),
            &day,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Overlap { ref title, .. } if title == "Dinner"));
        check_activity_placement(NaiveTime::from_hms_opt(9, 0, 0), Some(i64::MAX), &[], None)
            .unwrap();
    }

    #[test]
    fn conflict_message_survives_a_stored_huge_duration() {
        let stored = activity("a", "Marathon", 9, 0, i64::MAX);
        assert!(matches!(
            stored.conflict(),
            ValidationError::Overlap { ref range, .. } if range == "09:00-09:00"
        ));
    }

    #[test]
    fn activities_without_start_time_never_conflict() {
        let mut untimed = activity("a", "Free time", 9, 0, 60);
        untimed.start_time = None;
        check_activity_placement(NaiveTime::from_hms_opt(9, 0, 0), Some(60), &[untimed], None)
            .unwrap();
        check_activity_placement(None, Some(60), &[activity("b", "Tour", 9, 0, 60)], None)
            .unwrap();
    }

    #[test]
    fn summer_collection_rejects_overlapping_trip() {
        let summer = vec![trip("x", "Trip X", "2025-06-01", "2025-06-05")];
        let err = check_trip_placement(
            "2025-06-04".parse().unwrap(),
            "2025-06-06".parse().unwrap(),
            &summer,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Overlap { ref title, .. } if title == "Trip X"));

        check_trip_placement(
            "2025-06-06".parse().unwrap(),
            "2025-06-08".parse().unwrap(),
            &summer,
            None,
        )
        .unwrap();
    }

    #[test]
    fn first_conflict_in_search_order_is_reported() {
        let trips = vec![
            trip("late", "Later", "2025-06-10", "2025-06-20"),
            trip("early", "Earlier", "2025-06-01", "2025-06-12"),
        ];
        let found = find_conflict(
            ("2025-06-11".parse().unwrap(), "2025-06-13".parse().unwrap()),
            &trips,
            None,
        )
        .unwrap();
        assert_eq!(found.id, "late");
    }
}
