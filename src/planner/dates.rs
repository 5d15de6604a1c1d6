use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::ValidationError,
    models::{
        day::Day,
        trip::{TripDraft, TripForm},
    },
};

use super::normalize_optional;

pub const MAX_TRIP_SPAN_DAYS: i64 = 30;

pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

pub fn validate_trip_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    let span = span_days(start, end);
    if span < 0 {
        return Err(ValidationError::EndBeforeStart {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    if span > MAX_TRIP_SPAN_DAYS {
        return Err(ValidationError::TooLong {
            days: span,
            max: MAX_TRIP_SPAN_DAYS,
        });
    }
    Ok(())
}

pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// One `Day` per date of the range, numbered from 1. The range must already
/// be validated.
pub fn scaffold_days(trip_id: &str, start: NaiveDate, end: NaiveDate) -> Vec<Day> {
    dates_in_range(start, end)
        .zip(1..)
        .map(|(date, day_number)| Day {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            date,
            day_number,
        })
        .collect()
}

pub fn validate_trip_form(form: TripForm) -> Result<TripDraft, ValidationError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    let destination = form.destination.trim();
    if destination.is_empty() {
        return Err(ValidationError::MissingField("destination"));
    }
    let start_date = form
        .start_date
        .ok_or(ValidationError::MissingField("start_date"))?;
    let end_date = form.end_date.ok_or(ValidationError::MissingField("end_date"))?;
    validate_trip_range(start_date, end_date)?;

    Ok(TripDraft {
        title: title.to_string(),
        destination: destination.to_string(),
        start_date,
        end_date,
        lodging_name: normalize_optional(form.lodging_name),
        arrival_info: normalize_optional(form.arrival_info),
        collection_id: normalize_optional(form.collection_id),
        position: form.position,
    })
}
