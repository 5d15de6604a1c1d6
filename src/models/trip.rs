use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lodging_name: Option<String>,
    pub arrival_info: Option<String>,
    pub image_url: Option<String>,
    pub collection_id: Option<String>,
    pub position: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    pub fn is_owned_by(&self, user_uuid: &str) -> bool {
        self.owner_id == user_uuid
    }

    pub fn lodging_line(&self) -> Option<String> {
        match (self.lodging_name.as_deref(), self.arrival_info.as_deref()) {
            (Some(lodging), Some(arrival)) => Some(format!("Lodging: {lodging} | Arrival: {arrival}")),
            (Some(lodging), None) => Some(format!("Lodging: {lodging}")),
            (None, Some(arrival)) => Some(format!("Arrival: {arrival}")),
            (None, None) => None,
        }
    }

    pub fn date_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%d/%m/%Y"),
            self.end_date.format("%d/%m/%Y")
        )
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub destination: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub lodging_name: Option<String>,
    #[serde(default)]
    pub arrival_info: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDraft {
    pub title: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lodging_name: Option<String>,
    pub arrival_info: Option<String>,
    pub collection_id: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripRole {
    Owner,
    Shared,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    #[serde(flatten)]
    pub trip: Trip,
    pub role: TripRole,
}
