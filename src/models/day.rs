use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Day {
    pub id: String,
    pub trip_id: String,
    pub date: NaiveDate,
    pub day_number: i64,
}
