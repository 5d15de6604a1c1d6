use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ActivityCategory {
    Culture,
    Food,
    Transport,
    Hotel,
    #[default]
    Leisure,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 5] = [
        ActivityCategory::Culture,
        ActivityCategory::Food,
        ActivityCategory::Transport,
        ActivityCategory::Hotel,
        ActivityCategory::Leisure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Culture => "culture",
            ActivityCategory::Food => "food",
            ActivityCategory::Transport => "transport",
            ActivityCategory::Hotel => "hotel",
            ActivityCategory::Leisure => "leisure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityCategory::Culture => "Culture",
            ActivityCategory::Food => "Food",
            ActivityCategory::Transport => "Flight",
            ActivityCategory::Hotel => "Hotel/Apartment",
            ActivityCategory::Leisure => "Leisure",
        }
    }

    pub fn from_loose(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(ActivityCategory::Leisure)
    }
}

impl FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown activity category: {s}"))
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: String,
    pub day_id: String,
    pub title: String,
    pub category: ActivityCategory,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

impl Activity {
    pub fn minute_range(&self) -> Option<(i64, i64)> {
        minute_range(self.start_time, self.duration_minutes)
    }

    pub fn start_label(&self) -> String {
        format_time_label(self.start_time)
    }
}

pub const MAX_ACTIVITY_MINUTES: i64 = 24 * 60;

pub fn minute_range(start: Option<NaiveTime>, duration: Option<i64>) -> Option<(i64, i64)> {
    let start = start?;
    let from = i64::from(start.hour()) * 60 + i64::from(start.minute());
    Some((from, from.saturating_add(duration.unwrap_or(0))))
}

pub fn format_time_label(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityForm {
    pub category: Option<ActivityCategory>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "time_of_day::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ActivityForm {
    pub fn for_category(category: ActivityCategory) -> Self {
        Self {
            category: Some(category),
            title: category.label().to_string(),
            start_time: None,
            duration_minutes: Some(60),
            notes: None,
        }
    }

    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            category: Some(activity.category),
            title: activity.title.clone(),
            start_time: activity.start_time,
            duration_minutes: activity.duration_minutes.or(Some(60)),
            notes: activity.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransportDetails {
    pub kind: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub number: String,
}

impl TransportDetails {
    pub fn into_form(self) -> ActivityForm {
        let kind = match self.kind.trim() {
            "" => "Transport".to_string(),
            other => other.to_string(),
        };
        let title = match (self.from.trim(), self.to.trim()) {
            ("", "") => kind,
            (from, "") => format!("{kind}: {from}"),
            ("", to) => format!("{kind}: -> {to}"),
            (from, to) => format!("{kind}: {from} -> {to}"),
        };
        let number = self.number.trim();
        ActivityForm {
            category: Some(ActivityCategory::Transport),
            title,
            start_time: None,
            duration_minutes: Some(60),
            notes: (!number.is_empty()).then(|| format!("Ref: {number}")),
        }
    }
}

pub mod time_of_day {
    use super::*;

    pub fn parse(raw: &str) -> Result<Option<NaiveTime>, chrono::ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(Some)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(value) => parse(&value).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
