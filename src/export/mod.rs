pub mod layout;
pub mod render;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use crate::{
    error::AppError,
    models::{
        activity::{format_time_label, Activity},
        day::Day,
        trip::Trip,
    },
};

use layout::{
    Cursor, Element, ExportDocument, TextStyle, COVER_HEIGHT, LINE_HEIGHT, MARGIN_X, PAGE_WIDTH,
    ROW_BASE_HEIGHT,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CoverImage {
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<CoverImage, AppError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

#[async_trait]
impl ImageLoader for NoImages {
    async fn load(&self, _url: &str) -> Result<CoverImage, AppError> {
        Err(AppError::NotFound)
    }
}

pub fn export_file_name(title: &str) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if joined.is_empty() { "itinerary".to_string() } else { joined };
    format!("{stem}.pdf")
}

pub async fn build_export(
    trip: &Trip,
    days: &[Day],
    activities: &[Activity],
    loader: &dyn ImageLoader,
) -> ExportDocument {
    let cover = match trip.image_url.as_deref() {
        Some(url) => match loader.load(url).await {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(trip = %trip.id, error = %err, "cover image unavailable for export");
                None
            }
        },
        None => None,
    };
    layout_document(trip, days, activities, cover.as_ref())
}

pub fn layout_document(
    trip: &Trip,
    days: &[Day],
    activities: &[Activity],
    cover: Option<&CoverImage>,
) -> ExportDocument {
    let mut cursor = Cursor::new();

    cursor.push(text(TextStyle::Title, 20.0, trip.title.clone()));
    cursor.push(text(
        TextStyle::Subtitle,
        28.0,
        format!("{} • {}", trip.destination, trip.date_range_label()),
    ));
    if let Some(lodging) = trip.lodging_line() {
        cursor.push(text(TextStyle::Subtitle, 34.0, lodging));
    }
    cursor.set_y(45.0);

    if let Some(image) = cover {
        cursor.push(Element::Image {
            x: MARGIN_X,
            y: cursor.y(),
            width: PAGE_WIDTH - 2.0 * MARGIN_X,
            height: COVER_HEIGHT,
            data_uri: image.data_uri(),
        });
        cursor.advance(COVER_HEIGHT + 10.0);
    }

    for day in days {
        cursor.ensure_room(LINE_HEIGHT + ROW_BASE_HEIGHT);
        let heading_y = cursor.y();
        cursor.push(text(
            TextStyle::DayHeading,
            heading_y,
            format!("Day {} - {}", day.day_number, day.date.format("%d/%m/%Y")),
        ));
        cursor.advance(LINE_HEIGHT);

        let rows = day_rows(day, activities);
        if rows.is_empty() {
            let y = cursor.y() + LINE_HEIGHT;
            cursor.push(text(TextStyle::Muted, y, "No activities".to_string()));
            cursor.advance(15.0);
        } else {
            for (time, lines) in rows {
                let height = ROW_BASE_HEIGHT + LINE_HEIGHT * (lines.len() as f32 - 1.0);
                cursor.ensure_room(height);
                let y = cursor.y();
                cursor.push(Element::Row {
                    y,
                    height,
                    time,
                    lines,
                });
                cursor.advance(height);
            }
            cursor.advance(15.0);
        }
    }

    ExportDocument {
        file_name: export_file_name(&trip.title),
        pages: cursor.finish(),
    }
}

fn day_rows(day: &Day, activities: &[Activity]) -> Vec<(String, Vec<String>)> {
    let mut own: Vec<&Activity> = activities
        .iter()
        .filter(|activity| activity.day_id == day.id)
        .collect();
    own.sort_by_key(|activity| activity.start_time);

    own.into_iter()
        .map(|activity| {
            let headline = match activity.duration_minutes {
                Some(minutes) => format!("{} ({} min)", activity.title, minutes),
                None => activity.title.clone(),
            };
            let mut lines = vec![headline];
            if let Some(notes) = activity.notes.as_deref() {
                lines.extend(
                    notes
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(str::to_string),
                );
            }
            (format_time_label(activity.start_time), lines)
        })
        .collect()
}

fn text(style: TextStyle, y: f32, text: String) -> Element {
    Element::Text {
        x: MARGIN_X,
        y,
        style,
        text,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};

    use super::*;
    use crate::{models::activity::ActivityCategory, planner::dates::scaffold_days};

    struct FixedImage;

    #[async_trait]
    impl ImageLoader for FixedImage {
        async fn load(&self, _url: &str) -> Result<CoverImage, AppError> {
            Ok(CoverImage {
                content_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            })
        }
    }

    fn trip(start: &str, end: &str) -> Trip {
        Trip {
            id: "rome".into(),
            owner_id: "alice".into(),
            title: "Rome  Trip".into(),
            destination: "Rome, Italy".into(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            lodging_name: Some("Hotel Forum".into()),
            arrival_info: Some("FCO".into()),
            image_url: Some("https://images.example/rome.jpg".into()),
            collection_id: None,
            position: None,
            created_at: Utc::now(),
        }
    }

    fn activity(id: &str, day: &Day, time: Option<(u32, u32)>, notes: Option<&str>) -> Activity {
        Activity {
            id: id.into(),
            day_id: day.id.clone(),
            title: format!("Activity {id}"),
            category: ActivityCategory::Culture,
            start_time: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            duration_minutes: Some(60),
            notes: notes.map(str::to_string),
        }
    }

    fn texts(doc: &ExportDocument) -> Vec<String> {
        doc.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn rows(doc: &ExportDocument) -> Vec<(String, Vec<String>)> {
        doc.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Row { time, lines, .. } => Some((time.clone(), lines.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn file_name_replaces_whitespace_runs() {
        assert_eq!(export_file_name("Rome  Trip\t2025"), "Rome_Trip_2025.pdf");
        assert_eq!(export_file_name("   "), "itinerary.pdf");
    }

    #[test]
    fn header_and_empty_days_are_laid_out() {
        let trip = trip("2025-06-01", "2025-06-02");
        let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);
        let doc = layout_document(&trip, &days, &[], None);

        let texts = texts(&doc);
        assert_eq!(texts[0], "Rome  Trip");
        assert_eq!(texts[1], "Rome, Italy • 01/06/2025 - 02/06/2025");
        assert_eq!(texts[2], "Lodging: Hotel Forum | Arrival: FCO");
        assert_eq!(texts[3], "Day 1 - 01/06/2025");
        assert_eq!(texts[4], "No activities");
        assert_eq!(texts[5], "Day 2 - 02/06/2025");
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].footer, "Page 1 of 1");
        assert_eq!(doc.file_name, "Rome_Trip.pdf");
    }

    #[test]
    fn activities_sort_by_time_with_untimed_first() {
        let trip = trip("2025-06-01", "2025-06-01");
        let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);
        let activities = vec![
            activity("late", &days[0], Some((15, 0)), None),
            activity("free", &days[0], None, Some("bring water\n\nand a hat")),
            activity("early", &days[0], Some((8, 30)), None),
        ];
        let doc = layout_document(&trip, &days, &activities, None);
        let rows = rows(&doc);
        let times: Vec<_> = rows.iter().map(|(time, _)| time.as_str()).collect();
        assert_eq!(times, ["--:--", "08:30", "15:00"]);
        assert_eq!(
            rows[0].1,
            ["Activity free (60 min)", "bring water", "and a hat"]
        );
    }

    #[test]
    fn long_trips_spill_onto_numbered_pages() {
        let trip = trip("2025-07-01", "2025-07-31");
        let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);
        let activities: Vec<_> = days
            .iter()
            .enumerate()
            .map(|(index, day)| activity(&index.to_string(), day, Some((9, 0)), None))
            .collect();
        let doc = layout_document(&trip, &days, &activities, None);

        assert!(doc.pages.len() > 1);
        let total = doc.pages.len();
        for (index, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.number, index + 1);
            assert_eq!(page.footer, format!("Page {} of {}", index + 1, total));
        }
        assert_eq!(rows(&doc).len(), 31);
    }

    #[test]
    fn no_page_is_left_empty() {
        for day_count in 1..=6u64 {
            for per_day in 0..=8u32 {
                let trip = trip("2025-08-01", "2025-08-01");
                let end = trip.start_date + chrono::Days::new(day_count - 1);
                let days = scaffold_days(&trip.id, trip.start_date, end);
                let activities: Vec<_> = days
                    .iter()
                    .flat_map(|day| {
                        (0..per_day).map(move |slot| {
                            let id = format!("{}-{slot}", day.day_number);
                            activity(&id, day, Some((8 + slot, 0)), None)
                        })
                    })
                    .collect();
                let doc = layout_document(&trip, &days, &activities, None);
                for page in &doc.pages {
                    assert!(
                        !page.elements.is_empty(),
                        "days={day_count} per_day={per_day}: {} is empty",
                        page.footer
                    );
                }
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let trip = trip("2025-06-01", "2025-06-05");
        let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);
        let activities = vec![activity("a", &days[2], Some((10, 0)), Some("tickets"))];
        let first = layout_document(&trip, &days, &activities, None);
        let second = layout_document(&trip, &days, &activities, None);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn cover_image_comes_from_loader() {
        let trip = trip("2025-06-01", "2025-06-01");
        let days = scaffold_days(&trip.id, trip.start_date, trip.end_date);

        let with_cover = build_export(&trip, &days, &[], &FixedImage).await;
        let image = with_cover.pages[0]
            .elements
            .iter()
            .find_map(|element| match element {
                Element::Image { data_uri, .. } => Some(data_uri.clone()),
                _ => None,
            });
        assert_eq!(image.as_deref(), Some("data:image/png;base64,AQID"));

        let without = build_export(&trip, &days, &[], &NoImages).await;
        assert!(without.pages[0]
            .elements
            .iter()
            .all(|element| !matches!(element, Element::Image { .. })));
    }
}
