pub mod confirm;
pub mod dates;
pub mod itinerary;
pub mod overlap;
pub mod permissions;
pub mod relations;

pub fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
