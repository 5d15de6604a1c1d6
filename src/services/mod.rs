pub mod deep_link;
pub mod geocoding;
pub mod images;
pub mod store;
pub mod suggestions;
