use articast::models::{Track, TrackId};

/// Raw media URL with a delivery version but no transform segment, as the
/// CMS stores it.
pub const RAW_MEDIA_URL: &str =
    "https://res.cloudinary.com/demo/video/upload/v42/articles/ep1.m4a";

pub struct TrackBuilder {
    id: String,
    title: String,
    media_url: String,
    duration_secs: Option<f64>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self {
            id: "article-1".to_string(),
            title: "Test article".to_string(),
            media_url: RAW_MEDIA_URL.to_string(),
            duration_secs: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_media_url(mut self, url: &str) -> Self {
        self.media_url = url.to_string();
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_secs = Some(seconds);
        self
    }

    pub fn build(self) -> Track {
        Track {
            id: TrackId::new(self.id),
            title: self.title,
            category: None,
            thumbnail_url: None,
            media_url: self.media_url,
            duration_secs: self.duration_secs,
        }
    }
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self::new()
    }
}
