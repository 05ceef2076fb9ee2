use serde::{Deserialize, Serialize};

/// One thumbnail rendition. `url` may be a remote URL or a local file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Thumbnail renditions keyed like the search-list feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available rendition.
    pub fn best(&self) -> Option<&Thumbnail> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

/// Flattened catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnails: Thumbnails,
    /// Known media length, when the feed carries one.
    pub duration_seconds: Option<f64>,
}

impl Video {
    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Page metadata returned with every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_videos: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: usize,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideosResponse {
    pub videos: Vec<Video>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFeed {
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItem {
    pub id: RawId,
    pub snippet: RawSnippet,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawId {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

impl From<RawItem> for Video {
    fn from(item: RawItem) -> Self {
        Self {
            id: item.id.video_id,
            title: item.snippet.title,
            description: item.snippet.description,
            channel_title: item.snippet.channel_title,
            published_at: item.snippet.published_at,
            thumbnails: item.snippet.thumbnails,
            duration_seconds: item
                .duration_seconds
                .filter(|seconds| seconds.is_finite() && *seconds > 0.0),
        }
    }
}
