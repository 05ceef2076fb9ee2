use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::model::{PaginationInfo, RawFeed, Video, VideosResponse};

/// Page size used when a caller passes `0`.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Most page buttons the pagination control shows at once.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Searchable list of videos loaded from a search-list JSON feed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    videos: Vec<Video>,
}

impl Catalog {
    /// Loads a feed shaped like `{ "items": [{ "id": { "videoId" }, "snippet": {..} }] }`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&contents).map_err(|error| match error {
            CatalogError::Parse { source, .. } => CatalogError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })?;
        info!(path = ?path, videos = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let feed: RawFeed = serde_json::from_str(json)?;
        Ok(Self::from_videos(
            feed.items.into_iter().map(Video::from).collect(),
        ))
    }

    pub fn from_videos(videos: Vec<Video>) -> Self {
        Self { videos }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    /// Returns one page of videos whose title or description contains
    /// `query`, ignoring case. Pages are 1-based; `page` 0 reads as 1 and
    /// `limit` 0 as [`DEFAULT_PAGE_SIZE`]. A page past the end is empty.
    pub fn search(&self, query: &str, page: usize, limit: usize) -> VideosResponse {
        let page = page.max(1);
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        let needle = query.to_lowercase();

        let matching: Vec<&Video> = self
            .videos
            .iter()
            .filter(|video| video.matches(&needle))
            .collect();
        let total_videos = matching.len();
        let total_pages = total_videos.div_ceil(limit);

        let videos = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();
        debug!(query, page, limit, total_videos, "catalog search");

        VideosResponse {
            videos,
            pagination: PaginationInfo {
                current_page: page,
                total_pages,
                total_videos,
                has_next_page: page < total_pages,
                has_prev_page: page > 1,
                limit,
            },
        }
    }

    pub fn find(&self, video_id: &str) -> Option<&Video> {
        self.videos.iter().find(|video| video.id == video_id)
    }

    /// Known durations, for seeding the player backend.
    pub fn durations(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.videos.iter().filter_map(|video| {
            video
                .duration_seconds
                .map(|seconds| (video.id.as_str(), seconds))
        })
    }
}

/// Page numbers shown by the pagination control.
///
/// At most [`MAX_PAGE_BUTTONS`] pages, centered on `current` except near
/// either edge.
pub fn page_window(current: usize, total: usize) -> Vec<usize> {
    if total <= MAX_PAGE_BUTTONS {
        return (1..=total).collect();
    }
    let half = MAX_PAGE_BUTTONS / 2;
    let first = if current <= half + 1 {
        1
    } else if current + half >= total {
        total + 1 - MAX_PAGE_BUTTONS
    } else {
        current - half
    };
    (first..first + MAX_PAGE_BUTTONS).collect()
}

#[cfg(test)]
mod tests {
    use super::page_window;

    #[test]
    fn small_totals_show_every_page() {
        assert_eq!(page_window(1, 0), Vec::<usize>::new());
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
        assert_eq!(page_window(5, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_sticks_to_the_start() {
        assert_eq!(page_window(1, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 12), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn window_centers_on_current_page() {
        assert_eq!(page_window(4, 12), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_window(9, 12), vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn window_sticks_to_the_end() {
        assert_eq!(page_window(10, 12), vec![8, 9, 10, 11, 12]);
        assert_eq!(page_window(12, 12), vec![8, 9, 10, 11, 12]);
    }
}
