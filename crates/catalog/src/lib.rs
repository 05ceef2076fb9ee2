//! In-process video catalog: search, pagination and lookup over a JSON feed.

pub mod error;
pub mod model;
pub mod search;

pub use error::{CatalogError, Result};
pub use model::{PaginationInfo, Thumbnail, Thumbnails, Video, VideosResponse};
pub use search::{Catalog, DEFAULT_PAGE_SIZE, MAX_PAGE_BUTTONS, page_window};
