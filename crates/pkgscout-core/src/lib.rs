// Core logic for pkgscout: search paging and the favorites list
pub mod config;
pub mod error;
pub mod favorites;
pub mod models;
pub mod notice;
pub mod pager;
pub mod providers;
pub mod search;

pub use config::Config;
pub use error::Error;
pub use favorites::{FavoriteOutcome, FavoritesStore, FAVORITES_KEY};
pub use models::{Favorite, Package};
pub use notice::{Notice, NoticeLevel};
pub use pager::{PageKind, PageRequest, SearchPager, MAX_PAGE, NO_RESULTS_MESSAGE, PAGE_SIZE};
pub use search::{SearchPage, SearchProvider};

/// Result type alias for the core crate
pub type Result<T> = std::result::Result<T, Error>;
