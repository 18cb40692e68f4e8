/// Core functionality modules
///
/// The normalized recipe model, multi-source aggregation, the social
/// service, and the client-side session, favorites and feed state.

pub mod aggregator;
pub mod favorites;
pub mod feed;
pub mod recipe;
pub mod session;
pub mod social;

pub use aggregator::{dedup_by_id, Aggregator, SearchPage};
pub use favorites::{FavoritesView, Notice};
pub use feed::{Feed, LoadOutcome, FEED_PAGE_SIZE};
pub use recipe::{Amount, Ingredient, Instructions, Provenance, Recipe, Step};
pub use session::{AppContext, Session};
pub use social::SocialService;
