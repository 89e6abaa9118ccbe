pub mod catalog;
pub mod enrichment;
pub mod feed;
pub mod scorer;

pub use catalog::Catalog;
pub use feed::{build_feed, build_recommendation_feed, FeedRequest};
pub use scorer::{score_title, AffinityMap, TitleScore};
