pub mod edges;
pub mod engagement;
pub mod feed;

pub use edges::EdgeService;
pub use engagement::EngagementService;
pub use feed::FeedService;
