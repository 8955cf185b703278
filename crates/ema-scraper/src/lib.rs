pub mod bridge;
pub mod collector;
pub mod controller;
mod dom;
pub mod error;
pub mod metrics;
pub mod page;
pub mod post;
pub mod profile;

pub use bridge::{Bridge, ChannelNotifier, Command, Notification, Notifier, Reply, Response};
pub use collector::{lock, CollectionState, PostCollector, SharedCollector};
pub use controller::{ControllerState, RefreshController};
pub use error::ScraperError;
pub use page::{
    MemoryPage, MutationBatch, MutationRecord, MutationStream, ObserveTarget, Page, PageSnapshot,
};
pub use post::{extract_post, Extracted, Skip};
pub use profile::extract_profile;
