//! Realtime change feed - store notifications turned into full asset snapshots.

mod change_feed;
mod feed_model;
mod feed_traits;

pub use change_feed::ChangeFeed;
pub use feed_model::{ChangeKind, SubscriptionHandle, TableChange};
pub use feed_traits::{ChangeChannel, ChangeSource};
