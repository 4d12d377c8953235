mod decorate;
mod freshness;
mod listing;
mod observer;
pub mod pool;
mod reconcile;
mod scanner;

#[cfg(test)]
mod test_support;

pub use decorate::UrlDecorator;
pub use freshness::{Staleness, staleness};
pub use listing::{ListingEntry, compare_entries, sort_listing, to_stored_record};
pub use observer::{LogObserver, Observer, ScanEvent, StoreOp};
pub use reconcile::{ObservedEntry, Reconciler, join_relative};
pub use scanner::{DirectoryScanner, ScanError, normalize_relative};
