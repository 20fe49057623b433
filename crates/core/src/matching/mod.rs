//! FIFO matching - pairs sold units with the oldest available purchased
//! stock per item type and attributes purchase stock to platforms.

mod fifo_matcher;
mod matching_model;
mod platform_allocator;

pub use fifo_matcher::FifoMatcher;
pub use matching_model::{
    DayProfit, ItemTypeFilter, MatchEvent, MatchLog, MatchedDays, PlatformFilter, PlatformSplit,
    PurchaseChunk, UnmatchedRemainder,
};
pub use platform_allocator::{PlatformAllocator, PurchaseAllocation};
