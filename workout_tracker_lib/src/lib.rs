pub mod input;
pub mod record;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tracker;
pub mod workout;
