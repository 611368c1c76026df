pub mod collection;
pub mod envelope;
pub mod error;
pub mod input;
pub mod record;
pub mod storage;
