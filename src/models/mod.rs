mod record;

pub use record::{Record, UNKNOWN_APP};
