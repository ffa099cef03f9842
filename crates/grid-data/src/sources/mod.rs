pub mod csv_fixture;
pub mod memory;

pub use csv_fixture::{load_csv_records, records_from_reader};
pub use memory::{Envelope, MatchRule, MemoryAdapter};
