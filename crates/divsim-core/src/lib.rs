#![deny(missing_docs)]
#![doc = "Core data model shared by the divsim sweep, index and aggregation crates."]

pub mod errors;
pub mod replication;
pub mod results;
pub mod rng;
pub mod scenario;
pub mod table;

pub use errors::{DivError, ErrorInfo};
pub use replication::{ReplicationKey, ReplicationMap};
pub use results::{IndexRecord, JobMeta, MergedResults, RecordLevel, ResultTable};
pub use rng::RngHandle;
pub use scenario::{group_id, parse_group_id, Scenario};
pub use table::{neighborhood_id, FrequencyTable};
