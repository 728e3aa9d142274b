//! Offline aggregation of stored map files into index tables.
//!
//! [`reduce_stream`] walks a sweep's map file in fixed-size batches and
//! enforces replication boundaries; [`reduce_by_job`] groups externally
//! produced job files by their partition keys. Both produce the same record
//! schema as the in-memory sweep.

mod block;
mod io;
mod job;
mod stream;

pub use io::{
    write_maps, write_maps_path, write_results, write_results_path, MapReader, MapRow,
};
pub use job::{reduce_by_job, JobTable};
pub use stream::{reduce_stream, reduce_stream_path};
