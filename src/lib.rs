//! External-memory sort for very large files of fixed-width binary records,
//! either locally (single- or multi-threaded) or distributed over a
//! master/worker TCP protocol.
//!
//! Records have no interior structure: each is an opaque, fixed-width (100
//! bytes by default) byte string, and the sort order is unsigned
//! byte-lexicographic comparison of the whole record. This crate does not
//! parse fields, delimiters, or lines; records are compared and moved as
//! raw bytes throughout.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use record_file_sort::config::Config;
//! use record_file_sort::external_sort;
//!
//! fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     // set the directory for intermediate (run) files. The default is the
//!     // system temp dir, however, for large files it is recommended to
//!     // provide a dedicated directory, preferably on the same file system
//!     // as the output.
//!     let config = Config::new().with_tmp_dir(tmp);
//!
//!     external_sort::sort(&input, &output, &config)
//! }
//! ```
//!
//! For CPU parallelism and I/O overlap on a single machine, see
//! [`external_sort_mt::sort`]. For fanning the work out across worker
//! processes over the network, see [`coordinator::run`] and [`worker::run`].

pub(crate) mod chunk_iterator;
pub(crate) mod fd_limit;
pub(crate) mod heap_cursor;
pub(crate) mod merger;
pub(crate) mod net;
pub(crate) mod partition;
pub(crate) mod record;
pub(crate) mod run_producer;

pub mod config;
pub mod coordinator;
pub mod external_sort;
pub mod external_sort_mt;
pub mod worker;
