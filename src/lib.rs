//! # snmp-table
//!
//! SNMP table retrieval and reconstruction.
//!
//! Turns a declarative table description (a base OID, optional suboid
//! infixes and a list of columns) into a rectangular table of decoded
//! values, by walking each column through a pluggable [`Backend`] and
//! correlating rows across columns by their end-OID.
//!
//! ## Features
//!
//! - Tolerates broken agents: repeated OIDs, unsorted walks and columns
//!   with missing rows still produce a rectangular table
//! - Index columns derived from row OIDs (`OID_END`, `OID_STRING`, ...)
//! - Per-section SNMPv3 context lists, walked and concatenated in order
//! - Optional on-disk walk cache for slowly changing columns
//! - Configurable source charset for string columns
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmp_table::{Column, HostConfig, IndexKind, StoredWalkBackend, TableDescriptor, TableFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<snmp_table::Error>> {
//!     let backend = StoredWalkBackend::open(HostConfig::new("router1"), "router1.walk").await?;
//!     let fetcher = TableFetcher::new(backend);
//!
//!     // ifDescr, ifType and the interface index
//!     let if_table = TableDescriptor::new(
//!         ".1.3.6.1.2.1.2.2.1",
//!         [Column::oid("2"), Column::oid("3"), Column::index(IndexKind::End)],
//!     );
//!
//!     for row in fetcher.fetch_table(Some("interfaces"), &if_table).await? {
//!         println!("{} {} {}", row[2], row[0], row[1]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Walk Cache
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snmp_table::{CacheMode, Column, FileWalkCache, HostConfig, StoredWalkBackend, TableDescriptor, TableFetcher};
//!
//! # async fn example() -> snmp_table::Result<()> {
//! let backend = StoredWalkBackend::open(HostConfig::new("switch01"), "switch01.walk").await?;
//! let fetcher = TableFetcher::builder(backend)
//!     .walk_cache(Arc::new(FileWalkCache::new("/var/cache/snmp")))
//!     .cache_mode(CacheMode::Reuse)
//!     .build();
//!
//! // ifDescr rarely changes; serve it from the cache when possible
//! let descriptor = TableDescriptor::new(".1.3.6.1.2.1.2.2.1", [Column::oid("2").cached()]);
//! let table = fetcher.fetch_table(Some("interfaces"), &descriptor).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod column;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod oid;
pub mod row;
pub mod table;
pub mod value;

pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod index;
pub(crate) mod reconcile;

// Re-exports for convenience
pub use backend::{Backend, StoredWalkBackend};
pub use cache::{CacheMode, FileWalkCache, WalkCache};
pub use column::{Column, IndexKind, ValueEncoding};
pub use config::{ContextRule, HostConfig};
pub use descriptor::TableDescriptor;
pub use error::{CacheError, ConfigErrorKind, Error, Result};
pub use oid::{EndOid, Oid};
pub use row::Row;
pub use table::{Table, TableFetcher, TableFetcherBuilder};
pub use value::Value;
