//! # Snapshot
//!
//! Portable encoding of Helm release records.
//!
//! A snapshot is a text artifact holding a comma-separated list of encoded
//! releases. Each entry is the base64 form of a gzipped binary release record,
//! byte-compatible with snapshots written by earlier tooling; records stored
//! before compression was introduced (no gzip header) still decode.
//!
//! ## Example
//!
//! ```no_run
//! use snapshot::{Release, store};
//! use std::path::Path;
//!
//! let releases = vec![Release::new("ingress"), Release::new("api")];
//! store::save(Path::new("helm-releases.txt"), &releases)?;
//!
//! let loaded = store::load(Path::new("helm-releases.txt"))?;
//! assert_eq!(loaded, releases);
//! # Ok::<(), snapshot::Error>(())
//! ```

pub mod codec;
pub mod error;
pub mod release;
pub mod store;

pub use codec::{decode, encode};
pub use error::{Error, Result};
pub use release::{Chart, Config, Release, Status};
