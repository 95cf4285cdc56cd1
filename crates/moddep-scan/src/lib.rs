//! Reader and writer for scanner dependency reports (P1689 convention).
//!
//! A conforming scanner emits one report per translation unit:
//!
//! ```text
//! {
//!   "version": 0,
//!   "revision": 0,
//!   "rules": [{
//!     "work-directory": "/build",
//!     "primary-output": "lib/a.cxx.o",
//!     "provides": [{ "logical-name": "A", "compiled-module-path": "A.gcm" }],
//!     "requires": [{ "logical-name": "B" }],
//!     "depends":  ["/src/a.h"]
//!   }]
//! }
//! ```
//!
//! Parsing is strict: a report that cannot be fully understood is an error,
//! never a partial result. The older `future-compile` rule layout is also
//! accepted.

mod error;
mod p1689;

pub use error::{ParseError, ReportError};
pub use p1689::{parse, parse_file, render, write, FORMAT_REVISION, FORMAT_VERSION};
