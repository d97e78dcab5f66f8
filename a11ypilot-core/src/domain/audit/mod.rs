//! Audit domain: violations, scan results and remediation records
//!
//! Every type here is a value object produced by one pipeline stage and owned
//! by the caller afterwards. Nothing holds a back-reference to its producer.

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::*;
pub use traits::*;
pub use value_objects::*;
