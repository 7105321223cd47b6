//! Command implementations.

pub mod catalog;
pub mod extract;
pub mod scan;

pub use self::catalog::execute_catalog;
pub use self::extract::execute_extract;
pub use self::scan::execute_scan;
