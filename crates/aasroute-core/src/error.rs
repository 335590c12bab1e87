//! Routing error types.

use thiserror::Error;

/// Programmer errors detected at the routing API boundary.
///
/// "No route" is not an error: queries return `None` for it. These
/// variants describe caller bugs, which the query paths treat as fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RouteError {
    /// An area id outside `[1, num_areas)`.
    #[error("area {area} is out of range [1, {num_areas})")]
    AreaOutOfRange {
        /// The rejected area id.
        area: usize,
        /// Number of areas in the world (including the dummy area 0).
        num_areas: usize,
    },
    /// An area's cluster field references a portal that does not exist.
    #[error("area {area} references unknown portal {portal}")]
    UnknownPortal {
        /// The area whose settings are inconsistent.
        area: usize,
        /// The referenced portal number.
        portal: usize,
    },
}
