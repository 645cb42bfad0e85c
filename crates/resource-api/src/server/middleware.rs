//! Tunables for the middleware layers the router attaches.

use std::time::Duration;

/// Per-request timeout applied to all routes.
///
/// The CDR non-functional requirements expect resource calls to answer
/// within low single-digit seconds; everything here is in-memory, so a
/// request hitting this limit indicates a fault rather than load.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
