//! Name-to-rail resolution.

use crate::error::ResourceError;
use crate::hardware::PowerResource;

/// Resolves rail handles by name.
///
/// Each successful resolution hands out an owned handle; the caller keeps it for as long
/// as it needs the rail.
pub trait ResourceRegistry {
    /// Look up the rail called `name`.
    fn resolve(&mut self, name: &str) -> Result<Box<dyn PowerResource>, ResourceError>;
}

impl<F> ResourceRegistry for F
where
    F: FnMut(&str) -> Result<Box<dyn PowerResource>, ResourceError>,
{
    fn resolve(&mut self, name: &str) -> Result<Box<dyn PowerResource>, ResourceError> {
        self(name)
    }
}
