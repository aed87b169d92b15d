//! Configuration access port trait.

use crate::domain::error::TurtleError;

/// Typed getters return `Ok(None)` for a missing or blank key and an
/// `InvalidConfiguration` error for a value that does not parse.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TurtleError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TurtleError>;
}
