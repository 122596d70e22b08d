//! Client configuration

/// Depot client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Gateway address (`host:port`)
    pub addr: String,
}

impl Config {
    /// Create a configuration for the gateway at `addr`
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("127.0.0.1:6201")
    }
}
