/// Device session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Register the built-in command table when the session is created.
    pub load_builtins: bool,
    /// Upper bound on bytes read by [`Device::dev_type`](crate::Device::dev_type)
    /// before giving up on finding the terminating NUL.
    pub max_dev_type_len: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            load_builtins: true,
            max_dev_type_len: 64,
        }
    }
}
