/// Controls how strictly the registry treats collisions.
///
/// The firmware and host tables are kept in sync by convention, so the
/// default is permissive: a re-registered name silently replaces the old
/// descriptor and ids are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, registering an existing name returns `ProtoError::DuplicateName`.
    pub reject_duplicate_names: bool,
    /// When true, reusing another command's id returns `ProtoError::DuplicateId`.
    pub reject_duplicate_ids: bool,
    /// Maximum bytes accepted from one prototype list file.
    pub max_prototype_file_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reject_duplicate_names: false,
            reject_duplicate_ids: false,
            max_prototype_file_size: 256 * 1024,
        }
    }
}
