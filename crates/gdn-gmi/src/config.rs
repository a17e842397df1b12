use crate::ConfigError;

/// Default size of the line buffer before any growth.
pub const DEFAULT_INITIAL_BUFFER: usize = 4 * 1024;

/// Default upper bound for a single line, terminator included.
pub const DEFAULT_MAX_BUFFER: usize = 64 * 1024;

/// Line buffer sizing for a [`Scanner`](crate::Scanner).
///
/// The buffer starts at `initial` bytes and doubles as needed, never past
/// `max`. A line that does not fit in `max` bytes is rejected with
/// [`ScanError::TooLong`](crate::ScanError::TooLong).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    initial: usize,
    max: usize,
}

impl ScannerConfig {
    pub fn new(initial: usize, max: usize) -> Result<Self, ConfigError> {
        if initial == 0 || max == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if max < initial {
            return Err(ConfigError::MaxBelowInitial { initial, max });
        }
        Ok(Self { initial, max })
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Next buffer size when `current` bytes are full.
    pub(crate) fn grow(&self, current: usize) -> usize {
        if current == 0 {
            return self.initial;
        }
        current.saturating_mul(2).min(self.max)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BUFFER,
            max: DEFAULT_MAX_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_sizes() {
        let config = ScannerConfig::default();
        assert_eq!(config.initial(), 4096);
        assert_eq!(config.max(), 65536);
    }

    #[test]
    fn test_equal_sizes_allowed() {
        let config = ScannerConfig::new(32, 32).unwrap();
        assert_eq!(config.initial(), 32);
        assert_eq!(config.max(), 32);
    }

    #[test]
    fn test_zero_rejected() {
        assert_eq!(ScannerConfig::new(0, 10), Err(ConfigError::ZeroSize));
        assert_eq!(ScannerConfig::new(10, 0), Err(ConfigError::ZeroSize));
    }

    #[test]
    fn test_max_below_initial_rejected() {
        assert_eq!(
            ScannerConfig::new(64, 16),
            Err(ConfigError::MaxBelowInitial {
                initial: 64,
                max: 16
            })
        );
    }

    #[test]
    fn test_growth_doubles_and_caps() {
        let config = ScannerConfig::new(24, 100).unwrap();
        assert_eq!(config.grow(0), 24);
        assert_eq!(config.grow(24), 48);
        assert_eq!(config.grow(48), 96);
        assert_eq!(config.grow(96), 100);
        assert_eq!(config.grow(100), 100);
    }
}
