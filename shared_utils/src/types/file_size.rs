//! FileSize Type-Safe Wrapper
//!
//! Byte counts with saturating arithmetic and threshold checks.

use serde::Serialize;
use std::fmt;

/// Upload limit for regular Discord accounts.
pub const DISCORD_SIZE_LIMIT: FileSize = FileSize::from_mb(10);

/// Size in bytes.
///
/// # Examples
/// ```
/// use shared_utils::types::file_size::FileSize;
///
/// let size = FileSize::new(1024 * 1024);
/// assert_eq!(size.display(), "1.00 MB");
///
/// let limit = FileSize::from_mb(10);
/// assert!(!size.exceeds(limit));
/// assert_eq!(limit.saturating_sub(size).bytes(), 9 * 1024 * 1024);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileSize(u64);

impl FileSize {
    pub const ZERO: FileSize = FileSize(0);

    pub const KB: u64 = 1024;
    pub const MB: u64 = 1024 * 1024;
    pub const GB: u64 = 1024 * 1024 * 1024;

    #[inline]
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn from_kb(kb: u64) -> Self {
        Self(kb * Self::KB)
    }

    #[inline]
    pub const fn from_mb(mb: u64) -> Self {
        Self(mb * Self::MB)
    }

    #[inline]
    pub const fn bytes(&self) -> u64 {
        self.0
    }

    /// Size in MiB, as the status log reports it.
    pub fn as_mb(&self) -> f64 {
        self.0 as f64 / Self::MB as f64
    }

    #[inline]
    pub fn saturating_sub(&self, other: FileSize) -> FileSize {
        FileSize(self.0.saturating_sub(other.0))
    }

    /// Strictly larger than `limit`; a file of exactly `limit` bytes fits.
    #[inline]
    pub fn exceeds(&self, limit: FileSize) -> bool {
        self.0 > limit.0
    }

    pub fn display(&self) -> String {
        if self.0 >= Self::GB {
            format!("{:.2} GB", self.0 as f64 / Self::GB as f64)
        } else if self.0 >= Self::MB {
            format!("{:.2} MB", self.0 as f64 / Self::MB as f64)
        } else if self.0 >= Self::KB {
            format!("{:.2} KB", self.0 as f64 / Self::KB as f64)
        } else {
            format!("{} B", self.0)
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileSize({} = {})", self.0, self.display())
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Default for FileSize {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for FileSize {
    fn from(bytes: u64) -> Self {
        Self::new(bytes)
    }
}

impl From<FileSize> for u64 {
    fn from(size: FileSize) -> Self {
        size.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_creation() {
        assert_eq!(FileSize::new(1024).bytes(), 1024);
        assert_eq!(FileSize::from_kb(1).bytes(), 1024);
        assert_eq!(FileSize::from_mb(1).bytes(), 1024 * 1024);
    }

    #[test]
    fn test_discord_limit_is_ten_mib() {
        assert_eq!(DISCORD_SIZE_LIMIT.bytes(), 10_485_760);
    }

    #[test]
    fn test_exceeds_boundary() {
        let limit = DISCORD_SIZE_LIMIT;
        assert!(!FileSize::new(limit.bytes() - 1).exceeds(limit));
        assert!(!FileSize::new(limit.bytes()).exceeds(limit));
        assert!(FileSize::new(limit.bytes() + 1).exceeds(limit));
    }

    #[test]
    fn test_as_mb() {
        assert!((FileSize::new(5 * 1024 * 1024 + 512 * 1024).as_mb() - 5.5).abs() < 1e-9);
        assert_eq!(format!("{:.2}", FileSize::new(10_380_902).as_mb()), "9.90");
    }

    #[test]
    fn test_saturating_sub() {
        let a = FileSize::new(100);
        let b = FileSize::new(30);
        assert_eq!(a.saturating_sub(b).bytes(), 70);
        assert_eq!(b.saturating_sub(a).bytes(), 0);
        assert_eq!(a.saturating_sub(a).bytes(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(FileSize::new(500).display(), "500 B");
        assert_eq!(FileSize::new(1024).display(), "1.00 KB");
        assert_eq!(FileSize::new(1024 * 1024).display(), "1.00 MB");
        assert_eq!(FileSize::new(1024 * 1024 * 1024).display(), "1.00 GB");
    }

    #[test]
    fn test_serializes_as_bytes() {
        assert_eq!(serde_json::to_string(&FileSize::new(42)).unwrap(), "42");
    }
}
