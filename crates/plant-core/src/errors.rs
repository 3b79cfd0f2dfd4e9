//! Process-wide error registry
//!
//! Failures are recorded here instead of aborting the cycle. The status
//! indicator only shows the highest-priority outstanding kind, flashing the
//! kind's code.

use log::warn;

use crate::storage::StorageError;

/// Error kinds in ascending priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    DisplayInit = 1,
    LightSensorInit = 2,
    TempSensorInit = 3,
    MoistureSensorInit = 4,
    Json = 5,
    FileOperation = 6,
    SdInit = 7,
}

impl ErrorKind {
    pub const ALL: [Self; 7] = [
        Self::DisplayInit,
        Self::LightSensorInit,
        Self::TempSensorInit,
        Self::MoistureSensorInit,
        Self::Json,
        Self::FileOperation,
        Self::SdInit,
    ];

    /// Numeric code, also the number of indicator flashes
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::DisplayInit),
            2 => Some(Self::LightSensorInit),
            3 => Some(Self::TempSensorInit),
            4 => Some(Self::MoistureSensorInit),
            5 => Some(Self::Json),
            6 => Some(Self::FileOperation),
            7 => Some(Self::SdInit),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DisplayInit => "display init",
            Self::LightSensorInit => "light sensor init",
            Self::TempSensorInit => "temperature sensor init",
            Self::MoistureSensorInit => "moisture sensor init",
            Self::Json => "malformed document",
            Self::FileOperation => "file operation",
            Self::SdInit => "SD card init",
        }
    }

    const fn bit(self) -> u8 {
        1 << self.code()
    }
}

impl From<&StorageError> for ErrorKind {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::DocumentMissing(_) => Self::FileOperation,
            StorageError::ParseFailure(_) => Self::Json,
        }
    }
}

/// Set of outstanding error kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorRegistry {
    raised: u8,
}

impl ErrorRegistry {
    pub const fn new() -> Self {
        Self { raised: 0 }
    }

    /// Record `kind` as outstanding. Raising an outstanding kind is a no-op.
    pub fn raise(&mut self, kind: ErrorKind) {
        if !self.is_raised(kind) {
            warn!("Error raised: {}", kind.label());
            self.raised |= kind.bit();
        }
    }

    /// Record the kind matching a storage failure
    pub fn raise_storage(&mut self, err: &StorageError) {
        self.raise(ErrorKind::from(err));
    }

    pub fn clear(&mut self, kind: ErrorKind) {
        self.raised &= !kind.bit();
    }

    pub fn clear_all(&mut self) {
        self.raised = 0;
    }

    pub const fn is_raised(&self, kind: ErrorKind) -> bool {
        self.raised & kind.bit() != 0
    }

    /// Highest-priority outstanding kind, `None` when nothing is raised
    pub fn highest_priority(&self) -> Option<ErrorKind> {
        ErrorKind::ALL
            .iter()
            .rev()
            .copied()
            .find(|&kind| self.is_raised(kind))
    }

    /// Outstanding kinds in ascending priority
    pub fn outstanding(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        ErrorKind::ALL
            .iter()
            .copied()
            .filter(move |&kind| self.is_raised(kind))
    }

    pub const fn is_empty(&self) -> bool {
        self.raised == 0
    }
}
