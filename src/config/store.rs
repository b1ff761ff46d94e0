//! Persistent configuration store.
//!
//! Reads and writes the packed block through a [`ConfigStorage`] collaborator
//! (EEPROM, flash page, battery-backed RAM). Loading never fails: anything
//! that is not a current, well-formed block is replaced by compiled defaults.

use crate::error::{Result, StorageError};
use crate::fmt::{info, warning};

use super::layout::{self, BlockError, ConfigBlock, CONFIG_SIZE, CONFIG_VERSION_LEGACY};
use super::DeviceConfig;

/// Byte-addressed non-volatile storage.
///
/// A single `write_block` of [`CONFIG_SIZE`] bytes is assumed to be durable
/// as a whole; no partial-write recovery is attempted above this trait.
pub trait ConfigStorage {
    /// Read `buf.len()` bytes starting at `offset`.
    fn read_block(&mut self, offset: usize, buf: &mut [u8]) -> core::result::Result<(), StorageError>;

    /// Write `data` starting at `offset`.
    fn write_block(&mut self, offset: usize, data: &[u8]) -> core::result::Result<(), StorageError>;
}

impl<T: ConfigStorage + ?Sized> ConfigStorage for &mut T {
    fn read_block(&mut self, offset: usize, buf: &mut [u8]) -> core::result::Result<(), StorageError> {
        (**self).read_block(offset, buf)
    }

    fn write_block(&mut self, offset: usize, data: &[u8]) -> core::result::Result<(), StorageError> {
        (**self).write_block(offset, data)
    }
}

/// RAM-backed storage holding exactly one configuration block.
///
/// Starts erased (all `0xFF`), like a blank EEPROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStorage {
    bytes: ConfigBlock,
}

impl MemoryStorage {
    /// Erased storage.
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; CONFIG_SIZE],
        }
    }

    /// Storage pre-filled with a raw block.
    pub const fn from_bytes(bytes: ConfigBlock) -> Self {
        Self { bytes }
    }

    /// Raw contents.
    pub fn as_bytes(&self) -> &ConfigBlock {
        &self.bytes
    }

    /// Mutable raw contents (for corruption tests).
    pub fn as_bytes_mut(&mut self) -> &mut ConfigBlock {
        &mut self.bytes
    }

    fn range(offset: usize, len: usize) -> core::result::Result<core::ops::Range<usize>, StorageError> {
        match offset.checked_add(len) {
            Some(end) if end <= CONFIG_SIZE => Ok(offset..end),
            _ => Err(StorageError::OutOfBounds { offset, len }),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStorage for MemoryStorage {
    fn read_block(&mut self, offset: usize, buf: &mut [u8]) -> core::result::Result<(), StorageError> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_block(&mut self, offset: usize, data: &[u8]) -> core::result::Result<(), StorageError> {
        let range = Self::range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Decoded from a valid stored block.
    Stored,
    /// Stored block missing or invalid; compiled defaults in use.
    Defaults,
}

/// Result of [`ConfigStore::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Configuration to run with.
    pub config: DeviceConfig,
    /// Whether it came from storage or from defaults.
    pub source: ConfigSource,
}

impl Loaded {
    /// Whether the compiled defaults replaced the stored block.
    pub fn is_defaulted(&self) -> bool {
        self.source == ConfigSource::Defaults
    }
}

/// Configuration block at a fixed offset of a storage collaborator.
pub struct ConfigStore<S> {
    storage: S,
    base: usize,
}

impl<S: ConfigStorage> ConfigStore<S> {
    /// Store whose block starts at offset 0.
    pub fn new(storage: S) -> Self {
        Self::at_offset(storage, 0)
    }

    /// Store whose block starts at `base`.
    pub fn at_offset(storage: S, base: usize) -> Self {
        Self { storage, base }
    }

    /// Read the block, falling back to compiled defaults when it is invalid.
    pub fn load(&mut self) -> Loaded {
        let mut block = [0u8; CONFIG_SIZE];
        if self.storage.read_block(self.base, &mut block).is_err() {
            warning!("config read failed, using defaults");
            return Self::defaulted();
        }

        match layout::decode(&block) {
            Ok(config) => {
                info!("config loaded from storage");
                Loaded {
                    config,
                    source: ConfigSource::Stored,
                }
            }
            Err(BlockError::BadId(id)) => {
                warning!("config id {=u8:#x} invalid, using defaults", id);
                Self::defaulted()
            }
            Err(BlockError::BadVersion(CONFIG_VERSION_LEGACY)) => {
                warning!("config uses legacy schema 0xA1 without servo record, using defaults");
                Self::defaulted()
            }
            Err(BlockError::BadVersion(version)) => {
                warning!("config version {=u8:#x} unsupported, using defaults", version);
                Self::defaulted()
            }
            Err(BlockError::Field(_)) => {
                warning!("config block holds invalid fields, using defaults");
                Self::defaulted()
            }
        }
    }

    /// Write the full block in one storage operation.
    pub fn save(&mut self, config: &DeviceConfig) -> Result<()> {
        let block = layout::encode(config);
        self.storage.write_block(self.base, &block)?;
        info!("config saved");
        Ok(())
    }

    /// Overwrite the stored block with compiled defaults and return them.
    pub fn reset(&mut self) -> Result<DeviceConfig> {
        let config = DeviceConfig::defaults();
        self.save(&config)?;
        info!("config reset to defaults");
        Ok(config)
    }

    /// Borrow the storage collaborator.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the storage collaborator.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Release the storage collaborator.
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn defaulted() -> Loaded {
        Loaded {
            config: DeviceConfig::defaults(),
            source: ConfigSource::Defaults,
        }
    }
}
