use alloc::vec::Vec;

use embedded_sdmmc::{
    Directory, Mode, SdCard, SdCardError, TimeSource, VolumeIdx, VolumeManager,
};
use log::{debug, error};

use super::{DocumentStore, StorageError};

const MAX_DIRS: usize = 4;
const MAX_FILES: usize = 4;
const MAX_VOLUMES: usize = 1;

/// Bytes pulled from the card per read call
const READ_CHUNK: usize = 512;

type CardError = embedded_sdmmc::Error<SdCardError>;
type CardDirectory<'a, S, D, T> = Directory<'a, SdCard<S, D>, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>;

/// Split "/plant1/light.txt" into its directory and file name.
///
/// Documents are either at the volume root or one directory deep.
fn split_path(path: &str) -> (Option<&str>, &str) {
    let relative = path.trim_start_matches('/');
    match relative.split_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, relative),
    }
}

/// Document store on the first FAT volume of an SPI SD card.
///
/// These operations are blocking, like everything else sharing the SPI bus.
/// Every call opens the volume and the document's directory, does its work and
/// closes them again, so no handle outlives a single operation.
pub struct SdCardStore<S, D, T>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
    T: TimeSource,
{
    volume_mgr: VolumeManager<SdCard<S, D>, T, MAX_DIRS, MAX_FILES, MAX_VOLUMES>,
}

impl<S, D, T> SdCardStore<S, D, T>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
    T: TimeSource,
{
    /// Create a new SD card document store
    pub fn new(sd_card: SdCard<S, D>, ts: T) -> Self {
        let volume_mgr = VolumeManager::new(sd_card, ts);

        Self { volume_mgr }
    }

    /// Run `op` against the directory holding `path`
    fn in_directory<R>(
        &self,
        path: &str,
        op: impl FnOnce(&CardDirectory<'_, S, D, T>, &str) -> Result<R, CardError>,
    ) -> Result<R, CardError> {
        let volume0 = self.volume_mgr.open_volume(VolumeIdx(0))?;
        let root_dir = volume0.open_root_dir()?;

        let result = match split_path(path) {
            (Some(dir_name), file_name) => {
                let dir = root_dir.open_dir(dir_name)?;
                let result = op(&dir, file_name);
                dir.close()?;
                result
            }
            (None, file_name) => op(&root_dir, file_name),
        };

        root_dir.close()?;
        volume0.close()?;

        result
    }

    fn read_file(dir: &CardDirectory<'_, S, D, T>, file_name: &str) -> Result<Vec<u8>, CardError> {
        let file = dir.open_file_in_dir(file_name, Mode::ReadOnly)?;

        let mut contents = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let bytes_read = file.read(&mut chunk)?;
            if bytes_read == 0 {
                break; // EOF
            }
            contents.extend_from_slice(&chunk[..bytes_read]);
        }

        file.close()?;
        Ok(contents)
    }

    fn write_file(
        dir: &CardDirectory<'_, S, D, T>,
        file_name: &str,
        contents: &[u8],
    ) -> Result<(), CardError> {
        let file = dir.open_file_in_dir(file_name, Mode::ReadWriteCreateOrTruncate)?;
        file.write(contents)?;
        file.close()?;
        Ok(())
    }
}

impl<S, D, T> DocumentStore for SdCardStore<S, D, T>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
    T: TimeSource,
{
    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.in_directory(path, Self::read_file).map_err(|e| {
            error!("Failed to read {} from SD: {:?}", path, e);
            StorageError::missing(path)
        })
    }

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        self.in_directory(path, |dir, file_name| {
            Self::write_file(dir, file_name, contents)
        })
        .map_err(|e| {
            error!("Failed to write {} to SD: {:?}", path, e);
            StorageError::missing(path)
        })?;
        debug!("Wrote {} bytes to {}", contents.len(), path);
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        self.in_directory(path, |dir, file_name| dir.delete_file_in_dir(file_name))
            .map_err(|e| {
                error!("Failed to remove {} from SD: {:?}", path, e);
                StorageError::missing(path)
            })
    }

    fn exists(&mut self, path: &str) -> bool {
        self.in_directory(path, |dir, file_name| {
            dir.open_file_in_dir(file_name, Mode::ReadOnly)?.close()
        })
        .is_ok()
    }
}
