use embedded_storage_async::nor_flash::{NorFlash, NorFlashError, NorFlashErrorKind};

use super::{CapsuleError, UpdateInfo};

/// Largest flash write granularity a partial trailing chunk can be padded to.
const MAX_WRITE_SIZE: usize = 64;

impl UpdateInfo {
    /// Write `payload` as image `index` into its transport region on `flash`.
    ///
    /// The whole region is erased first, so nothing of a previous, longer image survives.
    pub async fn write_image<F: NorFlash>(
        &self,
        flash: &mut F,
        index: u8,
        payload: &[u8],
    ) -> Result<(), CapsuleError> {
        let region = self.region(index)?;

        if payload.len() > region.size as usize {
            return Err(CapsuleError::PayloadTooLarge {
                len: payload.len(),
                size: region.size,
            });
        }
        if region.offset as usize % F::ERASE_SIZE != 0
            || region.size as usize % F::ERASE_SIZE != 0
            || F::WRITE_SIZE > MAX_WRITE_SIZE
        {
            return Err(CapsuleError::Unaligned);
        }
        let end = region.offset + region.size;
        if end as usize > flash.capacity() {
            return Err(CapsuleError::Storage(NorFlashErrorKind::OutOfBounds));
        }

        log::info!(
            "updating {} ({} bytes) at {:#x}",
            region.name,
            payload.len(),
            region.offset
        );

        flash.erase(region.offset, end).await.map_err(storage)?;

        let aligned = payload.len() - payload.len() % F::WRITE_SIZE;
        let (body, tail) = payload.split_at(aligned);
        if !body.is_empty() {
            flash.write(region.offset, body).await.map_err(storage)?;
        }
        if !tail.is_empty() {
            // Pad with the erased value up to one write unit.
            let mut chunk = [0xff; MAX_WRITE_SIZE];
            chunk[..tail.len()].copy_from_slice(tail);
            flash
                .write(region.offset + aligned as u32, &chunk[..F::WRITE_SIZE])
                .await
                .map_err(storage)?;
        }

        Ok(())
    }
}

fn storage(e: impl NorFlashError) -> CapsuleError {
    CapsuleError::Storage(e.kind())
}
