//! Firmware images that may be replaced through update capsules.
//!
//! Image index N is written to the Nth alternate of the transport string. Nothing else links the
//! two, so the registry must list indices 1, 2, ... in order, without gaps, and the transport must
//! have an alternate for each. [`UpdateInfo::validate`] checks exactly that.

use core::fmt;

use embedded_storage_async::nor_flash::NorFlashErrorKind;
use serde::{Deserialize, Serialize};

pub mod dfu;
mod update;

pub use dfu::{DfuAlt, DfuTransport, TransportError};

/// EFI GUID in its in-memory (mixed endian) layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Guid([u8; 16]);

impl Guid {
    pub const fn from_fields(time_low: u32, time_mid: u16, time_hi: u16, rest: [u8; 8]) -> Self {
        let a = time_low.to_le_bytes();
        let b = time_mid.to_le_bytes();
        let c = time_hi.to_le_bytes();
        Self([
            a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], rest[0], rest[1], rest[2], rest[3],
            rest[4], rest[5], rest[6], rest[7],
        ])
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-",
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            u16::from_le_bytes([b[4], b[5]]),
            u16::from_le_bytes([b[6], b[7]]),
            b[8],
            b[9]
        )?;
        for byte in &b[10..] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

pub const SANDBOX_UBOOT_IMAGE_GUID: Guid = Guid::from_fields(
    0x09d7cf52,
    0x0720,
    0x4710,
    [0x91, 0xd1, 0x08, 0x46, 0x9b, 0x7f, 0xe9, 0xc8],
);

pub const SANDBOX_UBOOT_ENV_IMAGE_GUID: Guid = Guid::from_fields(
    0x5a7021f5,
    0xfef2,
    0x48b4,
    [0xaa, 0xba, 0x83, 0x2e, 0x77, 0x74, 0x18, 0xc0],
);

pub const SANDBOX_FIT_IMAGE_GUID: Guid = Guid::from_fields(
    0x3673b45d,
    0x6a7c,
    0x46f3,
    [0x9e, 0x60, 0xad, 0xab, 0xb0, 0x3f, 0x79, 0x37],
);

/// One updatable firmware artifact.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct FwImage {
    pub image_type_id: Guid,
    pub fw_name: &'static str,
    /// 1-based position in the registry and in the transport string.
    pub image_index: u8,
}

impl FwImage {
    /// Name as the UTF-16 string the firmware management protocol reports.
    pub fn name_utf16(&self) -> core::str::EncodeUtf16<'static> {
        self.fw_name.encode_utf16()
    }
}

/// How updates are packaged for this board.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CapsuleLayout {
    /// Separate raw images for the bootloader and its environment.
    Raw,
    /// A single FIT image.
    Fit,
}

pub const RAW_IMAGES: [FwImage; 2] = [
    FwImage {
        image_type_id: SANDBOX_UBOOT_IMAGE_GUID,
        fw_name: "SANDBOX-UBOOT",
        image_index: 1,
    },
    FwImage {
        image_type_id: SANDBOX_UBOOT_ENV_IMAGE_GUID,
        fw_name: "SANDBOX-UBOOT-ENV",
        image_index: 2,
    },
];

pub const FIT_IMAGES: [FwImage; 1] = [FwImage {
    image_type_id: SANDBOX_FIT_IMAGE_GUID,
    fw_name: "SANDBOX-FIT",
    image_index: 1,
}];

/// Routes images onto the emulated SPI flash.
pub const SANDBOX_DFU_STRING: &str =
    "sf 0:0=u-boot-bin raw 0x100000 0x50000;u-boot-env raw 0x150000 0x200000";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CapsuleError {
    /// No image with this index.
    UnknownImage(u8),
    DuplicateIndex(u8),
    /// Index out of sequence; the registry must read 1, 2, 3, ...
    SparseIndex(u8),
    TooManyImages,
    /// The transport has fewer alternates than there are images.
    TransportMismatch { images: usize, alternates: usize },
    Transport(TransportError),
    PayloadTooLarge { len: usize, size: u32 },
    /// Region does not line up with the flash erase or write granularity.
    Unaligned,
    Storage(NorFlashErrorKind),
}

impl fmt::Display for CapsuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapsuleError::UnknownImage(i) => write!(f, "no image with index {}", i),
            CapsuleError::DuplicateIndex(i) => write!(f, "image index {} listed twice", i),
            CapsuleError::SparseIndex(i) => write!(f, "image index {} out of sequence", i),
            CapsuleError::TooManyImages => f.write_str("too many images"),
            CapsuleError::TransportMismatch { images, alternates } => write!(
                f,
                "{} images but only {} transport alternates",
                images, alternates
            ),
            CapsuleError::Transport(e) => write!(f, "transport: {}", e),
            CapsuleError::PayloadTooLarge { len, size } => {
                write!(f, "payload of {} bytes exceeds region of {} bytes", len, size)
            }
            CapsuleError::Unaligned => f.write_str("region not aligned to flash geometry"),
            CapsuleError::Storage(kind) => write!(f, "storage: {:?}", kind),
        }
    }
}

impl From<TransportError> for CapsuleError {
    fn from(e: TransportError) -> Self {
        CapsuleError::Transport(e)
    }
}

/// Update registry consumed by the capsule processor.
#[derive(Clone, Copy, Debug)]
pub struct UpdateInfo {
    dfu_string: &'static str,
    images: &'static [FwImage],
}

impl UpdateInfo {
    pub const fn new(dfu_string: &'static str, images: &'static [FwImage]) -> Self {
        Self { dfu_string, images }
    }

    pub const fn sandbox(layout: CapsuleLayout) -> Self {
        match layout {
            CapsuleLayout::Raw => Self::new(SANDBOX_DFU_STRING, &RAW_IMAGES),
            CapsuleLayout::Fit => Self::new(SANDBOX_DFU_STRING, &FIT_IMAGES),
        }
    }

    pub fn dfu_string(&self) -> &'static str {
        self.dfu_string
    }

    pub fn images(&self) -> &'static [FwImage] {
        self.images
    }

    pub fn num_image_type_guids(&self) -> u8 {
        u8::try_from(self.images.len()).unwrap_or(u8::MAX)
    }

    pub fn image(&self, index: u8) -> Option<&'static FwImage> {
        self.images.iter().find(|image| image.image_index == index)
    }

    pub fn image_by_type(&self, type_id: &Guid) -> Option<&'static FwImage> {
        self.images
            .iter()
            .find(|image| &image.image_type_id == type_id)
    }

    pub fn transport(&self) -> Result<DfuTransport<'static>, CapsuleError> {
        Ok(DfuTransport::parse(self.dfu_string)?)
    }

    /// Check that images and transport alternates line up position by position.
    pub fn validate(&self) -> Result<(), CapsuleError> {
        if self.images.len() > usize::from(u8::MAX) {
            return Err(CapsuleError::TooManyImages);
        }

        for (pos, image) in self.images.iter().enumerate() {
            if usize::from(image.image_index) == pos + 1 {
                continue;
            }
            let seen = self.images[..pos]
                .iter()
                .any(|earlier| earlier.image_index == image.image_index);
            return Err(if seen {
                CapsuleError::DuplicateIndex(image.image_index)
            } else {
                CapsuleError::SparseIndex(image.image_index)
            });
        }

        let alternates = self.transport()?.alternates().len();
        if alternates < self.images.len() {
            return Err(CapsuleError::TransportMismatch {
                images: self.images.len(),
                alternates,
            });
        }

        Ok(())
    }

    /// Transport alternate receiving image `index`.
    pub fn region(&self, index: u8) -> Result<DfuAlt<'static>, CapsuleError> {
        if self.image(index).is_none() {
            return Err(CapsuleError::UnknownImage(index));
        }
        let transport = self.transport()?;
        transport
            .alt_for_image(index)
            .copied()
            .ok_or(CapsuleError::TransportMismatch {
                images: self.images.len(),
                alternates: transport.alternates().len(),
            })
    }
}
