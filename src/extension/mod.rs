//! Simulated expansion boards, each carrying a device-tree overlay to apply.

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::Error;

mod bounded;

pub use bounded::BoundedString;

/// Size of a record field slot, terminator included.
pub const FIELD_LEN: usize = 32;

/// Text field of an [`ExtensionBoard`].
pub type Field = BoundedString<{ FIELD_LEN - 1 }>;

/// Number of boards the sandbox claims to have.
pub const SANDBOX_EXTENSION_COUNT: usize = 2;

/// A discovered expansion board.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ExtensionBoard {
    /// Overlay file to merge into the device tree.
    pub overlay: Field,
    pub name: Field,
    /// Manufacturer.
    pub owner: Field,
    pub version: Field,
    /// Free-form description.
    pub other: Field,
}

impl fmt::Display for ExtensionBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "\tManufacturer: \t\t{}", self.owner)?;
        writeln!(f, "\tVersion: \t\t{}", self.version)?;
        writeln!(f, "\tDevicetree overlay: \t{}", self.overlay)?;
        writeln!(f, "\tOther information: \t{}", self.other)
    }
}

/// Print boards the way `extension list` shows them.
pub fn write_list(out: &mut impl Write, boards: &[ExtensionBoard]) -> fmt::Result {
    for (i, board) in boards.iter().enumerate() {
        write!(out, "Extension {}: {}", i, board)?;
    }
    Ok(())
}

/// Caller-owned list that discovered boards are appended to.
pub trait ExtensionSink {
    /// Take ownership of `board`, or hand it back if there is no room for it.
    fn append(&mut self, board: ExtensionBoard) -> Result<(), ExtensionBoard>;
}

impl<const N: usize> ExtensionSink for heapless::Vec<ExtensionBoard, N> {
    fn append(&mut self, board: ExtensionBoard) -> Result<(), ExtensionBoard> {
        self.push(board)
    }
}

#[cfg(feature = "std")]
impl ExtensionSink for std::vec::Vec<ExtensionBoard> {
    fn append(&mut self, board: ExtensionBoard) -> Result<(), ExtensionBoard> {
        if self.try_reserve(1).is_err() {
            return Err(board);
        }
        self.push(board);
        Ok(())
    }
}

/// Record of the `index`th sandbox board.
pub fn sandbox_board(index: usize) -> ExtensionBoard {
    let mut board = ExtensionBoard {
        owner: Field::truncating("sandbox"),
        version: Field::truncating("1.1"),
        other: Field::truncating("Fictionnal extension board"),
        ..Default::default()
    };
    // Bounded strings never report a write error.
    let _ = write!(board.overlay, "overlay{}.dtbo", index);
    let _ = write!(board.name, "extension board {}", index);
    board
}

/// Append the sandbox boards to `list`, returning how many were added.
///
/// On [`Error::OutOfMemory`] the boards appended before the failure stay in `list`.
pub fn scan(list: &mut impl ExtensionSink) -> Result<usize, Error> {
    for index in 0..SANDBOX_EXTENSION_COUNT {
        if list.append(sandbox_board(index)).is_err() {
            log::warn!("no room for extension board {}", index);
            return Err(Error::OutOfMemory);
        }
        log::debug!("found extension board {}", index);
    }
    Ok(SANDBOX_EXTENSION_COUNT)
}

#[cfg(test)]
mod tests {
    use std::string::String;

    use super::*;

    type List = heapless::Vec<ExtensionBoard, 4>;

    #[test]
    fn finds_two_boards() {
        let mut list = List::new();
        assert_eq!(scan(&mut list), Ok(2));
        assert_eq!(list.len(), 2);

        for (i, board) in list.iter().enumerate() {
            assert_eq!(board.overlay.as_str(), std::format!("overlay{}.dtbo", i));
            assert_eq!(board.name.as_str(), std::format!("extension board {}", i));
            assert_eq!(board.owner.as_str(), "sandbox");
            assert_eq!(board.version.as_str(), "1.1");
            assert_eq!(board.other.as_str(), "Fictionnal extension board");
            assert!(!board.name.is_truncated());
        }
    }

    #[test]
    fn deterministic() {
        let mut first = List::new();
        let mut second = List::new();
        assert_eq!(scan(&mut first), scan(&mut second));
        assert_eq!(first, second);
    }

    #[test]
    fn appends_after_existing_entries() {
        let mut list = List::new();
        list.push(ExtensionBoard::default()).unwrap();
        scan(&mut list).unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list[1].name.as_str(), "extension board 0");
    }

    #[cfg(feature = "std")]
    #[test]
    fn growable_list() {
        let mut list = std::vec::Vec::new();
        assert_eq!(scan(&mut list), Ok(SANDBOX_EXTENSION_COUNT));
        assert_eq!(list.len(), SANDBOX_EXTENSION_COUNT);
    }

    #[test]
    fn partial_results_stay_on_failure() {
        let mut list = heapless::Vec::<ExtensionBoard, 1>::new();
        assert_eq!(scan(&mut list), Err(Error::OutOfMemory));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].overlay.as_str(), "overlay0.dtbo");

        let mut list = heapless::Vec::<ExtensionBoard, 0>::new();
        assert_eq!(scan(&mut list), Err(Error::OutOfMemory));
        assert!(list.is_empty());
    }

    #[test]
    fn lists_like_the_command() {
        let mut list = heapless::Vec::<ExtensionBoard, 2>::new();
        scan(&mut list).unwrap();

        let mut out = String::new();
        write_list(&mut out, &list).unwrap();

        assert!(out.starts_with(
            "Extension 0: extension board 0\n\tManufacturer: \t\tsandbox\n\tVersion: \t\t1.1\n"
        ));
        assert!(out.contains("Extension 1: extension board 1\n"));
        assert!(out.contains("\tDevicetree overlay: \toverlay1.dtbo\n"));
    }

    #[test]
    fn survives_handoff_encoding() {
        let board = sandbox_board(1);
        let mut buf = [0u8; 256];
        let used = postcard::to_slice(&board, &mut buf).unwrap();
        let decoded: ExtensionBoard = postcard::from_bytes(used).unwrap();
        assert_eq!(decoded, board);
    }
}
