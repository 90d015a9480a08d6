//! Parsing of the DFU alternate string that routes update payloads to storage.
//!
//! Format: `<interface> <device>=<alt>[;<alt>...]` where each alternate reads
//! `<name> raw <offset> <size>`, numbers in hexadecimal.

use core::fmt;

use heapless::Vec;

/// Most alternates a transport string may describe.
pub const MAX_ALTS: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransportError {
    /// No `=` between the device and its alternates.
    MissingSeparator,
    MissingInterface,
    MissingDevice,
    /// An alternate lacks its name, kind, offset or size.
    MissingField,
    /// Only raw alternates are understood.
    UnsupportedKind,
    BadNumber,
    TooManyAlternates,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportError::MissingSeparator => "missing '='",
            TransportError::MissingInterface => "missing interface",
            TransportError::MissingDevice => "missing device",
            TransportError::MissingField => "incomplete alternate",
            TransportError::UnsupportedKind => "unsupported alternate kind",
            TransportError::BadNumber => "malformed number",
            TransportError::TooManyAlternates => "too many alternates",
        })
    }
}

/// Raw storage region receiving one image.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DfuAlt<'a> {
    pub name: &'a str,
    pub offset: u32,
    pub size: u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DfuTransport<'a> {
    pub interface: &'a str,
    pub device: &'a str,
    alts: Vec<DfuAlt<'a>, MAX_ALTS>,
}

impl<'a> DfuTransport<'a> {
    pub fn parse(s: &'a str) -> Result<Self, TransportError> {
        let (head, body) = s.split_once('=').ok_or(TransportError::MissingSeparator)?;

        let mut head = head.split_whitespace();
        let interface = head.next().ok_or(TransportError::MissingInterface)?;
        let device = head.next().ok_or(TransportError::MissingDevice)?;
        if head.next().is_some() {
            return Err(TransportError::MissingSeparator);
        }

        let mut alts = Vec::new();
        for alt in body.split(';').map(str::trim).filter(|alt| !alt.is_empty()) {
            alts.push(parse_alt(alt)?)
                .map_err(|_| TransportError::TooManyAlternates)?;
        }

        Ok(Self {
            interface,
            device,
            alts,
        })
    }

    /// Alternates in positional order.
    pub fn alternates(&self) -> &[DfuAlt<'a>] {
        &self.alts
    }

    /// Alternate for the 1-based image `index`.
    pub fn alt_for_image(&self, index: u8) -> Option<&DfuAlt<'a>> {
        usize::from(index)
            .checked_sub(1)
            .and_then(|pos| self.alts.get(pos))
    }
}

fn parse_alt(alt: &str) -> Result<DfuAlt<'_>, TransportError> {
    let mut fields = alt.split_whitespace();
    let name = fields.next().ok_or(TransportError::MissingField)?;
    let kind = fields.next().ok_or(TransportError::MissingField)?;
    if kind != "raw" {
        return Err(TransportError::UnsupportedKind);
    }
    let offset = parse_hex(fields.next().ok_or(TransportError::MissingField)?)?;
    let size = parse_hex(fields.next().ok_or(TransportError::MissingField)?)?;
    if fields.next().is_some() || offset.checked_add(size).is_none() {
        return Err(TransportError::BadNumber);
    }

    Ok(DfuAlt { name, offset, size })
}

fn parse_hex(s: &str) -> Result<u32, TransportError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|_| TransportError::BadNumber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::SANDBOX_DFU_STRING;

    #[test]
    fn sandbox_string() {
        let transport = DfuTransport::parse(SANDBOX_DFU_STRING).unwrap();
        assert_eq!(transport.interface, "sf");
        assert_eq!(transport.device, "0:0");
        assert_eq!(
            transport.alternates(),
            [
                DfuAlt {
                    name: "u-boot-bin",
                    offset: 0x100000,
                    size: 0x50000
                },
                DfuAlt {
                    name: "u-boot-env",
                    offset: 0x150000,
                    size: 0x200000
                },
            ]
        );
    }

    #[test]
    fn positions_are_one_based() {
        let transport = DfuTransport::parse(SANDBOX_DFU_STRING).unwrap();
        assert!(transport.alt_for_image(0).is_none());
        assert_eq!(transport.alt_for_image(1).unwrap().name, "u-boot-bin");
        assert_eq!(transport.alt_for_image(2).unwrap().name, "u-boot-env");
        assert!(transport.alt_for_image(3).is_none());
    }

    #[test]
    fn tolerates_spacing_and_bare_hex() {
        let transport = DfuTransport::parse("sf 0:0= a raw 10 20 ; b raw 0X30 40;").unwrap();
        assert_eq!(transport.alternates().len(), 2);
        assert_eq!(transport.alternates()[0].offset, 0x10);
        assert_eq!(transport.alternates()[1].offset, 0x30);
    }

    #[test]
    fn malformed() {
        assert_eq!(
            DfuTransport::parse("sf 0:0 a raw 0 1"),
            Err(TransportError::MissingSeparator)
        );
        assert_eq!(DfuTransport::parse("sf=a raw 0 1"), Err(TransportError::MissingDevice));
        assert_eq!(DfuTransport::parse("=a raw 0 1"), Err(TransportError::MissingInterface));
        assert_eq!(DfuTransport::parse("sf 0:0=a raw 0"), Err(TransportError::MissingField));
        assert_eq!(
            DfuTransport::parse("mmc 0=a part 0 1"),
            Err(TransportError::UnsupportedKind)
        );
        assert_eq!(DfuTransport::parse("sf 0:0=a raw zz 1"), Err(TransportError::BadNumber));
        assert_eq!(
            DfuTransport::parse("sf 0:0=a raw 0xffffffff 0x2"),
            Err(TransportError::BadNumber)
        );
    }

    #[test]
    fn bounded_alternates() {
        let mut s = std::string::String::from("sf 0:0=a raw 0 1");
        for _ in 0..MAX_ALTS {
            s.push_str(";a raw 0 1");
        }
        assert_eq!(DfuTransport::parse(&s), Err(TransportError::TooManyAlternates));
    }
}
