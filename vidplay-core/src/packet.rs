//! Encoded packet abstraction.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
        /// Packet data is corrupted.
        const CORRUPT = 0x0002;
    }
}

/// An encoded media packet handed to the decoder.
///
/// Submitting a packet consumes it: the decoder owns the data from that
/// point regardless of the engine's verdict.
#[derive(Clone, Default)]
pub struct Packet {
    data: Vec<u8>,
    pub pts: i64,
    pub dts: i64,
    pub flags: PacketFlags,
}

impl Packet {
    pub fn new(data: Vec<u8>, pts: i64) -> Self {
        Self {
            data,
            pts,
            dts: pts,
            flags: PacketFlags::empty(),
        }
    }

    /// An empty packet, used to signal end of stream to the engine.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn keyframe(mut self) -> Self {
        self.flags.insert(PacketFlags::KEYFRAME);
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("pts", &self.pts)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet() {
        let pkt = Packet::new(vec![1, 2, 3], 100).keyframe();
        assert_eq!(pkt.size(), 3);
        assert_eq!(pkt.pts, 100);
        assert_eq!(pkt.dts, 100);
        assert!(pkt.flags.contains(PacketFlags::KEYFRAME));
        assert!(Packet::empty().is_empty());
    }
}
