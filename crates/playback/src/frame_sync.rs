//! MP3 frame synchronizer for raw socket streams.
//!
//! A raw TCP stream can be joined mid-frame. Until the first valid MPEG audio
//! frame header is seen, [`FrameSync`] discards input; after that it passes
//! every byte through untouched until the stream is reopened.
//!
//! A header whose four bytes straddle two input buffers is not matched: there
//! is no lookahead across calls, so the bytes before the next complete header
//! in a later buffer are dropped instead.

/// Bytes in an MPEG audio frame header.
pub const HEADER_LEN: usize = 4;

/// Fields of a frame header accepted by [`FrameHeader::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Version bits: 0 = MPEG-2.5, 2 = MPEG-2, 3 = MPEG-1.
    pub version: u8,
    /// Layer bits: 1 = III, 2 = II, 3 = I.
    pub layer: u8,
    /// Bitrate table index (0–14).
    pub bitrate_index: u8,
    /// Sample-rate table index (0–2).
    pub sample_rate_index: u8,
}

impl FrameHeader {
    /// Decode `bytes` as a header, rejecting reserved and forbidden fields.
    ///
    /// Requires the 11-bit sync word (`0xFF`, then the top three bits of the
    /// second byte set).
    #[must_use]
    pub fn parse(bytes: [u8; HEADER_LEN]) -> Option<Self> {
        let [b0, b1, b2, _] = bytes;
        if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
            return None;
        }
        let header = Self {
            version: (b1 >> 3) & 0x03,
            layer: (b1 >> 1) & 0x03,
            bitrate_index: (b2 >> 4) & 0x0F,
            sample_rate_index: (b2 >> 2) & 0x03,
        };
        let reserved = header.version == 0b01
            || header.layer == 0b00
            || header.bitrate_index == 0x0F
            || header.sample_rate_index == 0b11;
        (!reserved).then_some(header)
    }
}

/// Offset of the first valid header lying entirely inside `buf`.
#[must_use]
pub fn find_frame_header(buf: &[u8]) -> Option<(usize, FrameHeader)> {
    buf.windows(HEADER_LEN).enumerate().find_map(|(i, w)| {
        let bytes: [u8; HEADER_LEN] = w.try_into().ok()?;
        FrameHeader::parse(bytes).map(|h| (i, h))
    })
}

/// Discards bytes until the first frame header, then passes everything.
#[derive(Debug, Clone, Default)]
pub struct FrameSync {
    locked: bool,
    skipped: usize,
    header: Option<FrameHeader>,
}

impl FrameSync {
    /// Create an unlocked synchronizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream (re)opened: forget the lock and the skip count.
    pub fn open(&mut self) {
        self.locked = false;
        self.skipped = 0;
        self.header = None;
    }

    /// Stream closed. A pause keeps the lock so resuming does not rescan.
    pub fn close(&mut self, paused: bool) {
        if !paused {
            self.locked = false;
            self.header = None;
        }
    }

    /// Filter one input buffer, returning the part to forward downstream.
    pub fn process<'a>(&mut self, buf: &'a [u8]) -> &'a [u8] {
        if self.locked {
            return buf;
        }
        match find_frame_header(buf) {
            Some((offset, header)) => {
                self.skipped = self.skipped.saturating_add(offset);
                self.locked = true;
                self.header = Some(header);
                debug!("frame sync locked after skipping {} bytes", self.skipped);
                buf.get(offset..).unwrap_or_default()
            }
            None => {
                self.skipped = self.skipped.saturating_add(buf.len());
                &[]
            }
        }
    }

    /// `true` once a header has been found.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Bytes discarded before the lock since the last [`open`](Self::open).
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Header that produced the lock.
    #[must_use]
    pub fn header(&self) -> Option<FrameHeader> {
        self.header
    }
}
