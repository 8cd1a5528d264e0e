//! Closed sets of codec and transport kinds.

use crate::error::PipelineError;

/// Compressed audio formats a decoder stage can be allocated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CodecKind {
    /// MPEG-1/2 Layer III
    Mp3 = 0,
    /// AAC / ADTS
    Aac = 1,
    /// Ogg Vorbis
    Ogg = 2,
    /// FLAC
    Flac = 3,
}

impl CodecKind {
    /// Lower-case name for logs and the station editor.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Aac => "aac",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
        }
    }

    /// Only MP3 framing is understood by the frame synchronizer.
    #[must_use]
    pub fn has_sync_filter(self) -> bool {
        matches!(self, Self::Mp3)
    }
}

impl TryFrom<u8> for CodecKind {
    type Error = PipelineError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Mp3),
            1 => Ok(Self::Aac),
            2 => Ok(Self::Ogg),
            3 => Ok(Self::Flac),
            _ => Err(PipelineError::Unsupported),
        }
    }
}

impl core::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the source stage reaches the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportKind {
    /// HTTP(S) reader with playlist resolution. Needs the URI set after
    /// linking.
    Http,
    /// Plain TCP socket without HTTP semantics. Connects to the target
    /// given at construction and needs a frame synchronizer behind it.
    RawSocket,
}

impl TransportKind {
    /// Classify `uri` by scheme.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] for an empty URI, an unknown
    /// scheme, or a scheme with no host.
    pub fn for_uri(uri: &str) -> Result<Self, PipelineError> {
        let (scheme, rest) = uri.split_once("://").ok_or(PipelineError::InvalidArgument)?;
        if rest.is_empty() {
            return Err(PipelineError::InvalidArgument);
        }
        if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
            Ok(Self::Http)
        } else if scheme.eq_ignore_ascii_case("tcp") {
            Ok(Self::RawSocket)
        } else {
            Err(PipelineError::InvalidArgument)
        }
    }

    /// Whether the URI must be pushed into the source after linking.
    #[must_use]
    pub fn needs_uri(self) -> bool {
        matches!(self, Self::Http)
    }
}
