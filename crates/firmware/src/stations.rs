//! Station records and the built-in station table.

use platform::{label, Label};
use playback::CodecKind;

/// Longest stream URI accepted.
pub const URI_CAPACITY: usize = 128;

/// Most stations a list can hold.
pub const MAX_STATIONS: usize = 32;

/// Stream URI storage.
pub type Uri = heapless::String<URI_CAPACITY>;

/// Bounded station list.
pub type StationList = heapless::Vec<Station, MAX_STATIONS>;

/// One tunable station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    /// Call sign shown as the station name.
    pub call_sign: Label,
    /// Location shown under the name.
    pub location: Label,
    /// Stream URI (`http://`, `https://` or `tcp://`).
    pub uri: Uri,
    /// Stream codec.
    pub codec: CodecKind,
}

impl Station {
    /// Build a record. Labels are truncated; an over-long URI is rejected.
    pub fn new(call_sign: &str, location: &str, uri: &str, codec: CodecKind) -> Option<Self> {
        Some(Self {
            call_sign: label(call_sign),
            location: label(location),
            uri: Uri::try_from(uri).ok()?,
            codec,
        })
    }
}

const BUILTIN: &[(&str, &str, &str, CodecKind)] = &[
    ("KEXP", "Seattle", "https://kexp.streamguys1.com/kexp160.aac", CodecKind::Aac),
    (
        "KBUT",
        "Crested Butte",
        "http://playerservices.streamtheworld.com/api/livestream-redirect/KBUTFM.mp3",
        CodecKind::Mp3,
    ),
    ("KSUT", "4 Corners", "https://ksut.streamguys1.com/kute", CodecKind::Aac),
    ("KDUR", "Durango", "https://kdurradio.fortlewis.edu/stream", CodecKind::Mp3),
    ("KOTO", "Telluride", "http://26193.live.streamtheworld.com/KOTOFM.mp3", CodecKind::Mp3),
    ("KHEN", "Salida", "https://stream.pacificaservice.org:9000/khen_128", CodecKind::Mp3),
    ("KWSB", "Gunnison", "https://kwsb.streamguys1.com/live", CodecKind::Mp3),
    ("KFFP", "Portland", "http://listen.freeformportland.org:8000/stream", CodecKind::Mp3),
    ("KBOO", "Portland", "https://live.kboo.fm:8443/high", CodecKind::Mp3),
    ("KXLU", "Loyola Marymount", "http://kxlu.streamguys1.com:80/kxlu-lo", CodecKind::Aac),
    ("WPRB", "Princeton", "https://wprb.streamguys1.com/listen.mp3", CodecKind::Aac),
    ("WMBR", "MIT", "https://wmbr.org:8002/hi", CodecKind::Mp3),
    ("KALX", "Berkeley", "https://stream.kalx.berkeley.edu:8443/kalx-128.mp3", CodecKind::Mp3),
    ("WFUV", "Fordham", "https://onair.wfuv.org/onair-hi", CodecKind::Mp3),
    (
        "KUFM",
        "Missoula",
        "https://playerservices.streamtheworld.com/api/livestream-redirect/KUFMFM.mp3",
        CodecKind::Mp3,
    ),
    ("KRCL", "Salt Lake City", "http://stream.xmission.com:8000/krcl-low", CodecKind::Aac),
];

/// The default station table.
pub fn builtin_stations() -> StationList {
    let mut list = StationList::new();
    for &(call_sign, location, uri, codec) in BUILTIN {
        let Some(station) = Station::new(call_sign, location, uri, codec) else {
            warn!("station {} skipped: URI too long", call_sign);
            continue;
        };
        if list.push(station).is_err() {
            warn!("station table full, {} skipped", call_sign);
            break;
        }
    }
    list
}
