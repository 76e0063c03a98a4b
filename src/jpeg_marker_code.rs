use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Marker codes emitted (and recognized) by the baseline encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOF0: Start of frame, baseline DCT.
    StartOfFrameBaseline = 0xC0,

    /// SOF1: Start of frame, extended sequential DCT.
    StartOfFrameExtended = 0xC1,

    /// SOF2: Start of frame, progressive DCT.
    StartOfFrameProgressive = 0xC2,

    /// DHT: Defines one or more Huffman tables.
    DefineHuffmanTable = 0xC4,

    /// RST0..RST7: Restart markers inside entropy-coded data.
    Restart0 = 0xD0,
    Restart1 = 0xD1,
    Restart2 = 0xD2,
    Restart3 = 0xD3,
    Restart4 = 0xD4,
    Restart5 = 0xD5,
    Restart6 = 0xD6,
    Restart7 = 0xD7,

    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,

    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,

    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,

    /// DQT: Defines one or more quantization tables.
    DefineQuantizationTable = 0xDB,

    /// DRI: Defines the restart interval used in succeeding scans.
    DefineRestartInterval = 0xDD,

    /// APP0: Application data 0: used for JFIF header.
    ApplicationData0 = 0xE0,
    /// APP1: Application data 1: used for EXIF or XMP header.
    ApplicationData1 = 0xE1,
    /// APP2: Application data 2: used for ICC profile.
    ApplicationData2 = 0xE2,
    /// APP14: Application data 14: used by Adobe
    ApplicationData14 = 0xEE,

    /// COM: Comment block.
    Comment = 0xFE,
}

impl JpegMarkerCode {
    /// Restart marker for the given position in the RST0..RST7 cycle.
    pub fn restart(index: usize) -> Self {
        match index % JPEG_RESTART_MARKER_RANGE as usize {
            0 => Self::Restart0,
            1 => Self::Restart1,
            2 => Self::Restart2,
            3 => Self::Restart3,
            4 => Self::Restart4,
            5 => Self::Restart5,
            6 => Self::Restart6,
            _ => Self::Restart7,
        }
    }

    pub fn is_restart(self) -> bool {
        let code: u8 = self.into();
        (JPEG_RESTART_MARKER_BASE..JPEG_RESTART_MARKER_BASE + JPEG_RESTART_MARKER_RANGE)
            .contains(&code)
    }

    /// Markers that stand alone, without a length field.
    pub fn is_standalone(self) -> bool {
        self.is_restart() || matches!(self, Self::StartOfImage | Self::EndOfImage)
    }
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
pub const JPEG_RESTART_MARKER_BASE: u8 = 0xD0;
pub const JPEG_RESTART_MARKER_RANGE: u8 = 8;
