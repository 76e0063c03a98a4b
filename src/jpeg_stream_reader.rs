//! Marker-level inspection of baseline JPEG streams.
//!
//! The reader walks segments from SOI to EOI, keeps the header tables it
//! meets and records where each scan's entropy-coded data lies. It never
//! decodes sample data.

use std::ops::Range;

use crate::constants::{BLOCK_DIM, JFIF_IDENTIFIER};
use crate::error::StreamError;
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: u8,
    pub horizontal_sampling: u8,
    pub vertical_sampling: u8,
    pub quant_table: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub marker: JpegMarkerCode,
    pub precision: u8,
    pub width: u16,
    pub height: u16,
    pub components: Vec<ComponentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JfifInfo {
    pub version: [u8; 2],
    pub unit: u8,
    pub x_density: u16,
    pub y_density: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTableInfo {
    pub id: u8,
    pub precision: u8,
    /// Entries in zig-zag order, as stored.
    pub values: [u8; BLOCK_DIM],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTableInfo {
    pub class: u8,
    pub id: u8,
    pub lengths: [u8; 16],
    pub values: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanInfo {
    /// (component id, DC table, AC table) per selector.
    pub selectors: Vec<(u8, u8, u8)>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approximation: u8,
    /// Entropy-coded bytes, restart markers included.
    pub data: Range<usize>,
    /// RSTn indices (0..=7) in stream order.
    pub restart_markers: Vec<u8>,
}

/// Everything the reader learned about a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub frame: Option<FrameInfo>,
    pub jfif: Option<JfifInfo>,
    pub comments: Vec<Vec<u8>>,
    pub quantization_tables: Vec<QuantizationTableInfo>,
    pub huffman_tables: Vec<HuffmanTableInfo>,
    pub restart_interval: u16,
    pub scans: Vec<ScanInfo>,
    /// Marker bytes in stream order, SOI to EOI.
    pub markers: Vec<u8>,
    pub end_of_image: bool,
}

pub struct JpegStreamReader<'a> {
    source: &'a [u8],
    position: usize,
}

impl<'a> JpegStreamReader<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Inspects a complete stream.
    pub fn read(source: &'a [u8]) -> Result<StreamInfo, StreamError> {
        let mut reader = Self::new(source);
        reader.read_stream()
    }

    pub fn read_stream(&mut self) -> Result<StreamInfo, StreamError> {
        let mut info = StreamInfo::default();
        if self.read_marker()? != u8::from(JpegMarkerCode::StartOfImage) {
            return Err(StreamError::MissingStartOfImage);
        }
        info.markers.push(JpegMarkerCode::StartOfImage.into());

        while self.position < self.source.len() {
            let code = self.read_marker()?;
            info.markers.push(code);
            match JpegMarkerCode::try_from(code) {
                Ok(JpegMarkerCode::EndOfImage) => {
                    info.end_of_image = true;
                    break;
                }
                Ok(
                    marker @ (JpegMarkerCode::StartOfFrameBaseline
                    | JpegMarkerCode::StartOfFrameExtended
                    | JpegMarkerCode::StartOfFrameProgressive),
                ) => info.frame = Some(self.read_start_of_frame(marker)?),
                Ok(JpegMarkerCode::DefineQuantizationTable) => {
                    let tables = self.read_dqt_segment()?;
                    info.quantization_tables.extend(tables);
                }
                Ok(JpegMarkerCode::DefineHuffmanTable) => {
                    let tables = self.read_dht_segment()?;
                    info.huffman_tables.extend(tables);
                }
                Ok(JpegMarkerCode::DefineRestartInterval) => {
                    info.restart_interval = self.read_dri_segment()?;
                }
                Ok(JpegMarkerCode::ApplicationData0) => {
                    if let Some(jfif) = self.read_app0_segment()? {
                        info.jfif = Some(jfif);
                    }
                }
                Ok(JpegMarkerCode::Comment) => {
                    let payload = self.read_segment_payload(JpegMarkerCode::Comment)?;
                    info.comments.push(payload.to_vec());
                }
                Ok(JpegMarkerCode::StartOfScan) => {
                    let mut scan = self.read_start_of_scan()?;
                    self.skip_entropy_coded_data(&mut scan);
                    info.scans.push(scan);
                }
                Ok(marker) if marker.is_standalone() => {}
                _ => self.skip_segment()?,
            }
        }
        Ok(info)
    }

    pub fn read_u8(&mut self) -> Result<u8, StreamError> {
        let value = *self
            .source
            .get(self.position)
            .ok_or(StreamError::UnexpectedEnd(self.position))?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16, StreamError> {
        let b1 = self.read_u8()? as u16;
        let b2 = self.read_u8()? as u16;
        Ok((b1 << 8) | b2)
    }

    /// Reads 0xFF (plus any fill bytes) and returns the marker code.
    pub fn read_marker(&mut self) -> Result<u8, StreamError> {
        let offset = self.position;
        let first = self.read_u8()?;
        if first != JPEG_MARKER_START_BYTE {
            return Err(StreamError::ExpectedMarker {
                offset,
                found: first,
            });
        }
        let mut code = self.read_u8()?;
        while code == JPEG_MARKER_START_BYTE {
            code = self.read_u8()?;
        }
        Ok(code)
    }

    fn read_segment_payload(&mut self, marker: JpegMarkerCode) -> Result<&'a [u8], StreamError> {
        let offset = self.position;
        let length = self.read_u16()? as usize;
        if length < 2 {
            return Err(StreamError::InvalidSegment {
                marker,
                offset,
                reason: "length shorter than its own field",
            });
        }
        let end = offset + length;
        let source: &'a [u8] = self.source;
        let payload = source
            .get(self.position..end)
            .ok_or(StreamError::UnexpectedEnd(source.len()))?;
        self.position = end;
        Ok(payload)
    }

    pub fn skip_segment(&mut self) -> Result<(), StreamError> {
        let offset = self.position;
        let length = self.read_u16()? as usize;
        if length < 2 || offset + length > self.source.len() {
            return Err(StreamError::UnexpectedEnd(offset));
        }
        self.position = offset + length;
        Ok(())
    }

    fn read_start_of_frame(&mut self, marker: JpegMarkerCode) -> Result<FrameInfo, StreamError> {
        let offset = self.position;
        let payload = self.read_segment_payload(marker)?;
        let invalid = |reason| StreamError::InvalidSegment {
            marker,
            offset,
            reason,
        };
        if payload.len() < 6 {
            return Err(invalid("frame header too short"));
        }
        let count = payload[5] as usize;
        if payload.len() != 6 + count * 3 {
            return Err(invalid("component count does not match length"));
        }
        let components = payload[6..]
            .chunks_exact(3)
            .map(|c| ComponentInfo {
                id: c[0],
                horizontal_sampling: c[1] >> 4,
                vertical_sampling: c[1] & 0x0F,
                quant_table: c[2],
            })
            .collect();
        Ok(FrameInfo {
            marker,
            precision: payload[0],
            height: u16::from_be_bytes([payload[1], payload[2]]),
            width: u16::from_be_bytes([payload[3], payload[4]]),
            components,
        })
    }

    pub fn read_dqt_segment(&mut self) -> Result<Vec<QuantizationTableInfo>, StreamError> {
        let marker = JpegMarkerCode::DefineQuantizationTable;
        let offset = self.position;
        let mut payload = self.read_segment_payload(marker)?;
        let mut tables = Vec::new();
        while !payload.is_empty() {
            let precision = payload[0] >> 4;
            let id = payload[0] & 0x0F;
            if precision != 0 {
                return Err(StreamError::InvalidSegment {
                    marker,
                    offset,
                    reason: "only 8-bit tables are baseline",
                });
            }
            let Some(entries) = payload.get(1..1 + BLOCK_DIM) else {
                return Err(StreamError::InvalidSegment {
                    marker,
                    offset,
                    reason: "truncated table",
                });
            };
            let mut values = [0u8; BLOCK_DIM];
            values.copy_from_slice(entries);
            tables.push(QuantizationTableInfo {
                id,
                precision,
                values,
            });
            payload = &payload[1 + BLOCK_DIM..];
        }
        Ok(tables)
    }

    pub fn read_dht_segment(&mut self) -> Result<Vec<HuffmanTableInfo>, StreamError> {
        let marker = JpegMarkerCode::DefineHuffmanTable;
        let offset = self.position;
        let mut payload = self.read_segment_payload(marker)?;
        let truncated = StreamError::InvalidSegment {
            marker,
            offset,
            reason: "truncated table",
        };
        let mut tables = Vec::new();
        while !payload.is_empty() {
            if payload.len() < 17 {
                return Err(truncated);
            }
            let mut lengths = [0u8; 16];
            lengths.copy_from_slice(&payload[1..17]);
            let total: usize = lengths.iter().map(|&n| n as usize).sum();
            let Some(values) = payload.get(17..17 + total) else {
                return Err(truncated);
            };
            tables.push(HuffmanTableInfo {
                class: payload[0] >> 4,
                id: payload[0] & 0x0F,
                lengths,
                values: values.to_vec(),
            });
            payload = &payload[17 + total..];
        }
        Ok(tables)
    }

    pub fn read_dri_segment(&mut self) -> Result<u16, StreamError> {
        let marker = JpegMarkerCode::DefineRestartInterval;
        let offset = self.position;
        let payload = self.read_segment_payload(marker)?;
        if payload.len() != 2 {
            return Err(StreamError::InvalidSegment {
                marker,
                offset,
                reason: "restart interval must be two bytes",
            });
        }
        Ok(u16::from_be_bytes([payload[0], payload[1]]))
    }

    fn read_app0_segment(&mut self) -> Result<Option<JfifInfo>, StreamError> {
        let payload = self.read_segment_payload(JpegMarkerCode::ApplicationData0)?;
        if payload.len() < 14 || payload[..5] != JFIF_IDENTIFIER {
            return Ok(None);
        }
        Ok(Some(JfifInfo {
            version: [payload[5], payload[6]],
            unit: payload[7],
            x_density: u16::from_be_bytes([payload[8], payload[9]]),
            y_density: u16::from_be_bytes([payload[10], payload[11]]),
        }))
    }

    fn read_start_of_scan(&mut self) -> Result<ScanInfo, StreamError> {
        let marker = JpegMarkerCode::StartOfScan;
        let offset = self.position;
        let payload = self.read_segment_payload(marker)?;
        let count = payload.first().copied().unwrap_or(0) as usize;
        if count == 0 || payload.len() != 1 + count * 2 + 3 {
            return Err(StreamError::InvalidSegment {
                marker,
                offset,
                reason: "component count does not match length",
            });
        }
        let selectors = payload[1..1 + count * 2]
            .chunks_exact(2)
            .map(|s| (s[0], s[1] >> 4, s[1] & 0x0F))
            .collect();
        let tail = &payload[1 + count * 2..];
        Ok(ScanInfo {
            selectors,
            spectral_start: tail[0],
            spectral_end: tail[1],
            approximation: tail[2],
            data: self.position..self.position,
            restart_markers: Vec::new(),
        })
    }

    /// Advances past entropy-coded data up to the next non-RST marker.
    fn skip_entropy_coded_data(&mut self, scan: &mut ScanInfo) {
        let start = self.position;
        let mut end = self.source.len();
        let mut i = start;
        while i + 1 < self.source.len() {
            if self.source[i] != JPEG_MARKER_START_BYTE {
                i += 1;
                continue;
            }
            let next = self.source[i + 1];
            match JpegMarkerCode::try_from(next) {
                _ if next == 0x00 || next == JPEG_MARKER_START_BYTE => i += 1,
                Ok(code) if code.is_restart() => {
                    scan.restart_markers.push(next - JpegMarkerCode::Restart0 as u8);
                    i += 2;
                }
                _ => {
                    end = i;
                    break;
                }
            }
        }
        scan.data = start..end;
        self.position = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpeg_stream_writer::{FrameComponent, JfifHeader, JpegStreamWriter, ScanSelector};

    fn minimal_stream(entropy: &[u8]) -> Vec<u8> {
        let mut writer = JpegStreamWriter::new();
        writer.write_start_of_image();
        writer.write_jfif_app0(&JfifHeader::default()).unwrap();
        writer.write_com(b"note").unwrap();
        writer.write_dqt(0, &[2; BLOCK_DIM]).unwrap();
        writer
            .write_sof0(
                10,
                20,
                &[FrameComponent {
                    id: 1,
                    horizontal_sampling: 1,
                    vertical_sampling: 1,
                    quant_table: 0,
                }],
            )
            .unwrap();
        writer.write_dht(0, 0, &[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], &[0]).unwrap();
        writer.write_dri(2).unwrap();
        writer
            .write_sos(&[ScanSelector {
                id: 1,
                dc_table: 0,
                ac_table: 0,
            }])
            .unwrap();
        writer.write_bytes(entropy);
        writer.write_end_of_image();
        writer.into_inner()
    }

    #[test]
    fn test_reads_headers() {
        let stream = minimal_stream(&[0x12, 0x34]);
        let info = JpegStreamReader::read(&stream).unwrap();

        let frame = info.frame.unwrap();
        assert_eq!(frame.marker, JpegMarkerCode::StartOfFrameBaseline);
        assert_eq!((frame.width, frame.height, frame.precision), (10, 20, 8));
        assert_eq!(frame.components.len(), 1);

        let jfif = info.jfif.unwrap();
        assert_eq!(jfif.version, [1, 1]);
        assert_eq!((jfif.x_density, jfif.y_density), (1, 1));

        assert_eq!(info.comments, vec![b"note".to_vec()]);
        assert_eq!(info.quantization_tables.len(), 1);
        assert_eq!(info.quantization_tables[0].values, [2; BLOCK_DIM]);
        assert_eq!(info.huffman_tables[0].values, vec![0]);
        assert_eq!(info.restart_interval, 2);
        assert!(info.end_of_image);
        assert_eq!(info.markers.first(), Some(&0xD8));
        assert_eq!(info.markers.last(), Some(&0xD9));
    }

    #[test]
    fn test_locates_entropy_data_and_restarts() {
        let entropy = [0xAB, 0xFF, 0x00, 0xFF, 0xD0, 0x01, 0xFF, 0xD1, 0x02];
        let stream = minimal_stream(&entropy);
        let info = JpegStreamReader::read(&stream).unwrap();
        assert_eq!(info.scans.len(), 1);
        let scan = &info.scans[0];
        assert_eq!(&stream[scan.data.clone()], &entropy);
        assert_eq!(scan.restart_markers, vec![0, 1]);
        assert_eq!(scan.selectors, vec![(1, 0, 0)]);
        assert_eq!((scan.spectral_start, scan.spectral_end), (0, 63));
    }

    #[test]
    fn test_rejects_missing_soi() {
        assert_eq!(
            JpegStreamReader::read(&[0xFF, 0xD9]).unwrap_err(),
            StreamError::MissingStartOfImage
        );
        assert_eq!(
            JpegStreamReader::read(&[0x00, 0xD8]).unwrap_err(),
            StreamError::ExpectedMarker {
                offset: 0,
                found: 0
            }
        );
    }

    #[test]
    fn test_truncated_segment() {
        let mut stream = minimal_stream(&[]);
        stream.truncate(30);
        assert!(JpegStreamReader::read(&stream).is_err());
    }

    #[test]
    fn test_skips_unknown_segments() {
        let mut stream = vec![0xFF, 0xD8, 0xFF, 0xE5, 0x00, 0x04, 0xAA, 0xBB];
        stream.extend_from_slice(&[0xFF, 0xD9]);
        let info = JpegStreamReader::read(&stream).unwrap();
        assert!(info.end_of_image);
        assert_eq!(info.markers, vec![0xD8, 0xE5, 0xD9]);
    }
}
