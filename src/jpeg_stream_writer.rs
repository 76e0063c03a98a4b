//! JPEG Codestream Writer utilities.
//!
//! This module provides the `JpegStreamWriter` which handles the generation
//! of JPEG markers and segments (SOI, APP0, DQT, SOF0, DHT, SOS, EOI) for
//! baseline JFIF files.

use crate::DensityUnit;
use crate::constants::{
    BLOCK_DIM, JFIF_IDENTIFIER, JFIF_VERSION, SEGMENT_LENGTH_SIZE, SEGMENT_MAX_DATA_SIZE,
};
use crate::error::{EncodeError, Result, Stage};
use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

/// One component entry of a SOF0 segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    pub id: u8,
    pub horizontal_sampling: u8,
    pub vertical_sampling: u8,
    pub quant_table: u8,
}

/// One component selector of a SOS segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSelector {
    pub id: u8,
    pub dc_table: u8,
    pub ac_table: u8,
}

/// JFIF APP0 contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JfifHeader {
    pub unit: DensityUnit,
    pub x_density: u16,
    pub y_density: u16,
}

impl Default for JfifHeader {
    fn default() -> Self {
        Self {
            unit: DensityUnit::AspectRatio,
            x_density: 1,
            y_density: 1,
        }
    }
}

/// Accumulates a JPEG codestream in an owned buffer.
#[derive(Debug, Default)]
pub struct JpegStreamWriter {
    destination: Vec<u8>,
}

impl JpegStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            destination: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.destination.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destination.is_empty()
    }

    pub fn write_byte(&mut self, value: u8) {
        self.destination.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.destination.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.destination.extend_from_slice(bytes);
    }

    pub fn write_marker(&mut self, marker: JpegMarkerCode) {
        self.write_byte(JPEG_MARKER_START_BYTE);
        self.write_byte(marker.into());
    }

    /// Writes a marker followed by the length field for `data_size` bytes.
    fn write_segment_header(&mut self, marker: JpegMarkerCode, data_size: usize) -> Result<()> {
        if data_size > SEGMENT_MAX_DATA_SIZE {
            return Err(EncodeError::internal(
                Stage::Bitstream,
                format!("{:?} segment of {} bytes exceeds the length field", marker, data_size),
            ));
        }
        self.write_marker(marker);
        self.write_u16((data_size + SEGMENT_LENGTH_SIZE) as u16);
        Ok(())
    }

    pub fn write_start_of_image(&mut self) {
        self.write_marker(JpegMarkerCode::StartOfImage);
    }

    pub fn write_end_of_image(&mut self) {
        self.write_marker(JpegMarkerCode::EndOfImage);
    }

    pub fn write_jfif_app0(&mut self, header: &JfifHeader) -> Result<()> {
        self.write_segment_header(JpegMarkerCode::ApplicationData0, 14)?;
        self.write_bytes(&JFIF_IDENTIFIER);
        self.write_bytes(&JFIF_VERSION);
        self.write_byte(header.unit as u8);
        self.write_u16(header.x_density);
        self.write_u16(header.y_density);
        self.write_byte(0); // Thumbnail width
        self.write_byte(0); // Thumbnail height
        Ok(())
    }

    pub fn write_com(&mut self, comment: &[u8]) -> Result<()> {
        self.write_segment_header(JpegMarkerCode::Comment, comment.len())?;
        self.write_bytes(comment);
        Ok(())
    }

    /// Writes an 8-bit precision table; `table` is in zig-zag order.
    pub fn write_dqt(&mut self, table_id: u8, table: &[u8; BLOCK_DIM]) -> Result<()> {
        self.write_segment_header(JpegMarkerCode::DefineQuantizationTable, 1 + BLOCK_DIM)?;
        self.write_byte(table_id & 0x0F); // Precision 0 (8-bit), ID
        self.write_bytes(table);
        Ok(())
    }

    pub fn write_dht(
        &mut self,
        table_class: u8,
        table_id: u8,
        lengths: &[u8; 16],
        values: &[u8],
    ) -> Result<()> {
        self.write_segment_header(JpegMarkerCode::DefineHuffmanTable, 1 + 16 + values.len())?;
        self.write_byte(((table_class & 1) << 4) | (table_id & 0x0F));
        self.write_bytes(lengths);
        self.write_bytes(values);
        Ok(())
    }

    pub fn write_sof0(
        &mut self,
        width: u16,
        height: u16,
        components: &[FrameComponent],
    ) -> Result<()> {
        self.write_segment_header(
            JpegMarkerCode::StartOfFrameBaseline,
            6 + components.len() * 3,
        )?;
        self.write_byte(8); // Sample precision
        self.write_u16(height);
        self.write_u16(width);
        self.write_byte(components.len() as u8);
        for component in components {
            self.write_byte(component.id);
            self.write_byte(
                (component.horizontal_sampling << 4) | (component.vertical_sampling & 0x0F),
            );
            self.write_byte(component.quant_table);
        }
        Ok(())
    }

    pub fn write_dri(&mut self, restart_interval: u16) -> Result<()> {
        self.write_segment_header(JpegMarkerCode::DefineRestartInterval, 2)?;
        self.write_u16(restart_interval);
        Ok(())
    }

    pub fn write_sos(&mut self, selectors: &[ScanSelector]) -> Result<()> {
        self.write_segment_header(JpegMarkerCode::StartOfScan, 1 + selectors.len() * 2 + 3)?;
        self.write_byte(selectors.len() as u8);
        for selector in selectors {
            self.write_byte(selector.id);
            self.write_byte((selector.dc_table << 4) | (selector.ac_table & 0x0F));
        }
        self.write_byte(0); // Ss
        self.write_byte(63); // Se
        self.write_byte(0); // Ah/Al
        Ok(())
    }

    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.destination
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.destination
    }
}
