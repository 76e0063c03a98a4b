//! Huffman entropy coding of quantized blocks (ISO/IEC 10918-1 F.1.2).
//!
//! Symbols flow into a [`SymbolSink`]: [`HuffmanSink`] writes the coded bits,
//! [`StatisticsSink`] only counts them so optimized tables can be built from
//! the exact same traversal.

use crate::constants::{
    BLOCK_DIM, EOB_SYMBOL, MAXIMUM_AC_CATEGORY, MAXIMUM_DC_CATEGORY, ZRL_SYMBOL,
};
use crate::error::{EncodeError, Result};
use crate::jpeg1::bit_writer::JpegBitWriter;
use crate::jpeg1::huffman::{
    FrequencyCounter, HuffmanTable, TableClass, magnitude_bits, magnitude_category,
};
use crate::jpeg1::quantization::QuantizedBlock;
use crate::jpeg_marker_code::JpegMarkerCode;

/// Receiver for the symbol stream of one scan.
pub trait SymbolSink {
    /// Emits `symbol` through table `slot` of `class`. Returns false when
    /// the table holds no code for it.
    fn put_symbol(&mut self, class: TableClass, slot: usize, symbol: u8) -> bool;

    /// Emits raw magnitude bits following a symbol.
    fn put_bits(&mut self, bits: u16, length: u8);

    /// Ends the current restart interval; `index` counts intervals from 0.
    fn restart(&mut self, index: usize);

    /// Ends the scan.
    fn finish(&mut self) {}
}

/// DC and AC tables, indexed by destination slot.
#[derive(Debug, Clone)]
pub struct HuffmanTables {
    pub dc: Vec<HuffmanTable>,
    pub ac: Vec<HuffmanTable>,
}

impl HuffmanTables {
    /// Annex K tables: slot 0 luminance, slot 1 chrominance.
    pub fn standard(color: bool) -> Self {
        let mut dc = vec![HuffmanTable::standard_luminance_dc()];
        let mut ac = vec![HuffmanTable::standard_luminance_ac()];
        if color {
            dc.push(HuffmanTable::standard_chrominance_dc());
            ac.push(HuffmanTable::standard_chrominance_ac());
        }
        Self { dc, ac }
    }

    fn get(&self, class: TableClass, slot: usize) -> Option<&HuffmanTable> {
        match class {
            TableClass::Dc => self.dc.get(slot),
            TableClass::Ac => self.ac.get(slot),
        }
    }
}

pub struct HuffmanSink<'a, 'w> {
    writer: JpegBitWriter<'w>,
    tables: &'a HuffmanTables,
}

impl<'a, 'w> HuffmanSink<'a, 'w> {
    pub fn new(destination: &'w mut Vec<u8>, tables: &'a HuffmanTables) -> Self {
        Self {
            writer: JpegBitWriter::new(destination),
            tables,
        }
    }
}

impl SymbolSink for HuffmanSink<'_, '_> {
    #[inline]
    fn put_symbol(&mut self, class: TableClass, slot: usize, symbol: u8) -> bool {
        match self.tables.get(class, slot).and_then(|t| t.code(symbol)) {
            Some(code) => {
                self.writer.write_bits(code.value, code.length);
                true
            }
            None => false,
        }
    }

    #[inline]
    fn put_bits(&mut self, bits: u16, length: u8) {
        self.writer.write_bits(bits, length);
    }

    fn restart(&mut self, index: usize) {
        self.writer.write_marker(JpegMarkerCode::restart(index));
    }

    fn finish(&mut self) {
        self.writer.flush();
    }
}

/// Symbol frequencies gathered per table slot.
#[derive(Debug, Clone)]
pub struct StatisticsSink {
    pub dc: Vec<FrequencyCounter>,
    pub ac: Vec<FrequencyCounter>,
}

impl StatisticsSink {
    pub fn new(slots: usize) -> Self {
        Self {
            dc: vec![FrequencyCounter::new(); slots],
            ac: vec![FrequencyCounter::new(); slots],
        }
    }

    /// Builds one optimized table per slot.
    pub fn into_tables(self) -> Result<HuffmanTables> {
        let dc = self
            .dc
            .iter()
            .map(|c| c.generate_table(TableClass::Dc))
            .collect::<Result<Vec<_>>>()?;
        let ac = self
            .ac
            .iter()
            .map(|c| c.generate_table(TableClass::Ac))
            .collect::<Result<Vec<_>>>()?;
        Ok(HuffmanTables { dc, ac })
    }
}

impl SymbolSink for StatisticsSink {
    #[inline]
    fn put_symbol(&mut self, class: TableClass, slot: usize, symbol: u8) -> bool {
        let counters = match class {
            TableClass::Dc => &mut self.dc,
            TableClass::Ac => &mut self.ac,
        };
        match counters.get_mut(slot) {
            Some(counter) => {
                counter.count(symbol);
                true
            }
            None => false,
        }
    }

    fn put_bits(&mut self, _bits: u16, _length: u8) {}

    fn restart(&mut self, _index: usize) {}
}

/// Where a block sits, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPosition {
    pub component: usize,
    pub block: usize,
}

impl BlockPosition {
    fn overflow(self, symbol: u16) -> EncodeError {
        EncodeError::SymbolOverflow {
            component: self.component,
            block: self.block,
            symbol,
        }
    }
}

/// Codes one block and returns its DC value, the next predictor.
pub fn encode_block<S: SymbolSink>(
    sink: &mut S,
    slot: usize,
    block: &QuantizedBlock,
    prev_dc: i16,
    position: BlockPosition,
) -> Result<i16> {
    let dc = block[0];
    let diff = dc as i32 - prev_dc as i32;
    let diff = i16::try_from(diff).map_err(|_| position.overflow(diff as u16))?;
    let category = magnitude_category(diff);
    if category > MAXIMUM_DC_CATEGORY || !sink.put_symbol(TableClass::Dc, slot, category) {
        return Err(position.overflow(category as u16));
    }
    sink.put_bits(magnitude_bits(diff, category), category);

    let mut run = 0u8;
    for &coefficient in &block[1..BLOCK_DIM] {
        if coefficient == 0 {
            run += 1;
            continue;
        }
        while run > 15 {
            if !sink.put_symbol(TableClass::Ac, slot, ZRL_SYMBOL) {
                return Err(position.overflow(ZRL_SYMBOL as u16));
            }
            run -= 16;
        }
        let category = magnitude_category(coefficient);
        if category > MAXIMUM_AC_CATEGORY {
            return Err(position.overflow(((run as u16) << 4) | category as u16));
        }
        let symbol = (run << 4) | category;
        if !sink.put_symbol(TableClass::Ac, slot, symbol) {
            return Err(position.overflow(symbol as u16));
        }
        sink.put_bits(magnitude_bits(coefficient, category), category);
        run = 0;
    }
    if run > 0 && !sink.put_symbol(TableClass::Ac, slot, EOB_SYMBOL) {
        return Err(position.overflow(EOB_SYMBOL as u16));
    }

    Ok(dc)
}

/// One component's part in a scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanComponent<'a> {
    /// Component index in the frame.
    pub index: usize,
    /// Blocks in raster order over a grid `blocks_wide` across.
    pub blocks: &'a [QuantizedBlock],
    pub blocks_wide: usize,
    /// Blocks per MCU horizontally and vertically (1x1 in single-component scans).
    pub h: usize,
    pub v: usize,
    /// Huffman table slot.
    pub table: usize,
}

/// Codes a full scan of `mcus_wide * mcus_high` MCUs.
///
/// Each component's DC predictor starts at zero and is reset after every
/// restart marker. A marker follows every `restart_interval` MCUs except
/// the last.
pub fn encode_scan<S: SymbolSink>(
    sink: &mut S,
    components: &[ScanComponent<'_>],
    mcus_wide: usize,
    mcus_high: usize,
    restart_interval: u16,
) -> Result<()> {
    let mut predictors = vec![0i16; components.len()];
    let total = mcus_wide * mcus_high;
    let interval = restart_interval as usize;
    let mut restarts = 0usize;

    for mcu in 0..total {
        if interval > 0 && mcu > 0 && mcu % interval == 0 {
            sink.restart(restarts);
            restarts += 1;
            predictors.iter_mut().for_each(|p| *p = 0);
        }

        let mcu_x = mcu % mcus_wide;
        let mcu_y = mcu / mcus_wide;
        for (component, predictor) in components.iter().zip(predictors.iter_mut()) {
            for by in 0..component.v {
                for bx in 0..component.h {
                    let row = mcu_y * component.v + by;
                    let col = mcu_x * component.h + bx;
                    let index = row * component.blocks_wide + col;
                    let position = BlockPosition {
                        component: component.index,
                        block: index,
                    };
                    let block = component.blocks.get(index).ok_or_else(|| {
                        EncodeError::internal(
                            crate::error::Stage::Entropy,
                            format!("block {} missing for component {}", index, component.index),
                        )
                    })?;
                    *predictor = encode_block(sink, component.table, block, *predictor, position)?;
                }
            }
        }
    }

    sink.finish();
    Ok(())
}
