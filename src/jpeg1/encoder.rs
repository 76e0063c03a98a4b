//! JPEG 1 Baseline Encoder orchestration.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::constants::{DEFAULT_QUALITY, SEGMENT_MAX_DATA_SIZE};
use crate::error::{InvalidArgument, Result};
use crate::jpeg_stream_writer::{FrameComponent, JfifHeader, JpegStreamWriter, ScanSelector};
use crate::jpeg1::block::Blocks;
use crate::jpeg1::color::{self, PlaneSet};
use crate::jpeg1::dct::forward_dct;
use crate::jpeg1::entropy::{
    HuffmanSink, HuffmanTables, ScanComponent, StatisticsSink, SymbolSink, encode_scan,
};
use crate::jpeg1::quantization::{QuantTable, QuantizedBlock, TableKind};
use crate::{ChromaSubsampling, DensityUnit, HuffmanMode, PixelBuffer, ScanLayout};

/// Encoding parameters, built with chained setters.
///
/// ```
/// use fast_jpeg_encoder::{ChromaSubsampling, EncoderOptions, HuffmanMode};
///
/// let options = EncoderOptions::default()
///     .quality(0.9)
///     .subsampling(ChromaSubsampling::Yuv444)
///     .huffman_mode(HuffmanMode::Optimized)
///     .restart_interval(8);
/// assert_eq!(options.get_restart_interval(), 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderOptions {
    quality: f32,
    subsampling: ChromaSubsampling,
    scan_layout: ScanLayout,
    restart_interval: u16,
    huffman_mode: HuffmanMode,
    jfif: Option<JfifHeader>,
    comment: Option<Vec<u8>>,
    grayscale: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            subsampling: ChromaSubsampling::default(),
            scan_layout: ScanLayout::default(),
            restart_interval: 0,
            huffman_mode: HuffmanMode::default(),
            jfif: Some(JfifHeader::default()),
            comment: None,
            grayscale: false,
        }
    }
}

impl EncoderOptions {
    /// Defaults for a caller-supplied quality. Full quality (1.0 and above)
    /// selects 4:4:4 sampling; anything lower keeps the default 4:2:0.
    pub fn for_quality(quality: f32) -> Self {
        let subsampling = if quality >= 1.0 {
            ChromaSubsampling::Yuv444
        } else {
            ChromaSubsampling::default()
        };
        Self::default().quality(quality).subsampling(subsampling)
    }

    /// Quality in `[0, 1]`; finite values outside are clamped at encode time.
    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn subsampling(mut self, subsampling: ChromaSubsampling) -> Self {
        self.subsampling = subsampling;
        self
    }

    pub fn scan_layout(mut self, layout: ScanLayout) -> Self {
        self.scan_layout = layout;
        self
    }

    /// MCUs between restart markers; 0 disables them.
    pub fn restart_interval(mut self, interval: u16) -> Self {
        self.restart_interval = interval;
        self
    }

    pub fn huffman_mode(mut self, mode: HuffmanMode) -> Self {
        self.huffman_mode = mode;
        self
    }

    /// Enables or disables the JFIF APP0 segment.
    pub fn jfif(mut self, enabled: bool) -> Self {
        if enabled {
            self.jfif.get_or_insert_with(JfifHeader::default);
        } else {
            self.jfif = None;
        }
        self
    }

    /// Sets the JFIF pixel density (and enables the APP0 segment).
    pub fn density(mut self, unit: DensityUnit, x_density: u16, y_density: u16) -> Self {
        self.jfif = Some(JfifHeader {
            unit,
            x_density,
            y_density,
        });
        self
    }

    pub fn comment(mut self, comment: impl Into<Vec<u8>>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Emits a single luma component.
    pub fn grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }

    pub fn get_quality(&self) -> f32 {
        self.quality
    }

    pub fn get_subsampling(&self) -> ChromaSubsampling {
        self.subsampling
    }

    pub fn get_scan_layout(&self) -> ScanLayout {
        self.scan_layout
    }

    pub fn get_restart_interval(&self) -> u16 {
        self.restart_interval
    }

    pub fn get_huffman_mode(&self) -> HuffmanMode {
        self.huffman_mode
    }

    pub fn get_jfif(&self) -> Option<&JfifHeader> {
        self.jfif.as_ref()
    }

    pub fn get_comment(&self) -> Option<&[u8]> {
        self.comment.as_deref()
    }

    pub fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    fn validate(&self) -> Result<()> {
        if self.quality.is_nan() {
            return Err(InvalidArgument::Quality(self.quality).into());
        }
        match &self.comment {
            Some(comment) if comment.len() > SEGMENT_MAX_DATA_SIZE => {
                Err(InvalidArgument::Comment(comment.len()).into())
            }
            _ => Ok(()),
        }
    }
}

/// A frame component with its quantized blocks.
struct EncodedComponent {
    id: u8,
    h: usize,
    v: usize,
    kind: TableKind,
    blocks: Vec<QuantizedBlock>,
    blocks_wide: usize,
    blocks_high: usize,
}

/// One SOS worth of work.
struct ScanPlan<'a> {
    selectors: Vec<ScanSelector>,
    components: Vec<ScanComponent<'a>>,
    mcus_wide: usize,
    mcus_high: usize,
}

pub struct Jpeg1Encoder {
    options: EncoderOptions,
}

impl Jpeg1Encoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Encodes `pixels` into a complete baseline JPEG byte stream.
    pub fn encode(&self, pixels: &PixelBuffer<'_>) -> Result<Vec<u8>> {
        let options = &self.options;
        options.validate()?;
        let quality = options.quality.clamp(0.0, 1.0);

        let width = pixels.width() as usize;
        let height = pixels.height() as usize;
        debug!(
            width,
            height,
            quality,
            subsampling = ?options.subsampling,
            layout = ?options.scan_layout,
            grayscale = options.grayscale,
            "encoding baseline JPEG"
        );

        let planes = color::convert(pixels, options.subsampling, options.grayscale);
        let color = !planes.is_grayscale();
        let interleaved = color && options.scan_layout == ScanLayout::Interleaved;

        let mut quant_tables = vec![QuantTable::from_quality(TableKind::Luminance, quality)];
        if color {
            quant_tables.push(QuantTable::from_quality(TableKind::Chrominance, quality));
        }

        let components =
            Self::transform_components(&planes, &quant_tables, interleaved, width, height);
        let scans = Self::plan_scans(&components, interleaved, width, height);

        let tables = match options.huffman_mode {
            HuffmanMode::Standard => HuffmanTables::standard(color),
            HuffmanMode::Optimized => {
                let mut statistics = StatisticsSink::new(quant_tables.len());
                for scan in &scans {
                    Self::run_scan(&mut statistics, scan, options.restart_interval)?;
                }
                statistics.into_tables()?
            }
        };

        let mut writer = JpegStreamWriter::with_capacity(width * height / 2 + 1024);
        writer.write_start_of_image();
        if let Some(header) = &options.jfif {
            writer.write_jfif_app0(header)?;
        }
        if let Some(comment) = &options.comment {
            writer.write_com(comment)?;
        }
        for table in &quant_tables {
            writer.write_dqt(table.kind().slot(), &table.zigzag())?;
        }

        let frame: Vec<FrameComponent> = components
            .iter()
            .map(|c| FrameComponent {
                id: c.id,
                horizontal_sampling: c.h as u8,
                vertical_sampling: c.v as u8,
                quant_table: c.kind.slot(),
            })
            .collect();
        writer.write_sof0(width as u16, height as u16, &frame)?;

        for table_set in [&tables.dc, &tables.ac] {
            for (slot, table) in table_set.iter().enumerate() {
                writer.write_dht(table.class as u8, slot as u8, &table.lengths, &table.values)?;
            }
        }
        if options.restart_interval > 0 {
            writer.write_dri(options.restart_interval)?;
        }

        for scan in &scans {
            writer.write_sos(&scan.selectors)?;
            let start = writer.len();
            let mut sink = HuffmanSink::new(writer.buffer_mut(), &tables);
            Self::run_scan(&mut sink, scan, options.restart_interval)?;
            trace!(
                components = scan.selectors.len(),
                mcus = scan.mcus_wide * scan.mcus_high,
                bytes = writer.len() - start,
                "scan written"
            );
        }

        writer.write_end_of_image();
        let encoded = writer.into_inner();
        debug!(bytes = encoded.len(), "JPEG encoded");
        Ok(encoded)
    }

    fn transform_components(
        planes: &PlaneSet,
        quant_tables: &[QuantTable],
        interleaved: bool,
        width: usize,
        height: usize,
    ) -> Vec<EncodedComponent> {
        let (h_max, v_max) = if planes.is_grayscale() {
            (1, 1)
        } else {
            planes.subsampling.luma_factors()
        };
        let mcus_wide = width.div_ceil(8 * h_max);
        let mcus_high = height.div_ceil(8 * v_max);

        planes
            .planes
            .iter()
            .enumerate()
            .map(|(index, plane)| {
                let (h, v) = if index == 0 { (h_max, v_max) } else { (1, 1) };
                let kind = if index == 0 {
                    TableKind::Luminance
                } else {
                    TableKind::Chrominance
                };
                let blocks = if interleaved {
                    plane.blocks_in_grid(mcus_wide * h, mcus_high * v)
                } else {
                    plane.blocks()
                };
                let (blocks_wide, blocks_high) = blocks.grid();
                let table = &quant_tables[kind.slot() as usize];
                EncodedComponent {
                    id: index as u8 + 1,
                    h,
                    v,
                    kind,
                    blocks: transform_blocks(blocks, table),
                    blocks_wide,
                    blocks_high,
                }
            })
            .collect()
    }

    fn plan_scans<'a>(
        components: &'a [EncodedComponent],
        interleaved: bool,
        width: usize,
        height: usize,
    ) -> Vec<ScanPlan<'a>> {
        let selector = |c: &EncodedComponent| ScanSelector {
            id: c.id,
            dc_table: c.kind.slot(),
            ac_table: c.kind.slot(),
        };

        if interleaved {
            let (h_max, v_max) = (components[0].h, components[0].v);
            return vec![ScanPlan {
                selectors: components.iter().map(selector).collect(),
                components: components
                    .iter()
                    .enumerate()
                    .map(|(index, c)| ScanComponent {
                        index,
                        blocks: &c.blocks,
                        blocks_wide: c.blocks_wide,
                        h: c.h,
                        v: c.v,
                        table: c.kind.slot() as usize,
                    })
                    .collect(),
                mcus_wide: width.div_ceil(8 * h_max),
                mcus_high: height.div_ceil(8 * v_max),
            }];
        }

        components
            .iter()
            .enumerate()
            .map(|(index, c)| ScanPlan {
                selectors: vec![selector(c)],
                components: vec![ScanComponent {
                    index,
                    blocks: &c.blocks,
                    blocks_wide: c.blocks_wide,
                    h: 1,
                    v: 1,
                    table: c.kind.slot() as usize,
                }],
                mcus_wide: c.blocks_wide,
                mcus_high: c.blocks_high,
            })
            .collect()
    }

    fn run_scan<S: SymbolSink>(
        sink: &mut S,
        scan: &ScanPlan<'_>,
        restart_interval: u16,
    ) -> Result<()> {
        encode_scan(
            sink,
            &scan.components,
            scan.mcus_wide,
            scan.mcus_high,
            restart_interval,
        )
    }
}

/// Forward DCT and quantization of every block of one component.
fn transform_blocks(blocks: Blocks<'_>, table: &QuantTable) -> Vec<QuantizedBlock> {
    #[cfg(feature = "parallel")]
    {
        let samples: Vec<_> = blocks.collect();
        samples
            .par_iter()
            .map(|block| table.quantize(&forward_dct(block)))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        blocks
            .map(|block| table.quantize(&forward_dct(&block)))
            .collect()
    }
}
