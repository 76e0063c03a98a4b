// Baseline encoder validation against an independent decoder.
//
// Every stream produced here is decoded with the `jpeg-decoder` crate and
// inspected with the crate's own marker reader.

use fast_jpeg_encoder::jpeg_stream_reader::{JpegStreamReader, StreamInfo};
use fast_jpeg_encoder::{
    ChromaSubsampling, EncodeError, EncoderOptions, HuffmanMode, InvalidArgument, Jpeg1Encoder,
    PixelBuffer, PixelFormat, ScanLayout, encode_jpeg,
};
use proptest::prelude::*;

fn gradient_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * 4];
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) * 4;
            rgba[idx] = (x * 255 / width.max(2)) as u8;
            rgba[idx + 1] = (y * 255 / height.max(2)) as u8;
            rgba[idx + 2] = ((x + y) * 255 / (width + height)) as u8;
            rgba[idx + 3] = 255;
        }
    }
    rgba
}

/// Gradient with a deterministic texture so every quality level matters.
fn textured_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut rgba = gradient_rgba(width, height);
    for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
        let noise = ((i * 7919) % 61) as u8;
        px[0] = px[0].saturating_add(noise);
        px[1] = px[1].saturating_sub(noise / 2);
        px[2] = px[2].wrapping_add(noise / 3);
    }
    rgba
}

fn decode(encoded: &[u8]) -> (Vec<u8>, jpeg_decoder::ImageInfo) {
    let mut decoder = jpeg_decoder::Decoder::new(encoded);
    let pixels = decoder.decode().expect("reference decoder rejected the stream");
    let info = decoder.info().expect("missing image info");
    (pixels, info)
}

fn encode_with(width: u32, height: u32, rgba: &[u8], options: EncoderOptions) -> Vec<u8> {
    let pixels = PixelBuffer::new(width, height, rgba).expect("valid pixel buffer");
    Jpeg1Encoder::new(options).encode(&pixels).expect("encode failed")
}

/// Checks that entropy-coded data only carries stuffed 0xFF bytes or RST
/// markers, and that the last scan runs right up to EOI.
fn assert_entropy_segments_stuffed(encoded: &[u8], info: &StreamInfo) {
    assert!(!info.scans.is_empty());
    for scan in &info.scans {
        let data = &encoded[scan.data.clone()];
        for (i, pair) in data.windows(2).enumerate() {
            if pair[0] == 0xFF {
                assert!(
                    pair[1] == 0x00 || (0xD0..=0xD7).contains(&pair[1]),
                    "unstuffed 0xFF followed by 0x{:02X} at offset {}",
                    pair[1],
                    scan.data.start + i
                );
            }
        }
        assert_ne!(data.last(), Some(&0xFF), "scan data ends on a bare 0xFF");
    }
    let last = info.scans.last().map(|s| s.data.end);
    assert_eq!(last, Some(encoded.len() - 2));
}

#[test]
fn test_output_framed_by_soi_and_eoi() {
    for (width, height) in [(1, 1), (7, 3), (16, 16), (33, 17)] {
        let rgba = gradient_rgba(width, height);
        let encoded = encode_jpeg(width as u32, height as u32, &rgba, None).unwrap();
        assert_eq!(&encoded[..2], &[0xFF, 0xD8]);
        assert_eq!(&encoded[encoded.len() - 2..], &[0xFF, 0xD9]);
    }
}

/// Re-encodes the first generation at the same quality through the default
/// entry point and returns both decoded generations.
fn two_generations(width: u32, height: u32, rgba: &[u8], quality: f32) -> (Vec<u8>, Vec<u8>) {
    let first = encode_jpeg(width, height, rgba, Some(quality)).unwrap();
    let (generation1, _) = decode(&first);

    let buffer = PixelBuffer::with_format(width, height, PixelFormat::Rgb8, &generation1).unwrap();
    let second = Jpeg1Encoder::new(EncoderOptions::for_quality(quality))
        .encode(&buffer)
        .unwrap();
    let (generation2, _) = decode(&second);
    assert_eq!(generation1.len(), generation2.len());
    (generation1, generation2)
}

/// Mid-range content with pixel-level texture in every channel.
fn mid_range_noise_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut rgba = vec![255u8; width * height * 4];
    for (i, px) in rgba.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % width, i / width);
        let base = 48 + (x * 160 / width.max(2)) as i32;
        let noise = |salt: usize| ((i * 7919 + salt * 104_729) % 41) as i32 - 20;
        px[0] = (base + noise(1)).clamp(0, 255) as u8;
        px[1] = (48 + (y * 160 / height.max(2)) as i32 + noise(2)).clamp(0, 255) as u8;
        px[2] = (208 - (x * 80 / width.max(2)) as i32 + noise(3)).clamp(0, 255) as u8;
    }
    rgba
}

#[test]
fn test_generation_round_trip_at_full_quality() {
    let (width, height) = (32u32, 24u32);
    let rgba = gradient_rgba(width as usize, height as usize);
    let (generation1, generation2) = two_generations(width, height, &rgba, 1.0);

    for (i, (a, b)) in generation1.iter().zip(&generation2).enumerate() {
        let diff = (*a as i32 - *b as i32).abs();
        assert!(diff <= 2, "sample {} drifted by {}", i, diff);
    }

    // The first generation also stays close to the source.
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        for c in 0..3 {
            let diff = (px[c] as i32 - generation1[i * 3 + c] as i32).abs();
            assert!(diff <= 4, "pixel {} channel {} off by {}", i, c, diff);
        }
    }
}

#[test]
fn test_generation_round_trip_on_noise_at_full_quality() {
    // Pixel-level noise keeps every coefficient busy. Coefficient rounding
    // and the decoder's own 8-bit rounding still move the odd sample by more
    // than 2 once the chroma gains apply, so the bound here is statistical.
    let (width, height) = (64u32, 64u32);
    let rgba = mid_range_noise_rgba(width as usize, height as usize);
    let (generation1, generation2) = two_generations(width, height, &rgba, 1.0);

    let diffs: Vec<i32> = generation1
        .iter()
        .zip(&generation2)
        .map(|(a, b)| (*a as i32 - *b as i32).abs())
        .collect();
    let max = diffs.iter().copied().max().unwrap_or(0);
    let within = diffs.iter().filter(|&&d| d <= 2).count();
    let mean = diffs.iter().sum::<i32>() as f64 / diffs.len() as f64;

    assert!(max <= 4, "max drift {}", max);
    assert!(within * 100 >= diffs.len() * 97, "{} of {} within 2", within, diffs.len());
    assert!(mean < 1.0, "mean drift {}", mean);
}

#[test]
fn test_full_quality_keeps_chroma_resolution() {
    let rgba = textured_rgba(16, 16);
    for (quality, factors) in [(1.0f32, (1, 1)), (0.99, (2, 2))] {
        let encoded = encode_jpeg(16, 16, &rgba, Some(quality)).unwrap();
        let info = JpegStreamReader::read(&encoded).unwrap();
        let frame = info.frame.expect("frame header");
        let luma = &frame.components[0];
        assert_eq!((luma.horizontal_sampling, luma.vertical_sampling), factors);
    }
}

#[test]
fn test_entropy_data_is_byte_stuffed() {
    // Saturated noise produces plenty of 0xFF bytes in the coded data.
    let (width, height) = (48usize, 40usize);
    let mut rgba = textured_rgba(width, height);
    for (i, v) in rgba.iter_mut().enumerate() {
        if i % 4 != 3 && (i * 31) % 7 == 0 {
            *v = 255;
        }
    }
    for layout in [ScanLayout::Interleaved, ScanLayout::Planar] {
        let options = EncoderOptions::default()
            .quality(0.95)
            .scan_layout(layout)
            .restart_interval(3);
        let encoded = encode_with(width as u32, height as u32, &rgba, options);
        let info = JpegStreamReader::read(&encoded).unwrap();
        assert_entropy_segments_stuffed(&encoded, &info);
        decode(&encoded);
    }
}

#[test]
fn test_size_non_decreasing_with_quality() {
    // A finer quantizer never shrinks a coefficient, but the stream size can
    // still dip by a few bytes between neighbouring qualities: DC differences
    // change category, stuffing bytes come and go, and the final byte is
    // padded. Each step may drop by at most max(8 bytes, 1%).
    let (width, height) = (64u32, 64u32);
    let rgba = textured_rgba(width as usize, height as usize);
    let sizes: Vec<usize> = (0..=100)
        .map(|step| {
            let quality = step as f32 / 100.0;
            encode_jpeg(width, height, &rgba, Some(quality)).unwrap().len()
        })
        .collect();

    for (step, pair) in sizes.windows(2).enumerate() {
        let slack = (pair[0] / 100).max(8);
        assert!(
            pair[1] + slack >= pair[0],
            "size fell from {} to {} between q={:.2} and q={:.2}",
            pair[0],
            pair[1],
            step as f32 / 100.0,
            (step + 1) as f32 / 100.0
        );
    }
    assert!(sizes[0] < sizes[50]);
    assert!(sizes[50] < sizes[90]);
    assert!(sizes[90] < sizes[100]);
}

#[test]
fn test_single_pixel_image() {
    let rgba = [10u8, 200, 30, 255];
    for subsampling in [
        ChromaSubsampling::Yuv444,
        ChromaSubsampling::Yuv422,
        ChromaSubsampling::Yuv420,
    ] {
        let encoded = encode_with(1, 1, &rgba, EncoderOptions::default().subsampling(subsampling));
        let (pixels, info) = decode(&encoded);
        assert_eq!((info.width, info.height), (1, 1));
        assert_eq!(pixels.len(), 3);
    }
}

#[test]
fn test_solid_red_decodes_to_uniform_luma() {
    let rgba: Vec<u8> = [255u8, 0, 0, 255].repeat(16 * 16);
    let encoded = encode_jpeg(16, 16, &rgba, Some(0.8)).unwrap();
    let (pixels, info) = decode(&encoded);
    assert_eq!(info.pixel_format, jpeg_decoder::PixelFormat::RGB24);

    let luma: Vec<f64> = pixels
        .chunks_exact(3)
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .collect();
    let min = luma.iter().cloned().fold(f64::MAX, f64::min);
    let max = luma.iter().cloned().fold(f64::MIN, f64::max);
    assert!(max - min <= 2.0, "luma spread {} .. {}", min, max);
    // Red luma is about 76.
    assert!((min - 76.0).abs() < 6.0);
}

#[test]
fn test_short_buffer_is_invalid_argument() {
    let rgba = vec![0u8; 16 * 16 * 4 - 1];
    let result = encode_jpeg(16, 16, &rgba, Some(0.8));
    assert_eq!(
        result,
        Err(EncodeError::InvalidArguments(InvalidArgument::BufferLength {
            expected: 16 * 16 * 4,
            actual: 16 * 16 * 4 - 1,
        }))
    );
    assert!(matches!(
        encode_jpeg(0, 16, &rgba, None),
        Err(EncodeError::InvalidArguments(InvalidArgument::Width(0)))
    ));
}

#[test]
fn test_restart_markers_cycle() {
    // 16 MCUs with an interval of 1: RST0..RST7 then RST0..RST6.
    let (width, height) = (128u32, 8u32);
    let rgba = textured_rgba(width as usize, height as usize);
    let options = EncoderOptions::default().grayscale(true).restart_interval(1);
    let encoded = encode_with(width, height, &rgba, options);

    let info = JpegStreamReader::read(&encoded).unwrap();
    assert_eq!(info.restart_interval, 1);
    let expected: Vec<u8> = (0..15u8).map(|i| i % 8).collect();
    assert_eq!(info.scans[0].restart_markers, expected);

    let (pixels, _) = decode(&encoded);
    assert_eq!(pixels.len(), (width * height) as usize);
}

#[test]
fn test_planar_layout_one_scan_per_component() {
    let (width, height) = (40u32, 24u32);
    let rgba = textured_rgba(width as usize, height as usize);
    let options = EncoderOptions::default().scan_layout(ScanLayout::Planar);
    let encoded = encode_with(width, height, &rgba, options);

    let info = JpegStreamReader::read(&encoded).unwrap();
    assert_eq!(info.scans.len(), 3);
    for (i, scan) in info.scans.iter().enumerate() {
        assert_eq!(scan.selectors.len(), 1);
        assert_eq!(scan.selectors[0].0, i as u8 + 1);
    }

    // Planar and interleaved streams carry the same image.
    let interleaved = encode_with(width, height, &rgba, EncoderOptions::default());
    let (a, _) = decode(&encoded);
    let (b, _) = decode(&interleaved);
    assert_eq!(a, b);
}

#[test]
fn test_optimized_tables_decode_and_shrink() {
    let (width, height) = (96u32, 64u32);
    let rgba = textured_rgba(width as usize, height as usize);
    for layout in [ScanLayout::Interleaved, ScanLayout::Planar] {
        let standard_options = EncoderOptions::default().scan_layout(layout);
        let standard = encode_with(width, height, &rgba, standard_options);
        let optimized = encode_with(
            width,
            height,
            &rgba,
            EncoderOptions::default()
                .scan_layout(layout)
                .huffman_mode(HuffmanMode::Optimized),
        );
        assert!(
            optimized.len() <= standard.len(),
            "optimized {} > standard {}",
            optimized.len(),
            standard.len()
        );
        let (a, _) = decode(&standard);
        let (b, _) = decode(&optimized);
        assert_eq!(a, b, "table choice must not change the decoded image");
    }
}

#[test]
fn test_grayscale_has_one_component() {
    let rgba = gradient_rgba(20, 12);
    let encoded = encode_with(20, 12, &rgba, EncoderOptions::default().grayscale(true));
    let info = JpegStreamReader::read(&encoded).unwrap();
    let frame = info.frame.unwrap();
    assert_eq!(frame.components.len(), 1);
    assert_eq!(
        (frame.components[0].horizontal_sampling, frame.components[0].vertical_sampling),
        (1, 1)
    );
    assert_eq!(info.quantization_tables.len(), 1);
    assert_eq!(info.huffman_tables.len(), 2);

    let (_, decoded) = decode(&encoded);
    assert_eq!(decoded.pixel_format, jpeg_decoder::PixelFormat::L8);
}

#[test]
fn test_sampling_factors_and_odd_dimensions() {
    let (width, height) = (33u32, 17u32);
    let rgba = textured_rgba(width as usize, height as usize);
    for (subsampling, factors) in [
        (ChromaSubsampling::Yuv444, (1, 1)),
        (ChromaSubsampling::Yuv422, (2, 1)),
        (ChromaSubsampling::Yuv420, (2, 2)),
    ] {
        for layout in [ScanLayout::Interleaved, ScanLayout::Planar] {
            let options = EncoderOptions::default()
                .subsampling(subsampling)
                .scan_layout(layout);
            let encoded = encode_with(width, height, &rgba, options);
            let frame = JpegStreamReader::read(&encoded).unwrap().frame.unwrap();
            let luma = &frame.components[0];
            assert_eq!((luma.horizontal_sampling, luma.vertical_sampling), factors);
            assert_eq!(
                (frame.components[1].horizontal_sampling, frame.components[1].vertical_sampling),
                (1, 1)
            );

            let (pixels, info) = decode(&encoded);
            assert_eq!((info.width, info.height), (33, 17));
            assert_eq!(pixels.len(), 33 * 17 * 3);
        }
    }
}

#[test]
fn test_pixel_formats_agree() {
    let (width, height) = (12u32, 9u32);
    let rgba = textured_rgba(width as usize, height as usize);
    let bgra: Vec<u8> = rgba
        .chunks_exact(4)
        .flat_map(|p| [p[2], p[1], p[0], p[3]])
        .collect();
    let rgb: Vec<u8> = rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();

    let encoder = Jpeg1Encoder::new(EncoderOptions::default());
    let expected = encoder.encode(&PixelBuffer::new(width, height, &rgba).unwrap()).unwrap();
    for (format, data) in [(PixelFormat::Bgra8, &bgra), (PixelFormat::Rgb8, &rgb)] {
        let buffer = PixelBuffer::with_format(width, height, format, data).unwrap();
        assert_eq!(encoder.encode(&buffer).unwrap(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Arbitrary small images produce well-formed, decodable streams.
    #[test]
    fn prop_streams_are_well_formed(
        width in 1u32..40,
        height in 1u32..40,
        quality in 0.0f32..=1.0,
        seed in any::<u32>(),
        subsampling in prop_oneof![
            Just(ChromaSubsampling::Yuv444),
            Just(ChromaSubsampling::Yuv422),
            Just(ChromaSubsampling::Yuv420),
        ],
        planar in any::<bool>(),
        optimized in any::<bool>(),
        restart_interval in 0u16..4,
    ) {
        let mut state = seed | 1;
        let rgba: Vec<u8> = (0..width * height * 4)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        let options = EncoderOptions::default()
            .quality(quality)
            .subsampling(subsampling)
            .scan_layout(if planar { ScanLayout::Planar } else { ScanLayout::Interleaved })
            .huffman_mode(if optimized { HuffmanMode::Optimized } else { HuffmanMode::Standard })
            .restart_interval(restart_interval);
        let encoded = encode_with(width, height, &rgba, options);

        prop_assert_eq!(&encoded[..2], &[0xFF, 0xD8]);
        prop_assert_eq!(&encoded[encoded.len() - 2..], &[0xFF, 0xD9]);

        let info = JpegStreamReader::read(&encoded).unwrap();
        prop_assert!(info.end_of_image);
        assert_entropy_segments_stuffed(&encoded, &info);

        let (pixels, decoded) = decode(&encoded);
        prop_assert_eq!((decoded.width as u32, decoded.height as u32), (width, height));
        prop_assert_eq!(pixels.len(), (width * height * 3) as usize);
    }
}
