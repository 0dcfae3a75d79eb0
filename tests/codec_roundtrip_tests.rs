use std::sync::Arc;

use retrotile::codec::registry::CodecRegistry;
use retrotile::codec::tile_codec::CodecError;
use retrotile::codec::{ArrangerElement, PatternCodec};
use retrotile::color::{NativeColor, Palette};
use retrotile::pattern::{PatternDefinition, compile};
use retrotile::{BitStream, ColorBuffer, PixelPacking, PlaneCoordinate, TileCodec};

fn checkerboard(palette: &Palette, width: usize, height: usize, depth: usize) -> ColorBuffer {
    let mut pixels = ColorBuffer::new(width, height);
    let entries = 1 << depth;
    for y in 0..height {
        for x in 0..width {
            let index = (x + y) % entries;
            pixels.set(x, y, palette.native_color(index).unwrap());
        }
    }
    pixels
}

/// Every built-in indexed codec must survive an encode/decode round trip
/// with a palette-representable buffer.
#[test]
fn test_indexed_builtin_round_trips() {
    let registry = CodecRegistry::with_builtins();
    let cases = [
        ("NES 1bpp", 8, 8, 1),
        ("NES 2bpp", 8, 8, 2),
        ("SNES 2bpp", 8, 8, 2),
        ("Game Boy 2bpp", 8, 8, 2),
        ("SNES 4bpp", 8, 8, 4),
        ("Genesis 4bpp", 8, 8, 4),
        ("PSX 4bpp", 16, 16, 4),
        ("PSX 8bpp", 16, 16, 8),
    ];

    for (name, width, height, depth) in cases {
        let mut codec = registry.create(name).unwrap();
        let palette = Arc::new(Palette::grayscale(depth));
        let element = ArrangerElement::new(width, height, 0).with_palette(Arc::clone(&palette));
        let pixels = checkerboard(&palette, width, height, depth);

        let encoded = codec.encode_element(&element, &pixels).unwrap().to_vec();
        assert_eq!(
            encoded.len() * 8,
            codec.descriptor().storage_bits_for(width, height),
            "codec {name} produced a wrong-sized encoding"
        );
        let decoded = codec.decode_element(&element, &encoded).unwrap();
        assert_eq!(decoded, &pixels, "codec {name} failed to round-trip");
    }
}

#[test]
fn test_direct_builtin_round_trips() {
    let registry = CodecRegistry::with_builtins();
    for name in ["PSX 16bpp", "BGR15", "RGB24"] {
        let mut codec = registry.create(name).unwrap();
        let element = ArrangerElement::new(8, 8, 0);

        // Channel values that survive 5-bit truncation exactly.
        let mut pixels = ColorBuffer::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                let five = |n: usize| {
                    let v = (n % 32) as u8;
                    (v << 3) | (v >> 2)
                };
                pixels.set(x, y, NativeColor::opaque(five(x), five(x + y), five(7 - x)));
            }
        }

        let encoded = codec.encode_element(&element, &pixels).unwrap().to_vec();
        let decoded = codec.decode_element(&element, &encoded).unwrap();
        assert_eq!(decoded, &pixels, "codec {name} failed to round-trip");
    }
}

/// A pattern-driven codec and a formula codec implementing the same layout
/// must agree bit for bit.
#[test]
fn test_pattern_codec_matches_formula_codec() {
    let registry = CodecRegistry::with_builtins();
    let mut snes = registry.create("SNES 2bpp").unwrap();

    // SNES 2bpp expressed as a pattern: per scanline, plane 0's row then
    // plane 1's row.
    let def = PatternDefinition::row_interleaved("SNES 2bpp (pattern)", 8, 8, 2);
    let mut patterned = PatternCodec::from_definition(&def).unwrap();

    let palette = Arc::new(Palette::grayscale(2));
    let element = ArrangerElement::new(8, 8, 0).with_palette(Arc::clone(&palette));
    let pixels = checkerboard(&palette, 8, 8, 2);

    let a = snes.encode_element(&element, &pixels).unwrap().to_vec();
    let b = patterned.encode_element(&element, &pixels).unwrap().to_vec();
    assert_eq!(a, b);
}

#[test]
fn test_decode_rejects_short_buffer_for_every_builtin() {
    let registry = CodecRegistry::with_builtins();
    for name in registry.names() {
        let mut codec = registry.create(name).unwrap();
        let desc = codec.descriptor().clone();
        let element = ArrangerElement::new(desc.width, desc.height, 0);
        let short = vec![0u8; desc.storage_size_bits / 8 - 1];
        let result = codec.decode_element(&element, &short);
        assert!(
            matches!(result, Err(CodecError::BufferTooSmall { .. })),
            "codec {name} accepted a short buffer"
        );
    }
}

#[test]
fn test_compiled_patterns_are_bijective() {
    let defs = [
        PatternDefinition::new(
            "planar scrambled",
            vec!["AAAAAAAACCCCCCCCBBBBBBBB".to_string()],
            PixelPacking::Planar,
            24,
            4,
            1,
            24,
        ),
        PatternDefinition::row_interleaved("row interleaved", 16, 16, 4),
        PatternDefinition::new(
            "chunky reversed",
            vec!["DDCCBBAA".to_string()],
            PixelPacking::Chunky,
            8,
            8,
            2,
            16,
        ),
    ];
    for def in &defs {
        let pattern = compile(def).unwrap();
        for i in 0..pattern.pattern_size() {
            let coord = pattern.decode_index(i);
            assert_eq!(
                pattern.encode_index(coord),
                i,
                "pattern '{}' is not bijective at bit {i}",
                def.name
            );
        }
    }
}

#[test]
fn test_pattern_literal_scenarios() {
    let planar = PatternDefinition::new(
        "literal planar",
        vec!["AAAAAAAACCCCCCCCBBBBBBBB".to_string()],
        PixelPacking::Planar,
        24,
        4,
        1,
        24,
    );
    let pattern = compile(&planar).unwrap();
    assert_eq!(pattern.decode_index(0), PlaneCoordinate::new(0, 0, 0));
    assert_eq!(pattern.decode_index(8), PlaneCoordinate::new(16, 0, 0));
    assert_eq!(pattern.decode_index(16), PlaneCoordinate::new(8, 0, 0));
    assert_eq!(pattern.encode_index(PlaneCoordinate::new(0, 0, 0)), 0);
    assert_eq!(pattern.encode_index(PlaneCoordinate::new(16, 0, 0)), 8);

    let chunky = PatternDefinition::new(
        "literal chunky",
        vec!["AABBCCDD".to_string()],
        PixelPacking::Chunky,
        8,
        2,
        4,
        32,
    );
    let pattern = compile(&chunky).unwrap();
    assert_eq!(pattern.decode_index(0), PlaneCoordinate::new(0, 0, 0));
    assert_eq!(pattern.decode_index(1), PlaneCoordinate::new(0, 0, 1));
    assert_eq!(pattern.decode_index(4), PlaneCoordinate::new(1, 0, 0));
    assert_eq!(pattern.encode_index(PlaneCoordinate::new(1, 0, 0)), 4);
}

/// A decoded NES tile re-encoded through a registry-created codec must
/// reproduce the original bytes exactly.
#[test]
fn test_nes_tile_byte_level_round_trip() {
    // A real-world style CHR tile: plane 0 then plane 1, 8 bytes each.
    let tile: [u8; 16] = [
        0x41, 0xC2, 0x44, 0x48, 0x10, 0x20, 0x40, 0x80, 0x01, 0x02, 0x04, 0x08, 0x16, 0x21, 0x42,
        0x87,
    ];
    let registry = CodecRegistry::with_builtins();
    let mut codec = registry.create("NES 2bpp").unwrap();
    let palette = Arc::new(Palette::grayscale(2));
    let element = ArrangerElement::new(8, 8, 0).with_palette(palette);

    let decoded = codec.decode_element(&element, &tile).unwrap().clone();
    let encoded = codec.encode_element(&element, &decoded).unwrap();
    assert_eq!(encoded, &tile);
}

/// The bit stream write path must reproduce what the read path consumed.
#[test]
fn test_bit_stream_transcription() {
    let source: Vec<u8> = (0u8..32).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();
    let mut reader = BitStream::open_read(&source, source.len() * 8).unwrap();
    let mut writer = BitStream::open_write(source.len() * 8, 1);

    // Copy with deliberately awkward run lengths.
    let mut remaining = source.len() * 8;
    for run in [1usize, 3, 7, 11, 13, 17, 19, 23, 29, 31].iter().cycle() {
        if remaining == 0 {
            break;
        }
        let n = (*run).min(remaining);
        let bits = reader.read_bits(n).unwrap();
        writer.write_bits(n, bits).unwrap();
        remaining -= n;
    }
    assert_eq!(writer.data(), source.as_slice());
}

#[cfg(feature = "rayon")]
#[test]
fn test_parallel_batch_decode() {
    use retrotile::codec::registry::decode_elements_par;

    let registry = CodecRegistry::with_builtins();
    let palette = Arc::new(Palette::grayscale(2));
    let jobs: Vec<_> = (0..64u8)
        .map(|i| {
            let element =
                ArrangerElement::new(8, 8, i as u64 * 128).with_palette(Arc::clone(&palette));
            (element, vec![i; 16])
        })
        .collect();

    let results = decode_elements_par(&registry, "NES 2bpp", &jobs);
    assert_eq!(results.len(), 64);
    assert!(results.iter().all(|r| r.is_ok()));
}
