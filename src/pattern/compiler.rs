// src/pattern/compiler.rs

//! Compiles textual bit-layout patterns into exact decode/encode index tables.
//!
//! A pattern is an ordered list of row strings, one character per bit column.
//! Each character is a letter `A`..`Z` naming a natural column group: the
//! group's base x is `(letter - 'A') * block_width`, where `block_width` is
//! the row width divided by the number of distinct letters in that row, and
//! the k-th occurrence of a letter (scanning left to right, in on-disk order)
//! lands at `base + k`.
//!
//! Planar packing takes one row string per plane, consumed in lockstep per
//! scanline; chunky packing takes a single row string where each character
//! covers all planes of one pixel, plane index varying fastest.

use thiserror::Error;

use super::pattern_list::{PatternList, PixelPacking, PlaneCoordinate};

const LETTER_COUNT: usize = 26;

/// A textual pattern description, before compilation.
///
/// `pattern_size` is the declared total bit count and must match
/// `width * planes`; it is accepted as a signed value so that invalid
/// descriptions (zero, negative) can be rejected with a proper reason
/// instead of failing at construction.
#[derive(Debug, Clone)]
pub struct PatternDefinition {
    pub name: String,
    pub rows: Vec<String>,
    pub packing: PixelPacking,
    pub width: i32,
    pub height: i32,
    pub planes: i32,
    pub pattern_size: i64,
}

impl PatternDefinition {
    pub fn new(
        name: impl Into<String>,
        rows: Vec<String>,
        packing: PixelPacking,
        width: i32,
        height: i32,
        planes: i32,
        pattern_size: i64,
    ) -> Self {
        Self {
            name: name.into(),
            rows,
            packing,
            width,
            height,
            planes,
            pattern_size,
        }
    }

    /// A row-interleaved planar layout: each scanline stores plane 0's row,
    /// then plane 1's, and so on. The common case for pattern-driven formats
    /// that are not otherwise scrambled.
    pub fn row_interleaved(name: impl Into<String>, width: i32, height: i32, planes: i32) -> Self {
        let row: String = "A".repeat(width.max(0) as usize);
        Self::new(
            name,
            vec![row; planes.max(0) as usize],
            PixelPacking::Planar,
            width,
            height,
            planes,
            width as i64 * planes as i64,
        )
    }
}

/// One reason a pattern failed to compile. Compilation collects every
/// failure rather than stopping at the first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern '{name}' has too many letters: '{letter}' occurs {count} times in row {row} but each column group spans only {budget} columns")]
    TooManyLetters {
        name: String,
        letter: char,
        count: usize,
        budget: usize,
        row: usize,
    },
    #[error("pattern '{name}' declares {declared} bits but its rows supply {actual}")]
    SizeMismatch {
        name: String,
        declared: i64,
        actual: usize,
    },
    #[error("pattern '{name}' has invalid size {size}: size must be a positive bit count equal to width * planes")]
    InvalidSize { name: String, size: i64 },
    #[error("pattern '{name}' contains invalid character '{ch}' in row {row}: only letters A-Z are allowed")]
    InvalidCharacter { name: String, ch: char, row: usize },
    #[error("pattern '{name}' supplies {rows} row strings but {required} are required for this packing")]
    RowCountMismatch {
        name: String,
        rows: usize,
        required: usize,
    },
    #[error("pattern '{name}' rows must all be {width} characters long, row {row} has {len}")]
    UnevenRows {
        name: String,
        width: usize,
        row: usize,
        len: usize,
    },
    #[error("pattern '{name}' row {row} uses letter '{letter}' outside its {distinct} column groups: letters must be contiguous starting at 'A'")]
    LetterOutOfRange {
        name: String,
        letter: char,
        row: usize,
        distinct: usize,
    },
    #[error("pattern '{name}' row {row} has {width} columns, which cannot be divided evenly among {distinct} distinct letters")]
    IndivisibleRow {
        name: String,
        width: usize,
        distinct: usize,
        row: usize,
    },
}

/// Compiles a pattern definition into its index tables.
///
/// Returns every validation failure found; a pattern that passes validation
/// compiles into a bijective table pair by construction.
pub fn compile(def: &PatternDefinition) -> Result<PatternList, Vec<PatternError>> {
    let mut errors = Vec::new();
    let name = &def.name;

    if def.width <= 0 || def.height <= 0 || def.planes <= 0 || def.pattern_size <= 0 {
        errors.push(PatternError::InvalidSize {
            name: name.clone(),
            size: def.pattern_size,
        });
    }

    for (row_idx, row) in def.rows.iter().enumerate() {
        for ch in row.chars() {
            if !ch.is_ascii_uppercase() {
                errors.push(PatternError::InvalidCharacter {
                    name: name.clone(),
                    ch,
                    row: row_idx,
                });
            }
        }
    }

    // Nothing below is meaningful with bad geometry or bad characters.
    if !errors.is_empty() {
        return Err(errors);
    }

    let width = def.width as usize;
    let planes = def.planes as usize;
    let declared = def.pattern_size;

    let required_rows = match def.packing {
        PixelPacking::Planar => planes,
        PixelPacking::Chunky => 1,
    };
    if def.rows.len() != required_rows {
        errors.push(PatternError::RowCountMismatch {
            name: name.clone(),
            rows: def.rows.len(),
            required: required_rows,
        });
    }

    for (row_idx, row) in def.rows.iter().enumerate() {
        if row.len() != width {
            errors.push(PatternError::UnevenRows {
                name: name.clone(),
                width,
                row: row_idx,
                len: row.len(),
            });
        }
    }

    let supplied_bits = match def.packing {
        PixelPacking::Planar => def.rows.iter().map(|r| r.len()).sum::<usize>(),
        PixelPacking::Chunky => def.rows.iter().map(|r| r.len()).sum::<usize>() * planes,
    };
    if declared != supplied_bits as i64 || declared != width as i64 * planes as i64 {
        errors.push(PatternError::SizeMismatch {
            name: name.clone(),
            declared,
            actual: supplied_bits,
        });
    }

    for (row_idx, row) in def.rows.iter().enumerate() {
        validate_letter_budget(name, row, row_idx, &mut errors);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut decode = Vec::with_capacity(declared as usize);
    match def.packing {
        PixelPacking::Planar => {
            for (plane, row) in def.rows.iter().enumerate() {
                for x in row_column_order(row) {
                    decode.push(PlaneCoordinate::new(x as i16, 0, plane as i16));
                }
            }
        }
        PixelPacking::Chunky => {
            for x in row_column_order(&def.rows[0]) {
                for plane in 0..planes {
                    decode.push(PlaneCoordinate::new(x as i16, 0, plane as i16));
                }
            }
        }
    }

    Ok(PatternList::from_tables(
        name.clone(),
        width,
        def.height as usize,
        planes,
        def.packing,
        decode,
    ))
}

/// Rejects rows whose letters cannot form a bijective column mapping:
/// the row must divide evenly into column groups, every used letter must
/// name one of those groups (contiguous from 'A'), and no letter may
/// occur more often than its group is wide.
fn validate_letter_budget(
    name: &str,
    row: &str,
    row_idx: usize,
    errors: &mut Vec<PatternError>,
) {
    let mut counts = [0usize; LETTER_COUNT];
    for ch in row.chars() {
        counts[letter_index(ch)] += 1;
    }
    let distinct = counts.iter().filter(|&&c| c > 0).count();
    if distinct == 0 {
        return;
    }
    if row.len() % distinct != 0 {
        errors.push(PatternError::IndivisibleRow {
            name: name.to_string(),
            width: row.len(),
            distinct,
            row: row_idx,
        });
        return;
    }
    let budget = row.len() / distinct;
    for (idx, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        if idx >= distinct {
            // The letter's column group starts past the end of the row.
            errors.push(PatternError::LetterOutOfRange {
                name: name.to_string(),
                letter: (b'A' + idx as u8) as char,
                row: row_idx,
                distinct,
            });
        } else if count > budget {
            errors.push(PatternError::TooManyLetters {
                name: name.to_string(),
                letter: (b'A' + idx as u8) as char,
                count,
                budget,
                row: row_idx,
            });
        }
    }
}

/// Yields the natural x position of each row character in on-disk order.
fn row_column_order(row: &str) -> impl Iterator<Item = usize> + '_ {
    let mut counts = [0usize; LETTER_COUNT];
    for ch in row.chars() {
        counts[letter_index(ch)] += 1;
    }
    let distinct = counts.iter().filter(|&&c| c > 0).count();
    let block_width = if distinct == 0 { 0 } else { row.len() / distinct };
    let mut seen = [0usize; LETTER_COUNT];
    row.chars().map(move |ch| {
        let letter = letter_index(ch);
        let x = letter * block_width + seen[letter];
        seen[letter] += 1;
        x
    })
}

#[inline]
fn letter_index(ch: char) -> usize {
    (ch as u8 - b'A') as usize
}
