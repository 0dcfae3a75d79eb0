// src/codec/registry.rs

//! Explicit codec registration and lookup.
//!
//! Codecs are identified by a unique name and produced by registered
//! factories; there is no dynamic discovery. Pattern-driven codecs enter
//! the registry through batch definition loading, which compiles every
//! definition and collects per-definition failures instead of aborting on
//! the first bad format.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::chunky::ChunkyCodec;
use super::direct::DirectCodec;
use super::patterned::PatternCodec;
use super::planar::PlanarCodec;
use super::tile_codec::{CodecError, TileCodec};
use crate::pattern::compiler::{PatternDefinition, PatternError, compile};
use crate::pattern::pattern_list::PatternList;

type CodecFactory = Box<dyn Fn() -> Box<dyn TileCodec> + Send + Sync>;

/// Outcome of loading a batch of pattern definitions. One definition's
/// failure never blocks the others.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, Vec<PatternError>)>,
}

impl BatchReport {
    pub fn all_loaded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A registry/factory of codecs keyed by format name.
#[derive(Default)]
pub struct CodecRegistry {
    factories: HashMap<String, CodecFactory>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in formula and direct codecs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("NES 1bpp", || Box::new(PlanarCodec::nes_1bpp()));
        registry.register("NES 2bpp", || Box::new(PlanarCodec::nes_2bpp()));
        registry.register("SNES 2bpp", || Box::new(PlanarCodec::snes_2bpp()));
        registry.register("Game Boy 2bpp", || Box::new(PlanarCodec::gb_2bpp()));
        registry.register("SNES 4bpp", || Box::new(PlanarCodec::snes_4bpp()));
        registry.register("Genesis 4bpp", || Box::new(ChunkyCodec::genesis_4bpp()));
        registry.register("PSX 4bpp", || Box::new(ChunkyCodec::psx_4bpp()));
        registry.register("PSX 8bpp", || Box::new(ChunkyCodec::psx_8bpp()));
        registry.register("PSX 16bpp", || Box::new(DirectCodec::psx_16bpp()));
        registry.register("BGR15", || Box::new(DirectCodec::bgr15()));
        registry.register("RGB24", || Box::new(DirectCodec::rgb24()));
        registry
    }

    /// Registers a codec factory under `name`, replacing any previous entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn TileCodec> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("registering codec '{name}'");
        self.factories.insert(name, Box::new(factory));
    }

    /// Compiles one pattern definition and registers a pattern-driven codec
    /// for it under the definition's name.
    pub fn register_patterned(
        &mut self,
        def: &PatternDefinition,
    ) -> Result<(), Vec<PatternError>> {
        let pattern = Arc::new(compile(def)?);
        self.register_pattern_list(pattern);
        Ok(())
    }

    /// Registers a pattern-driven codec for an already-compiled pattern.
    pub fn register_pattern_list(&mut self, pattern: Arc<PatternList>) {
        let name = pattern.name().to_string();
        self.register(name, move || {
            Box::new(PatternCodec::new(Arc::clone(&pattern)))
        });
    }

    /// Loads a batch of pattern definitions, registering every definition
    /// that compiles and collecting the failures.
    pub fn load_definitions(&mut self, defs: &[PatternDefinition]) -> BatchReport {
        let mut report = BatchReport::default();
        for def in defs {
            match self.register_patterned(def) {
                Ok(()) => report.loaded.push(def.name.clone()),
                Err(errors) => {
                    warn!(
                        "pattern definition '{}' failed to compile with {} error(s)",
                        def.name,
                        errors.len()
                    );
                    report.failed.push((def.name.clone(), errors));
                }
            }
        }
        report
    }

    /// Produces a fresh codec instance for `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn TileCodec>, CodecError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| CodecError::UnknownCodec(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered format names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Decodes a batch of elements in parallel, one fresh codec instance per
/// worker, since codec instances are not safe for concurrent use.
#[cfg(feature = "rayon")]
pub fn decode_elements_par(
    registry: &CodecRegistry,
    name: &str,
    jobs: &[(super::element::ArrangerElement, Vec<u8>)],
) -> Vec<Result<crate::color::native::ColorBuffer, CodecError>> {
    use rayon::prelude::*;

    jobs.par_iter()
        .map_init(
            || registry.create(name),
            |codec, (element, encoded)| match codec {
                Ok(codec) => codec
                    .decode_element(element, encoded)
                    .map(|buf| buf.clone()),
                Err(e) => Err(e.clone()),
            },
        )
        .collect()
}
