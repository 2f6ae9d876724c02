/// Mip chain builder
///
/// Produces the levels of one image, largest first, after discarding the
/// negotiated number of leading levels. The chain is a single-pass iterator:
/// each `next()` hands out a level that owns (or shares) its buffer and
/// replaces the previous one.

use std::sync::Arc;
use glam::UVec2;
use crate::error::Result;
use crate::image::Image;
use crate::texture::FormatPlan;

enum LevelPixels {
    Image(Arc<Image>),
    Compressed { image: Arc<Image>, index: u32 },
    Decompressed(Vec<u8>),
}

/// One level ready for upload
pub struct MipLevel {
    pub size: UVec2,
    pixels: LevelPixels,
    memory_use: u32,
}

impl MipLevel {
    /// Pixel or block data of this level
    ///
    /// # Panics
    ///
    /// Compressed levels only exist for indices present in the image's level table.
    pub fn data(&self) -> &[u8] {
        match &self.pixels {
            LevelPixels::Image(image) => image.data(),
            LevelPixels::Compressed { image, index } => match image.compressed_level(*index) {
                Some(level) => &level.data,
                None => unreachable!("compressed level {} checked when the chain yielded it", index),
            },
            LevelPixels::Decompressed(data) => data,
        }
    }

    /// Bytes this level occupies once uploaded
    pub fn memory_use(&self) -> u32 {
        self.memory_use
    }
}

enum ChainState {
    Uncompressed {
        current: Arc<Image>,
        started: bool,
    },
    Compressed {
        image: Arc<Image>,
        next_index: u32,
        decompress: bool,
    },
}

/// Lazy, non-restartable sequence of mip levels
pub struct MipChain {
    state: ChainState,
    top_size: UVec2,
}

impl MipChain {
    /// Build the chain for an image according to a format plan
    ///
    /// Conversion to RGBA and the leading-level skip of uncompressed images
    /// happen here, so `top_size` is known before the first level is pulled.
    pub fn new(image: Arc<Image>, plan: &FormatPlan) -> Result<Self> {
        if image.is_compressed() {
            let top = image.compressed_level(plan.mips_to_skip);
            let top_size = top.map_or(UVec2::ONE, |level| UVec2::new(level.width, level.height));
            return Ok(Self {
                state: ChainState::Compressed {
                    image,
                    next_index: plan.mips_to_skip,
                    decompress: plan.need_decompress,
                },
                top_size,
            });
        }

        let mut current = if plan.convert_to_rgba {
            Arc::new(image.convert_to_rgba()?)
        } else {
            image
        };
        for _ in 0..plan.mips_to_skip {
            current = current.next_level()?;
        }
        let top_size = UVec2::new(current.width(), current.height());
        Ok(Self {
            state: ChainState::Uncompressed { current, started: false },
            top_size,
        })
    }

    /// Size of the first level the chain yields
    pub fn top_size(&self) -> UVec2 {
        self.top_size
    }

    /// Levels left in a compressed table (None: derivation never runs out)
    pub fn remaining_levels(&self) -> Option<u32> {
        match &self.state {
            ChainState::Uncompressed { .. } => None,
            ChainState::Compressed { image, next_index, .. } => {
                Some(image.num_compressed_levels().saturating_sub(*next_index))
            }
        }
    }
}

impl Iterator for MipChain {
    type Item = Result<MipLevel>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            ChainState::Uncompressed { current, started } => {
                if *started {
                    match current.next_level() {
                        Ok(next) => *current = next,
                        Err(e) => return Some(Err(e)),
                    }
                }
                *started = true;
                let size = UVec2::new(current.width(), current.height());
                Some(Ok(MipLevel {
                    size,
                    memory_use: size.x * size.y * current.components(),
                    pixels: LevelPixels::Image(Arc::clone(current)),
                }))
            }
            ChainState::Compressed { image, next_index, decompress } => {
                let index = *next_index;
                let level = image.compressed_level(index)?;
                *next_index += 1;
                let size = UVec2::new(level.width, level.height);
                if *decompress {
                    let mut rgba = vec![0u8; size.x as usize * size.y as usize * 4];
                    if let Err(e) = level.decompress(&mut rgba) {
                        return Some(Err(e));
                    }
                    Some(Ok(MipLevel {
                        size,
                        memory_use: size.x * size.y * 4,
                        pixels: LevelPixels::Decompressed(rgba),
                    }))
                } else {
                    let memory_use = level.data_size() as u32;
                    Some(Ok(MipLevel {
                        size,
                        memory_use,
                        pixels: LevelPixels::Compressed { image: Arc::clone(image), index },
                    }))
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "mip_chain_tests.rs"]
mod tests;
