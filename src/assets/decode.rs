use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::store::{FrameAsset, PreparedImage},
    foundation::error::{FramefitError, FramefitResult},
};

/// All of r, g, b must exceed this for a pixel to be knocked out entirely.
const OPAQUE_WHITE_FLOOR: u8 = 240;

/// All of r, g, b must exceed this for the semi-transparent halo band.
const NEAR_WHITE_FLOOR: u8 = 200;

/// Alpha assigned to the halo band.
const HALO_ALPHA: u8 = 128;

/// Decode a product overlay image into its two prepared forms.
///
/// `source` is the image as shipped; `transparent` has its near-white
/// background knocked out so it can sit over video. Both end up
/// premultiplied. If the bake cannot run, the overlay keeps its background
/// rather than failing the whole product.
pub fn decode_frame_asset(bytes: &[u8]) -> FramefitResult<FrameAsset> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let straight = rgba.into_raw();
    let mut baked = straight.clone();
    let mut baked = match bake_transparency(&mut baked) {
        Ok(()) => baked,
        Err(err) => {
            tracing::warn!(error = %err, "transparency bake failed, overlay keeps its background");
            straight.clone()
        }
    };
    premultiply_rgba8_in_place(&mut baked);

    let mut source = straight;
    premultiply_rgba8_in_place(&mut source);

    Ok(FrameAsset {
        source: PreparedImage {
            width,
            height,
            rgba8_premul: Arc::new(source),
        },
        transparent: PreparedImage {
            width,
            height,
            rgba8_premul: Arc::new(baked),
        },
    })
}

/// Knock near-white background out of a straight-alpha RGBA8 buffer.
///
/// Pixels with every channel above 240 become fully transparent; pixels with
/// every channel above 200 drop to half alpha; everything else is untouched.
/// Must run before premultiplication, on straight alpha.
pub fn bake_transparency(rgba: &mut [u8]) -> FramefitResult<()> {
    if rgba.len() % 4 != 0 {
        return Err(FramefitError::asset(format!(
            "straight RGBA8 buffer length {} is not a multiple of 4",
            rgba.len()
        )));
    }

    for px in rgba.chunks_exact_mut(4) {
        let (r, g, b) = (px[0], px[1], px[2]);
        if r > OPAQUE_WHITE_FLOOR && g > OPAQUE_WHITE_FLOOR && b > OPAQUE_WHITE_FLOOR {
            px[3] = 0;
        } else if r > NEAR_WHITE_FLOOR && g > NEAR_WHITE_FLOOR && b > NEAR_WHITE_FLOOR {
            px[3] = HALO_ALPHA;
        }
    }
    Ok(())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
