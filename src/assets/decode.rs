use std::path::Path;

use image::imageops::FilterType;

use crate::assets::path::ensure_file;
use crate::foundation::error::{StillcastError, StillcastResult};
use crate::foundation::math::premul_channel;
use crate::render::frame::FrameRGBA;

/// Decode the still image and resize it to `target_height`, keeping the aspect ratio.
#[tracing::instrument]
pub fn load_base_image(path: &Path, target_height: u32) -> StillcastResult<FrameRGBA> {
    ensure_file(path)?;
    let dyn_img = image::open(path).map_err(|e| decode_error(path, e))?;
    let rgba = dyn_img.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let (width, height) = fit_to_height(src_w, src_h, target_height)?;

    let resized = if (src_w, src_h) == (width, height) {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, FilterType::Lanczos3)
    };
    tracing::info!(src_w, src_h, width, height, "prepared base image");

    let mut data = resized.into_raw();
    premultiply_rgba8_in_place(&mut data);
    Ok(FrameRGBA {
        width,
        height,
        data,
        premultiplied: true,
    })
}

fn decode_error(path: &Path, err: image::ImageError) -> StillcastError {
    match err {
        image::ImageError::IoError(io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ) =>
        {
            StillcastError::file_not_found(path)
        }
        e => StillcastError::media(format!("failed to decode image '{}': {e}", path.display())),
    }
}

/// Output dimensions for an image of `src_w x src_h` scaled to `target_height`.
///
/// Width truncates like an integer cast, then drops to the nearest even value (min 2) so the
/// frame can be encoded as yuv420p.
pub fn fit_to_height(src_w: u32, src_h: u32, target_height: u32) -> StillcastResult<(u32, u32)> {
    if src_w == 0 || src_h == 0 {
        return Err(StillcastError::media("image has zero width or height"));
    }
    if target_height < 2 || !target_height.is_multiple_of(2) {
        return Err(StillcastError::invalid_config(format!(
            "target height must be even and at least 2, got {target_height}"
        )));
    }
    let scaled = (f64::from(src_w) * (f64::from(target_height) / f64::from(src_h))) as u32;
    let width = (scaled - scaled % 2).max(2);
    Ok((width, target_height))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = premul_channel(px[0], a);
        px[1] = premul_channel(px[1], a);
        px[2] = premul_channel(px[2], a);
    }
}
