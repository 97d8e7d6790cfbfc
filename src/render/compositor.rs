//! CPU compositor for the try-on preview.
//!
//! Premultiplied RGBA8 throughout: camera frames arrive opaque, product
//! images are premultiplied at load, and every blend here is premultiplied
//! source-over. Mirroring is a whole-frame flip applied as the final step,
//! so composition always happens in unmirrored source space and the overlay
//! stays aligned with the landmark coordinates.

use kurbo::{Point, Rect};

use crate::assets::store::PreparedImage;
use crate::camera::capability::CameraErrorKind;
use crate::foundation::core::{Canvas, Rgba8Premul, VideoFrame};
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::foundation::math::mul_div255_u8;
use crate::mesh::frame::LandmarkFrame;
use crate::mesh::topology::landmark;
use crate::overlay::placement::OverlayTransform;

/// Straight color of the landmark debug layer.
const DEBUG_GREEN: [u8; 3] = [0, 255, 0];
/// Opacity of the landmark debug layer.
const DEBUG_OPACITY: f32 = 0.2;
/// Radius of an eye-anchor dot, px.
const DEBUG_DOT_RADIUS: i64 = 2;

/// Straight background color of the fallback surface.
const FALLBACK_BACKGROUND: [u8; 3] = [0xf0, 0xf0, 0xf0];
/// Vertical drop of the fallback product image below canvas center, px.
const FALLBACK_DROP_PX: f64 = 50.0;

/// A fully composed preview frame. Premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// An all-transparent frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// A frame filled with one premultiplied color.
    pub fn solid(width: u32, height: u32, px: Rgba8Premul) -> Self {
        let count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// The pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

/// What the compositor draws besides the camera image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeSettings {
    /// Flip the finished frame horizontally (selfie view).
    pub mirrored: bool,
    /// Draw the eye-anchor debug layer.
    pub debug_landmarks: bool,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            mirrored: true,
            debug_landmarks: false,
        }
    }
}

/// One overlay draw: which prepared image, placed where.
#[derive(Clone, Copy, Debug)]
pub struct OverlayDraw<'a> {
    /// Transparency-baked, premultiplied product image.
    pub image: &'a PreparedImage,
    /// Destination rectangle on the canvas.
    pub transform: OverlayTransform,
}

/// Compose one preview frame.
///
/// Draw order: camera image scaled to the canvas, then the overlay (when a
/// transform was computed or held), then the optional debug layer, then the
/// mirror flip.
pub fn compose_frame(
    canvas: Canvas,
    video: &VideoFrame,
    overlay: Option<OverlayDraw<'_>>,
    landmarks: Option<&LandmarkFrame>,
    settings: ComposeSettings,
) -> FramefitResult<FrameRGBA> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(FramefitError::validation(
            "compose requires a non-empty canvas",
        ));
    }
    video.validate()?;

    let mut frame = FrameRGBA::new(canvas.width, canvas.height);
    blit_video(&mut frame, video);

    if let Some(draw) = overlay {
        blit_premul_scaled(&mut frame, draw.image, draw.transform.rect())?;
    }

    if settings.debug_landmarks
        && let Some(mesh) = landmarks
    {
        draw_debug_layer(&mut frame, mesh, canvas);
    }

    if settings.mirrored {
        mirror_in_place(&mut frame);
    }
    Ok(frame)
}

/// The stateless preview drawn when the camera is permanently unavailable.
#[derive(Clone, Debug)]
pub struct FallbackSurface {
    /// Composed fallback frame.
    pub frame: FrameRGBA,
    /// User-actionable description of what went wrong.
    pub message: String,
}

/// Compose the no-camera fallback: the untouched product image over a
/// neutral background, slightly below center, plus the user message for the
/// failure kind. Needs no camera, detector or prior session state.
pub fn fallback_surface(
    canvas: Canvas,
    product: &PreparedImage,
    kind: CameraErrorKind,
) -> FramefitResult<FallbackSurface> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(FramefitError::validation(
            "fallback requires a non-empty canvas",
        ));
    }
    let background = Rgba8Premul::from_straight_rgba(
        FALLBACK_BACKGROUND[0],
        FALLBACK_BACKGROUND[1],
        FALLBACK_BACKGROUND[2],
        255,
    );
    let mut frame = FrameRGBA::solid(canvas.width, canvas.height, background);

    if product.width > 0 && product.height > 0 {
        let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
        let (iw, ih) = (f64::from(product.width), f64::from(product.height));
        let scale = (0.8 * w / iw).min(0.6 * h / ih);
        let dw = iw * scale;
        let dh = ih * scale;
        let x0 = (w - dw) / 2.0;
        let y0 = (h - dh) / 2.0 + FALLBACK_DROP_PX;
        blit_premul_scaled(&mut frame, product, Rect::new(x0, y0, x0 + dw, y0 + dh))?;
    }

    Ok(FallbackSurface {
        frame,
        message: kind.to_string(),
    })
}

/// Flip a composed frame horizontally in place.
pub fn mirror_in_place(frame: &mut FrameRGBA) {
    let w = frame.width as usize;
    if w < 2 {
        return;
    }
    for row in frame.data.chunks_exact_mut(w * 4) {
        let mut left = 0usize;
        let mut right = w - 1;
        while left < right {
            for k in 0..4 {
                row.swap(left * 4 + k, right * 4 + k);
            }
            left += 1;
            right -= 1;
        }
    }
}

// Nearest-neighbor scale of the camera image onto the canvas. Camera frames
// are opaque, so rgb copies over and alpha pins to 255.
fn blit_video(frame: &mut FrameRGBA, video: &VideoFrame) {
    let (cw, ch) = (frame.width as usize, frame.height as usize);
    let (vw, vh) = (video.width as usize, video.height as usize);
    if vw == 0 || vh == 0 {
        return;
    }
    for oy in 0..ch {
        let sy = oy * vh / ch;
        for ox in 0..cw {
            let sx = ox * vw / cw;
            let si = (sy * vw + sx) * 4;
            let di = (oy * cw + ox) * 4;
            frame.data[di] = video.data[si];
            frame.data[di + 1] = video.data[si + 1];
            frame.data[di + 2] = video.data[si + 2];
            frame.data[di + 3] = 255;
        }
    }
}

// Premultiplied source-over of `image` scaled into `dest`, clipped to the
// frame. Inverse mapping with pixel-center sampling, nearest source texel.
fn blit_premul_scaled(
    frame: &mut FrameRGBA,
    image: &PreparedImage,
    dest: Rect,
) -> FramefitResult<()> {
    let (iw, ih) = (image.width as usize, image.height as usize);
    if iw == 0 || ih == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
        return Ok(());
    }
    if image.rgba8_premul.len() != iw * ih * 4 {
        return Err(FramefitError::validation(format!(
            "prepared image byte length {} does not match {}x{}",
            image.rgba8_premul.len(),
            image.width,
            image.height
        )));
    }

    let x0 = dest.x0.floor().max(0.0) as usize;
    let y0 = dest.y0.floor().max(0.0) as usize;
    let x1 = dest.x1.ceil().clamp(0.0, f64::from(frame.width)) as usize;
    let y1 = dest.y1.ceil().clamp(0.0, f64::from(frame.height)) as usize;

    let src = image.rgba8_premul.as_slice();
    for dy in y0..y1 {
        for dx in x0..x1 {
            let u = ((dx as f64 + 0.5 - dest.x0) / dest.width() * iw as f64).floor();
            let v = ((dy as f64 + 0.5 - dest.y0) / dest.height() * ih as f64).floor();
            if u < 0.0 || v < 0.0 {
                continue;
            }
            let (u, v) = (u as usize, v as usize);
            if u >= iw || v >= ih {
                continue;
            }
            let si = (v * iw + u) * 4;
            let di = (dy * frame.width as usize + dx) * 4;
            let out = over(
                [
                    frame.data[di],
                    frame.data[di + 1],
                    frame.data[di + 2],
                    frame.data[di + 3],
                ],
                [src[si], src[si + 1], src[si + 2], src[si + 3]],
                1.0,
            );
            frame.data[di..di + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

// Soft green eye anchors matching the development overlay of the web build:
// the four corner dots and the line joining the outer corners.
fn draw_debug_layer(frame: &mut FrameRGBA, mesh: &LandmarkFrame, canvas: Canvas) {
    let color =
        Rgba8Premul::from_straight_rgba(DEBUG_GREEN[0], DEBUG_GREEN[1], DEBUG_GREEN[2], 255);
    let src = [color.r, color.g, color.b, color.a];

    let corners = [
        landmark::LEFT_EYE_OUTER,
        landmark::LEFT_EYE_INNER,
        landmark::RIGHT_EYE_INNER,
        landmark::RIGHT_EYE_OUTER,
    ];
    for index in corners {
        if let Some(p) = mesh.point_px(index, canvas) {
            fill_dot(frame, p, DEBUG_DOT_RADIUS, src);
        }
    }

    if let (Some(a), Some(b)) = (
        mesh.point_px(landmark::LEFT_EYE_OUTER, canvas),
        mesh.point_px(landmark::RIGHT_EYE_OUTER, canvas),
    ) {
        stroke_line(frame, a, b, src);
    }
}

fn fill_dot(frame: &mut FrameRGBA, center: Point, radius: i64, src: [u8; 4]) {
    let cx = center.x.round() as i64;
    let cy = center.y.round() as i64;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                blend_px(frame, cx + dx, cy + dy, src, DEBUG_OPACITY);
            }
        }
    }
}

fn stroke_line(frame: &mut FrameRGBA, a: Point, b: Point, src: [u8; 4]) {
    let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).round() as i64;
    if steps == 0 {
        blend_px(frame, a.x.round() as i64, a.y.round() as i64, src, DEBUG_OPACITY);
        return;
    }
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (a.x + (b.x - a.x) * t).round() as i64;
        let y = (a.y + (b.y - a.y) * t).round() as i64;
        blend_px(frame, x, y, src, DEBUG_OPACITY);
    }
}

fn blend_px(frame: &mut FrameRGBA, x: i64, y: i64, src: [u8; 4], opacity: f32) {
    if x < 0 || y < 0 || x >= i64::from(frame.width) || y >= i64::from(frame.height) {
        return;
    }
    let i = ((y as usize) * (frame.width as usize) + (x as usize)) * 4;
    let out = over(
        [
            frame.data[i],
            frame.data[i + 1],
            frame.data[i + 2],
            frame.data[i + 3],
        ],
        src,
        opacity,
    );
    frame.data[i..i + 4].copy_from_slice(&out);
}

// Premultiplied source-over blend of one pixel.
fn over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
