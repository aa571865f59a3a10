//! PNG screenshots of the simulated screen.

use super::layout::{Action, Tree, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::driver::Screenshot;
use crate::result::{ProbeError, ProbeResult};
use image::{ImageEncoder, Rgb, RgbImage};

/// Screenshots are rendered at half the logical resolution
pub const SCALE: f32 = 0.5;

const BACKGROUND: Rgb<u8> = Rgb([250, 250, 250]);
const BAR: Rgb<u8> = Rgb([52, 152, 219]);
const BUTTON: Rgb<u8> = Rgb([46, 204, 113]);
const FIELD: Rgb<u8> = Rgb([220, 220, 220]);
const TEXT: Rgb<u8> = Rgb([60, 60, 60]);
const MODAL: Rgb<u8> = Rgb([255, 255, 255]);

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn fill(img: &mut RgbImage, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
    let x0 = (x * SCALE).max(0.0) as u32;
    let y0 = (y * SCALE).max(0.0) as u32;
    let x1 = (((x + w) * SCALE).max(0.0) as u32).min(img.width());
    let y1 = (((y + h) * SCALE).max(0.0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

/// Paint every visible element as a flat block and encode the result
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn screenshot(tree: &Tree) -> ProbeResult<Screenshot> {
    let width = (VIEWPORT_WIDTH * SCALE) as u32;
    let height = (VIEWPORT_HEIGHT * SCALE) as u32;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    // modal nodes come first in document order but paint on top
    let (modal, base): (Vec<_>, Vec<_>) = tree.nodes.iter().partition(|n| n.modal);
    for node in base.into_iter().chain(modal) {
        let e = &node.element;
        if !e.visible {
            continue;
        }
        let color = match (&node.action, e.class.as_str()) {
            (Action::GoHome | Action::OpenCart, _) => BAR,
            (_, "Button") => BUTTON,
            (Action::Edit(_), _) => FIELD,
            _ if node.modal => MODAL,
            (_, _) if e.text.is_empty() => continue,
            _ => TEXT,
        };
        fill(&mut img, e.rect.x, e.rect.y, e.rect.width, e.rect.height, color);
    }

    let mut data = Vec::new();
    image::codecs::png::PngEncoder::new(&mut data)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| ProbeError::Screenshot {
            message: format!("Failed to encode screenshot: {e}"),
        })?;
    Ok(Screenshot::new(data, width, height))
}
