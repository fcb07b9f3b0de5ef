use std::io::Cursor;

use ab_glyph::{FontArc, PxScale};
use anyhow::Result;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops::FilterType};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut, text_size};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 300;
pub const AVATAR_SIZE: u32 = 100;
pub const AVATAR_CENTER: (i32, i32) = (125, 150);
pub const TEXT_X: i32 = 250;
/// Baseline of the greeting.
pub const TEXT_BASELINE: i32 = 160;
pub const MAX_TEXT_WIDTH: f32 = 500.0;
pub const START_FONT_SIZE: f32 = 40.0;
pub const MIN_FONT_SIZE: f32 = 20.0;
const FONT_STEP: f32 = 2.0;

const FALLBACK_BACKGROUND: Rgba<u8> = Rgba([0x23, 0x27, 0x2A, 0xFF]);
const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

pub fn welcome_text(username: &str) -> String {
    format!("Welcome, {}!", username)
}

/// Greeting posted to the welcome channel when someone joins the server.
pub fn join_greeting(mention: &str, guild_name: &str) -> String {
    format!(
        "🎉 Welcome {} to **{}**! Thanks for joining! 🚀",
        mention, guild_name
    )
}

/// Largest size from 40 down to 20, in steps of 2, whose measured width fits
/// 500px. Stops at 20 even if the text is still too wide.
pub fn fit_font_size(measure: impl Fn(f32) -> f32) -> f32 {
    let mut size = START_FONT_SIZE;
    while measure(size) > MAX_TEXT_WIDTH && size > MIN_FONT_SIZE {
        size -= FONT_STEP;
    }
    size
}

fn inside_avatar_circle(x: u32, y: u32) -> bool {
    let radius = AVATAR_SIZE as f32 / 2.0;
    let dx = x as f32 + 0.5 - radius;
    let dy = y as f32 + 0.5 - radius;
    dx * dx + dy * dy <= radius * radius
}

/// 800×300 greeting card: background, round avatar and the member's name.
pub fn compose_welcome_image(
    background: Option<&DynamicImage>,
    avatar: Option<&DynamicImage>,
    username: &str,
    font: Option<&FontArc>,
) -> Result<Vec<u8>> {
    let mut canvas = match background {
        Some(bg) => image::imageops::resize(&bg.to_rgba8(), WIDTH, HEIGHT, FilterType::Triangle),
        None => RgbaImage::from_pixel(WIDTH, HEIGHT, FALLBACK_BACKGROUND),
    };

    draw_filled_circle_mut(&mut canvas, AVATAR_CENTER, (AVATAR_SIZE / 2) as i32, WHITE);

    if let Some(avatar) = avatar {
        let avatar = avatar
            .resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle)
            .to_rgba8();
        let left = (AVATAR_CENTER.0 - (AVATAR_SIZE / 2) as i32) as u32;
        let top = (AVATAR_CENTER.1 - (AVATAR_SIZE / 2) as i32) as u32;

        for (x, y, pixel) in avatar.enumerate_pixels() {
            if inside_avatar_circle(x, y) {
                canvas.put_pixel(left + x, top + y, *pixel);
            }
        }
    }

    if let Some(font) = font {
        let text = welcome_text(username);
        let size = fit_font_size(|size| text_size(PxScale::from(size), font, &text).0 as f32);
        // imageproc positions text by its top edge.
        let top = TEXT_BASELINE - (size * 0.8) as i32;
        draw_text_mut(&mut canvas, WHITE, TEXT_X, top, PxScale::from(size), font, &text);
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_greeting_mentions_member_and_server() {
        assert_eq!(
            join_greeting("<@42>", "Pulse Traders"),
            "🎉 Welcome <@42> to **Pulse Traders**! Thanks for joining! 🚀"
        );
    }

    #[test]
    fn test_short_names_keep_the_largest_font() {
        let size = fit_font_size(|size| size * 5.0);
        assert_eq!(size, 40.0);
    }

    #[test]
    fn test_long_names_shrink_until_they_fit() {
        // Width 20px per point: fits at 24 (480px) but not at 26 (520px).
        let size = fit_font_size(|size| size * 20.0);
        assert_eq!(size, 24.0);
    }

    #[test]
    fn test_font_never_goes_below_minimum() {
        let size = fit_font_size(|size| size * 1000.0);
        assert_eq!(size, 20.0);
    }

    #[test]
    fn test_welcome_text() {
        assert_eq!(welcome_text("satoshi"), "Welcome, satoshi!");
    }

    #[test]
    fn test_compose_without_assets() {
        let png = compose_welcome_image(None, None, "satoshi", None).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(image.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(image.get_pixel(5, 5), &FALLBACK_BACKGROUND);
        assert_eq!(image.get_pixel(125, 150), &WHITE);
    }

    #[test]
    fn test_avatar_is_clipped_to_circle() {
        let red = Rgba([0xFF, 0x00, 0x00, 0xFF]);
        let avatar = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, red));
        let png = compose_welcome_image(None, Some(&avatar), "satoshi", None).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(image.get_pixel(125, 150), &red);
        // Corner of the avatar square lies outside the circle.
        assert_eq!(image.get_pixel(76, 101), &FALLBACK_BACKGROUND);
    }
}
