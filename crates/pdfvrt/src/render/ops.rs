//! Pixel-level mask and crop, plus the colour and crop checks every engine shares.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use super::RasterError;
use crate::opts::{CropRect, MaskRect};
use crate::store;

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("gainsboro", [220, 220, 220]),
    ("whitesmoke", [245, 245, 245]),
    ("silver", [192, 192, 192]),
    ("maroon", [128, 0, 0]),
    ("darkred", [139, 0, 0]),
    ("crimson", [220, 20, 60]),
    ("tomato", [255, 99, 71]),
    ("coral", [255, 127, 80]),
    ("salmon", [250, 128, 114]),
    ("olive", [128, 128, 0]),
    ("navy", [0, 0, 128]),
    ("darkblue", [0, 0, 139]),
    ("skyblue", [135, 206, 235]),
    ("lightblue", [173, 216, 230]),
    ("purple", [128, 0, 128]),
    ("indigo", [75, 0, 130]),
    ("violet", [238, 130, 238]),
    ("teal", [0, 128, 128]),
    ("turquoise", [64, 224, 208]),
    ("darkgreen", [0, 100, 0]),
    ("lightgreen", [144, 238, 144]),
    ("orange", [255, 165, 0]),
    ("gold", [255, 215, 0]),
    ("khaki", [240, 230, 140]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("chocolate", [210, 105, 30]),
    ("tan", [210, 180, 140]),
    ("beige", [245, 245, 220]),
    ("ivory", [255, 255, 240]),
    ("lavender", [230, 230, 250]),
];

/// Parse a mask colour into an opaque pixel.
///
/// Accepts colour names, `grayN`/`greyN` (N in 0..=100), `#rgb`, `#rrggbb`
/// and `rgb(r, g, b)`. Masks are opaque, so `transparent` is rejected.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, RasterError> {
    let lower = s.trim().to_ascii_lowercase();
    let bad = || RasterError::Color(s.into());

    if let Some(hex) = lower.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| bad());
        return match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    rgb[i] = channel(&c.to_string().repeat(2))?;
                }
                Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
            }
            6 => Ok(Rgba([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            ])),
            _ => Err(bad()),
        };
    }

    if let Some(args) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels = args
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad())?;
        let [r, g, b] = channels[..] else {
            return Err(bad());
        };
        return Ok(Rgba([r, g, b, 255]));
    }

    if let Some(level) = lower
        .strip_prefix("gray")
        .or_else(|| lower.strip_prefix("grey"))
        .filter(|n| !n.is_empty())
    {
        let percent: u32 = level.parse().map_err(|_| bad())?;
        if percent > 100 {
            return Err(bad());
        }
        let v = ((percent * 255 + 50) / 100) as u8;
        return Ok(Rgba([v, v, v, 255]));
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, [r, g, b])| Rgba([*r, *g, *b, 255]))
        .ok_or_else(bad)
}

/// `#rrggbb` form of an opaque pixel, as external tools expect it.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Fill `rect` (both corners included) with `color`, clamped to the image.
/// Inverted rectangles and rectangles starting off the image are a no-op.
pub fn fill_rect(img: &mut RgbaImage, rect: MaskRect, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    if rect.x1 < rect.x0 || rect.y1 < rect.y0 || rect.x0 >= w || rect.y0 >= h {
        return;
    }
    let x1 = rect.x1.min(w - 1);
    let y1 = rect.y1.min(h - 1);
    let area = Rect::at(rect.x0 as i32, rect.y0 as i32)
        .of_size(x1 - rect.x0 + 1, y1 - rect.y0 + 1);
    draw_filled_rect_mut(img, area, color);
}

/// Reject crops that do not overlap a `width x height` page.
/// Regions running past the right or bottom edge are clamped, not rejected.
pub fn check_crop(rect: CropRect, (w, h): (u32, u32)) -> Result<(), RasterError> {
    if rect.x >= w || rect.y >= h || rect.width == 0 || rect.height == 0 {
        return Err(RasterError::OutOfBounds(
            format!("{}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y),
            w,
            h,
        ));
    }
    Ok(())
}

/// Copy out `rect`, clamped to the image. A region with no overlap is an error.
pub fn crop(img: &RgbaImage, rect: CropRect) -> Result<RgbaImage, RasterError> {
    check_crop(rect, img.dimensions())?;
    Ok(image::imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image())
}

/// Pixel size of a PNG on disk, read from its header.
pub fn dimensions(path: &Path) -> Result<(u32, u32), RasterError> {
    image::image_dimensions(path).map_err(|e| RasterError::image(path, e))
}

pub fn load(path: &Path) -> Result<RgbaImage, RasterError> {
    Ok(image::open(path)
        .map_err(|e| RasterError::image(path, e))?
        .to_rgba8())
}

pub fn save(img: &RgbaImage, path: &Path) -> Result<(), RasterError> {
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| RasterError::image(path, e))
}

/// Mask a PNG on disk in place.
pub fn mask_file(path: &Path, rect: MaskRect, color: Rgba<u8>) -> Result<(), RasterError> {
    let mut img = load(path)?;
    fill_rect(&mut img, rect, color);
    save(&img, path)
}

/// Crop a PNG on disk into its `<stem>-<ordinal>.png` sibling.
pub fn crop_file(path: &Path, rect: CropRect, ordinal: usize) -> Result<PathBuf, RasterError> {
    let img = load(path)?;
    let out = store::crop_path(path, ordinal);
    save(&crop(&img, rect)?, &out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(parse_color("black").unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_color("Grey").unwrap(), Rgba([128, 128, 128, 255]));
        assert_eq!(parse_color("#0a0B0c").unwrap(), Rgba([10, 11, 12, 255]));
        assert_eq!(parse_color("#f00").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(parse_color("gold").unwrap(), Rgba([255, 215, 0, 255]));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn parses_rgb_and_gray_levels() {
        assert_eq!(parse_color("rgb(0, 10,255)").unwrap(), Rgba([0, 10, 255, 255]));
        assert_eq!(parse_color("gray50").unwrap(), Rgba([128, 128, 128, 255]));
        assert_eq!(parse_color("grey0").unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_color("gray100").unwrap(), Rgba([255, 255, 255, 255]));
        assert!(parse_color("gray101").is_err());
        assert!(parse_color("rgb(1,2)").is_err());
        assert!(parse_color("rgb(1,2,300)").is_err());
        assert!(parse_color("transparent").is_err());
    }

    #[test]
    fn hex_round_trips_through_parse() {
        let gold = parse_color("gold").unwrap();
        assert_eq!(to_hex(gold), "#ffd700");
        assert_eq!(parse_color(&to_hex(gold)).unwrap(), gold);
    }

    #[test]
    fn fill_includes_both_corners() {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        fill_rect(
            &mut img,
            MaskRect {
                x0: 2,
                y0: 3,
                x1: 5,
                y1: 6,
            },
            Rgba([0, 0, 0, 255]),
        );
        let black = img.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        assert_eq!(black, 16);
        assert_eq!(*img.get_pixel(2, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(5, 6), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(6, 6), WHITE);
        assert_eq!(*img.get_pixel(5, 7), WHITE);
    }

    #[test]
    fn fill_clamps_and_ignores_inverted() {
        let mut img = RgbaImage::from_pixel(4, 4, WHITE);
        let inverted = MaskRect {
            x0: 3,
            y0: 0,
            x1: 1,
            y1: 3,
        };
        fill_rect(&mut img, inverted, Rgba([0, 0, 0, 255]));
        assert!(img.pixels().all(|p| *p == WHITE));

        fill_rect(&mut img, MaskRect::default(), Rgba([0, 0, 0, 255]));
        assert_eq!(img.pixels().filter(|p| **p != WHITE).count(), 1);
        img.put_pixel(0, 0, WHITE);

        fill_rect(
            &mut img,
            MaskRect {
                x0: 2,
                y0: 2,
                x1: 100,
                y1: 100,
            },
            Rgba([0, 0, 0, 255]),
        );
        assert_eq!(img.pixels().filter(|p| **p != WHITE).count(), 4);
    }

    #[test]
    fn crop_extracts_region() {
        let mut img = RgbaImage::from_pixel(20, 10, WHITE);
        img.put_pixel(12, 4, Rgba([1, 2, 3, 255]));
        let out = crop(
            &img,
            CropRect {
                width: 5,
                height: 5,
                x: 10,
                y: 2,
            },
        )
        .unwrap();
        assert_eq!(out.dimensions(), (5, 5));
        assert_eq!(*out.get_pixel(2, 2), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn crop_outside_page_fails() {
        let img = RgbaImage::from_pixel(20, 10, WHITE);
        let err = crop(
            &img,
            CropRect {
                width: 5,
                height: 5,
                x: 30,
                y: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, RasterError::OutOfBounds(_, 20, 10)));
    }

    #[test]
    fn file_ops_keep_source_for_crops() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("doc-0.png");
        save(&RgbaImage::from_pixel(8, 8, WHITE), &page).unwrap();

        mask_file(
            &page,
            MaskRect {
                x0: 0,
                y0: 0,
                x1: 1,
                y1: 1,
            },
            Rgba([255, 0, 0, 255]),
        )
        .unwrap();
        let masked = load(&page).unwrap();
        assert_eq!(*masked.get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*masked.get_pixel(2, 2), WHITE);

        let cropped = crop_file(
            &page,
            CropRect {
                width: 4,
                height: 3,
                x: 0,
                y: 0,
            },
            1,
        )
        .unwrap();
        assert_eq!(cropped, dir.path().join("doc-0-1.png"));
        assert_eq!(load(&cropped).unwrap().dimensions(), (4, 3));
        assert_eq!(load(&page).unwrap().dimensions(), (8, 8));
    }
}
