use serde::{Deserialize, Serialize};

/// Default fill for masks declared without a colour.
pub const DEFAULT_MASK_COLOR: &str = "black";

/// Rectangle by corners. Both corners are included: `x0..=x1` by `y0..=y1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Rectangle by size and top-left offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// A region overwritten on both sides before diffing. Page indexes are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskSpec {
    pub page_index: usize,
    pub rect: MaskRect,
    #[serde(default = "default_mask_color")]
    pub color: String,
}

impl MaskSpec {
    pub fn new(page_index: usize, rect: MaskRect, color: Option<&str>) -> Self {
        Self {
            page_index,
            rect,
            color: color.unwrap_or(DEFAULT_MASK_COLOR).to_owned(),
        }
    }
}

fn default_mask_color() -> String {
    DEFAULT_MASK_COLOR.to_owned()
}

/// A region diffed on its own, replacing the whole-page diff for its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    pub page_index: usize,
    pub rect: CropRect,
}

/// Page selection. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    pub only_page_indexes: Vec<usize>,
    pub skip_page_indexes: Vec<usize>,
}

/// Per-comparison options, never persisted in the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opts {
    #[serde(default)]
    pub masks: Vec<MaskSpec>,
    #[serde(default)]
    pub crops: Vec<CropSpec>,
    #[serde(default, flatten)]
    pub filter: PageFilter,
}

impl Opts {
    pub fn masks_for(&self, page_index: usize) -> impl Iterator<Item = &MaskSpec> {
        self.masks.iter().filter(move |m| m.page_index == page_index)
    }

    pub fn crops_for(&self, page_index: usize) -> impl Iterator<Item = &CropSpec> {
        self.crops.iter().filter(move |c| c.page_index == page_index)
    }
}

/// Parse `PAGE:X0,Y0,X1,Y1[:COLOR]`.
pub fn parse_mask(s: &str) -> Result<MaskSpec, String> {
    let mut parts = s.splitn(3, ':');
    let page = parse_page(parts.next(), s)?;
    let [x0, y0, x1, y1] = parse_quad(parts.next(), s)?;
    let color = parts.next().filter(|c| !c.is_empty());
    if x1 < x0 || y1 < y0 {
        return Err(format!("mask '{s}': x1/y1 must not be smaller than x0/y0"));
    }
    Ok(MaskSpec::new(page, MaskRect { x0, y0, x1, y1 }, color))
}

/// Parse `PAGE:WIDTH,HEIGHT,X,Y`.
pub fn parse_crop(s: &str) -> Result<CropSpec, String> {
    let mut parts = s.splitn(2, ':');
    let page = parse_page(parts.next(), s)?;
    let [width, height, x, y] = parse_quad(parts.next(), s)?;
    if width == 0 || height == 0 {
        return Err(format!("crop '{s}': width and height must be > 0"));
    }
    Ok(CropSpec {
        page_index: page,
        rect: CropRect { width, height, x, y },
    })
}

fn parse_page(part: Option<&str>, whole: &str) -> Result<usize, String> {
    part.unwrap_or_default()
        .trim()
        .parse()
        .map_err(|e| format!("'{whole}': invalid page index: {e}"))
}

fn parse_quad(part: Option<&str>, whole: &str) -> Result<[u32; 4], String> {
    let nums = part
        .ok_or_else(|| format!("'{whole}': missing coordinates"))?
        .split(',')
        .map(|n| n.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("'{whole}': invalid coordinate: {e}"))?;
    <[u32; 4]>::try_from(nums).map_err(|_| format!("'{whole}': expected four coordinates"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_defaults_to_black() {
        let m = parse_mask("1:10,20,30,40").unwrap();
        assert_eq!(m.page_index, 1);
        assert_eq!(
            m.rect,
            MaskRect {
                x0: 10,
                y0: 20,
                x1: 30,
                y1: 40
            }
        );
        assert_eq!(m.color, "black");
    }

    #[test]
    fn mask_with_hex_color() {
        let m = parse_mask("0:0,0,5,5:#ff0000").unwrap();
        assert_eq!(m.color, "#ff0000");
    }

    #[test]
    fn inverted_mask_rejected() {
        assert!(parse_mask("0:10,10,5,5").is_err());
    }

    #[test]
    fn crop_parses() {
        let c = parse_crop("2:100,50,10,20").unwrap();
        assert_eq!(c.page_index, 2);
        assert_eq!(
            c.rect,
            CropRect {
                width: 100,
                height: 50,
                x: 10,
                y: 20
            }
        );
    }

    #[test]
    fn malformed_specs_rejected() {
        assert!(parse_crop("x:1,2,3,4").is_err());
        assert!(parse_crop("0:1,2,3").is_err());
        assert!(parse_crop("0:0,5,0,0").is_err());
        assert!(parse_mask("0").is_err());
    }

    #[test]
    fn page_lookup_is_by_equality_in_order() {
        let opts = Opts {
            masks: vec![
                MaskSpec::new(0, MaskRect::default(), Some("red")),
                MaskSpec::new(1, MaskRect::default(), None),
                MaskSpec::new(0, MaskRect::default(), Some("blue")),
            ],
            ..Default::default()
        };
        let colors: Vec<&str> = opts.masks_for(0).map(|m| m.color.as_str()).collect();
        assert_eq!(colors, ["red", "blue"]);
        assert_eq!(opts.crops_for(0).count(), 0);
    }
}
