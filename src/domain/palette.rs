//! Palette - velocity magnitude to color
//!
//! Stops are spread evenly over [0, 1] and linearly interpolated.
//! Invariant: at least two stops (a single color is duplicated, an empty
//! list becomes white-to-white).

use crate::error::PaletteError;

/// Number of entries in the precomputed lookup table
pub const LUT_SIZE: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    #[inline]
    pub fn to_u8(self) -> [u8; 3] {
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Parse `#rgb` or `#rrggbb` (leading `#` optional)
pub fn parse_hex(input: &str) -> Result<Rgb, PaletteError> {
    let hex = input.trim().trim_start_matches('#');
    let full: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(PaletteError::BadColor(input.to_string())),
    };
    let n = u32::from_str_radix(&full, 16).map_err(|_| PaletteError::BadColor(input.to_string()))?;
    Ok(Rgb {
        r: ((n >> 16) & 0xFF) as f32 / 255.0,
        g: ((n >> 8) & 0xFF) as f32 / 255.0,
        b: (n & 0xFF) as f32 / 255.0,
    })
}

#[derive(Clone, Debug)]
pub struct Palette {
    stops: Vec<Rgb>,
    lut: Vec<[u8; 3]>,
}

impl Palette {
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> Result<Self, PaletteError> {
        let stops = colors
            .iter()
            .map(|c| parse_hex(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_stops(stops))
    }

    pub fn from_stops(mut stops: Vec<Rgb>) -> Self {
        match stops.len() {
            0 => stops = vec![Rgb::WHITE, Rgb::WHITE],
            1 => stops.push(stops[0]),
            _ => {}
        }
        let mut palette = Self { stops, lut: Vec::new() };
        palette.lut = (0..LUT_SIZE)
            .map(|i| palette.sample(i as f32 / (LUT_SIZE - 1) as f32).to_u8())
            .collect();
        palette
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Index of the segment `t` falls in and the local blend factor
    #[inline]
    pub fn segment(&self, t: f32) -> (usize, f32) {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let k = (pos.floor() as usize).min(self.stops.len() - 2);
        (k, pos - k as f32)
    }

    /// Exact interpolated color for magnitude `t`
    pub fn sample(&self, t: f32) -> Rgb {
        let (k, f) = self.segment(t);
        self.stops[k].lerp(self.stops[k + 1], f)
    }

    /// Quantized lookup, what the colorize stage uses per cell
    #[inline]
    pub fn lookup(&self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.lut[(t * (LUT_SIZE - 1) as f32).round() as usize]
    }

    pub fn lut(&self) -> &[[u8; 3]] {
        &self.lut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_hex("#fff").unwrap(), Rgb::WHITE);
        let c = parse_hex("#5227FF").unwrap().to_u8();
        assert_eq!(c, [0x52, 0x27, 0xFF]);
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("zzzzzz").is_err());
    }

    #[test]
    fn single_color_is_duplicated() {
        let p = Palette::from_hex(&["#ff0000"]).unwrap();
        assert_eq!(p.stops().len(), 2);
        assert_eq!(p.sample(0.0), p.sample(1.0));
    }

    #[test]
    fn empty_palette_is_white() {
        let p = Palette::from_stops(Vec::new());
        assert_eq!(p.stops().len(), 2);
        assert_eq!(p.lookup(0.5), [255, 255, 255]);
    }

    #[test]
    fn hits_stops_exactly() {
        let p = Palette::from_hex(&["#000000", "#ff0000", "#ffffff"]).unwrap();
        assert_eq!(p.sample(0.0).to_u8(), [0, 0, 0]);
        assert_eq!(p.sample(0.5).to_u8(), [255, 0, 0]);
        assert_eq!(p.sample(1.0).to_u8(), [255, 255, 255]);
        assert_eq!(p.lut().len(), LUT_SIZE);
    }
}
