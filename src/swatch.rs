use crate::color::{rgb_to_hex, rgb_to_hsl, yiq_luma, Hsl};
use crate::filter::Filter;
use image::Rgb;
use std::fmt;
use std::hash::{Hash, Hasher};

const TITLE_TEXT_LUMA: f64 = 200.0;
const BODY_TEXT_LUMA: f64 = 150.0;
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// A representative color and the number of pixels it stands for.
///
/// Two swatches are equal when their colors are equal, whatever their
/// population.
#[derive(Clone, Debug)]
pub struct Swatch {
    rgb: Rgb<u8>,
    population: u32,
    hsl: Hsl,
    hex: String,
    yiq: f64,
}

impl Swatch {
    pub fn new(rgb: Rgb<u8>, population: u32) -> Self {
        Self {
            rgb,
            population,
            hsl: rgb_to_hsl(rgb),
            hex: rgb_to_hex(rgb),
            yiq: yiq_luma(rgb),
        }
    }

    #[inline]
    pub fn rgb(&self) -> Rgb<u8> {
        self.rgb
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.rgb[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.rgb[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.rgb[2]
    }

    #[inline]
    pub fn population(&self) -> u32 {
        self.population
    }

    #[inline]
    pub fn hsl(&self) -> Hsl {
        self.hsl
    }

    #[inline]
    pub fn hex(&self) -> &str {
        &self.hex
    }

    #[inline]
    pub fn yiq(&self) -> f64 {
        self.yiq
    }

    /// White or black, whichever reads better as title text on this color.
    pub fn title_text_color(&self) -> Rgb<u8> {
        if self.yiq < TITLE_TEXT_LUMA {
            WHITE
        } else {
            BLACK
        }
    }

    /// White or black, whichever reads better as body text on this color.
    pub fn body_text_color(&self) -> Rgb<u8> {
        if self.yiq < BODY_TEXT_LUMA {
            WHITE
        } else {
            BLACK
        }
    }
}

impl PartialEq for Swatch {
    fn eq(&self, other: &Self) -> bool {
        self.rgb == other.rgb
    }
}

impl Eq for Swatch {}

impl Hash for Swatch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rgb.0.hash(state);
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hex, self.population)
    }
}

/// Drops swatches whose color the filter rejects as an opaque pixel.
pub fn apply_filter(swatches: Vec<Swatch>, filter: &Filter) -> Vec<Swatch> {
    swatches
        .into_iter()
        .filter(|s| filter.is_allowed(s.r(), s.g(), s.b(), 255))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_population() {
        let a = Swatch::new(Rgb::from([10, 20, 30]), 5);
        let b = Swatch::new(Rgb::from([10, 20, 30]), 0);
        let c = Swatch::new(Rgb::from([10, 20, 31]), 5);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let set: HashSet<Swatch> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn derived_values() {
        let swatch = Swatch::new(Rgb::from([255, 0, 0]), 3);
        assert_eq!(swatch.hex(), "#FF0000");
        assert_eq!(swatch.hsl().l, 0.5);
        assert_eq!(swatch.to_string(), "#FF0000 (3)");
    }

    #[test]
    fn text_colors_follow_yiq() {
        let dark = Swatch::new(Rgb::from([20, 20, 20]), 1);
        assert_eq!(dark.title_text_color(), WHITE);
        assert_eq!(dark.body_text_color(), WHITE);

        let mid = Swatch::new(Rgb::from([170, 170, 170]), 1);
        assert_eq!(mid.title_text_color(), WHITE);
        assert_eq!(mid.body_text_color(), BLACK);

        let light = Swatch::new(Rgb::from([240, 240, 240]), 1);
        assert_eq!(light.title_text_color(), BLACK);
    }

    #[test]
    fn filter_treats_swatches_as_opaque() {
        let swatches = vec![
            Swatch::new(Rgb::from([255, 255, 255]), 4),
            Swatch::new(Rgb::from([12, 34, 56]), 2),
        ];
        let kept = apply_filter(swatches, &Filter::combine(&[Filter::default_filter()]));
        assert_eq!(kept, vec![Swatch::new(Rgb::from([12, 34, 56]), 2)]);
    }
}
