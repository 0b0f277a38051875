use crate::color::{hsl_to_rgb, Hsl};
use crate::palette::{Palette, Role};
use crate::swatch::Swatch;
use tracing::{debug, trace};

/// Turns quantized swatches into a palette.
pub trait Generator: Send + Sync {
    fn generate(&self, swatches: &[Swatch]) -> Palette;
}

/// How empty slots are synthesized after selection.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackMode {
    /// Matches palettes produced by established vibrant extractors: a light muted
    /// swatch is derived into the dark vibrant slot, and the muted family is
    /// derived with the muted saturation target used as lightness.
    #[default]
    Reference,
    /// Light vibrant is derived from light muted, and muted slots use the
    /// matching lightness target with the muted saturation target.
    Corrected,
}

/// Lightness and saturation targets and scoring weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorOptions {
    pub target_dark_luma: f64,
    pub max_dark_luma: f64,
    pub min_light_luma: f64,
    pub target_light_luma: f64,
    pub min_normal_luma: f64,
    pub target_normal_luma: f64,
    pub max_normal_luma: f64,
    pub target_muted_saturation: f64,
    pub max_muted_saturation: f64,
    pub target_vibrant_saturation: f64,
    pub min_vibrant_saturation: f64,
    pub weight_saturation: f64,
    pub weight_luma: f64,
    pub weight_population: f64,
    pub fallback: FallbackMode,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            target_dark_luma: 0.26,
            max_dark_luma: 0.45,
            min_light_luma: 0.55,
            target_light_luma: 0.74,
            min_normal_luma: 0.3,
            target_normal_luma: 0.5,
            max_normal_luma: 0.7,
            target_muted_saturation: 0.3,
            max_muted_saturation: 0.4,
            target_vibrant_saturation: 1.0,
            min_vibrant_saturation: 0.35,
            weight_saturation: 3.0,
            weight_luma: 6.5,
            weight_population: 0.5,
            fallback: FallbackMode::Reference,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Window {
    min: f64,
    target: f64,
    max: f64,
}

impl Window {
    #[inline]
    fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Clone, Copy, Debug)]
struct Profile {
    luma: Window,
    saturation: Window,
}

impl GeneratorOptions {
    fn normal_luma(&self) -> Window {
        Window {
            min: self.min_normal_luma,
            target: self.target_normal_luma,
            max: self.max_normal_luma,
        }
    }

    fn light_luma(&self) -> Window {
        Window {
            min: self.min_light_luma,
            target: self.target_light_luma,
            max: 1.0,
        }
    }

    fn dark_luma(&self) -> Window {
        Window {
            min: 0.0,
            target: self.target_dark_luma,
            max: self.max_dark_luma,
        }
    }

    fn vibrant_saturation(&self) -> Window {
        Window {
            min: self.min_vibrant_saturation,
            target: self.target_vibrant_saturation,
            max: 1.0,
        }
    }

    fn muted_saturation(&self) -> Window {
        Window {
            min: 0.0,
            target: self.target_muted_saturation,
            max: self.max_muted_saturation,
        }
    }

    fn profile(&self, role: Role) -> Profile {
        let (luma, saturation) = match role {
            Role::Vibrant => (self.normal_luma(), self.vibrant_saturation()),
            Role::LightVibrant => (self.light_luma(), self.vibrant_saturation()),
            Role::DarkVibrant => (self.dark_luma(), self.vibrant_saturation()),
            Role::Muted => (self.normal_luma(), self.muted_saturation()),
            Role::LightMuted => (self.light_luma(), self.muted_saturation()),
            Role::DarkMuted => (self.dark_luma(), self.muted_saturation()),
        };
        Profile { luma, saturation }
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct DefaultGenerator {
    options: GeneratorOptions,
}

impl DefaultGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn score(&self, swatch: &Swatch, profile: &Profile, max_population: u32) -> f64 {
        let opts = &self.options;
        let hsl = swatch.hsl();
        let population = if max_population > 0 {
            swatch.population() as f64 / max_population as f64
        } else {
            0.0
        };
        weighted_mean(&[
            (
                1.0 - (hsl.s - profile.saturation.target).abs(),
                opts.weight_saturation,
            ),
            (1.0 - (hsl.l - profile.luma.target).abs(), opts.weight_luma),
            (population, opts.weight_population),
        ])
    }

    /// Best scoring swatch inside the role's windows that no slot holds yet.
    fn find_variation<'s>(
        &self,
        palette: &Palette,
        swatches: &'s [Swatch],
        role: Role,
        max_population: u32,
    ) -> Option<&'s Swatch> {
        let profile = self.options.profile(role);
        let mut best: Option<(&Swatch, f64)> = None;
        for swatch in swatches {
            let hsl = swatch.hsl();
            if !profile.saturation.contains(hsl.s)
                || !profile.luma.contains(hsl.l)
                || palette.contains(swatch)
            {
                continue;
            }
            let value = self.score(swatch, &profile, max_population);
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((swatch, value));
            }
        }
        best.map(|(swatch, _)| swatch)
    }

    fn select(&self, swatches: &[Swatch]) -> Palette {
        let max_population = swatches.iter().map(Swatch::population).max().unwrap_or(0);
        let mut palette = Palette::default();
        for role in Role::ALL {
            if let Some(swatch) = self.find_variation(&palette, swatches, role, max_population) {
                trace!(%role, swatch = %swatch, "role selected");
                palette.set(role, swatch.clone());
            }
        }
        palette
    }

    fn derive(&self, palette: &mut Palette, from: Role, to: Role, lightness: f64) {
        if let Some(source) = palette.get(from) {
            let rgb = hsl_to_rgb(source.hsl().with_lightness(lightness));
            let swatch = Swatch::new(rgb, 0);
            trace!(%from, %to, swatch = %swatch, "role synthesized");
            palette.set(to, swatch);
        }
    }

    fn fill_empty(&self, palette: &mut Palette) {
        let opts = &self.options;
        let corrected = opts.fallback == FallbackMode::Corrected;
        let is_empty = |palette: &Palette, role| palette.get(role).is_none();

        if is_empty(palette, Role::Vibrant)
            && is_empty(palette, Role::DarkVibrant)
            && is_empty(palette, Role::LightVibrant)
        {
            self.derive(palette, Role::DarkMuted, Role::DarkVibrant, opts.target_dark_luma);
            if corrected {
                self.derive(palette, Role::LightMuted, Role::LightVibrant, opts.target_light_luma);
            } else {
                self.derive(palette, Role::LightMuted, Role::DarkVibrant, opts.target_dark_luma);
            }
        }

        if is_empty(palette, Role::Vibrant) {
            let from = if is_empty(palette, Role::DarkVibrant) {
                Role::LightVibrant
            } else {
                Role::DarkVibrant
            };
            self.derive(palette, from, Role::Vibrant, opts.target_normal_luma);
        }
        if is_empty(palette, Role::DarkVibrant) {
            self.derive(palette, Role::Vibrant, Role::DarkVibrant, opts.target_dark_luma);
        }
        if is_empty(palette, Role::LightVibrant) {
            self.derive(palette, Role::Vibrant, Role::LightVibrant, opts.target_light_luma);
        }

        let muted = [
            (Role::Vibrant, Role::Muted, opts.target_normal_luma),
            (Role::DarkVibrant, Role::DarkMuted, opts.target_dark_luma),
            (Role::LightVibrant, Role::LightMuted, opts.target_light_luma),
        ];
        for (from, to, luma) in muted {
            if !is_empty(palette, to) {
                continue;
            }
            if corrected {
                self.derive_muted(palette, from, to, luma);
            } else {
                self.derive(palette, from, to, opts.target_muted_saturation);
            }
        }
    }

    fn derive_muted(&self, palette: &mut Palette, from: Role, to: Role, lightness: f64) {
        if let Some(source) = palette.get(from) {
            let hsl = source.hsl().with_lightness(lightness);
            let hsl = Hsl {
                s: self.options.target_muted_saturation,
                ..hsl
            };
            let swatch = Swatch::new(hsl_to_rgb(hsl), 0);
            trace!(%from, %to, swatch = %swatch, "role synthesized");
            palette.set(to, swatch);
        }
    }
}

impl Generator for DefaultGenerator {
    fn generate(&self, swatches: &[Swatch]) -> Palette {
        let mut palette = self.select(swatches);
        let selected = palette.iter().count();
        self.fill_empty(&mut palette);
        debug!(
            swatches = swatches.len(),
            selected,
            synthesized = palette.iter().count() - selected,
            "palette generated"
        );
        palette
    }
}

fn weighted_mean(values: &[(f64, f64)]) -> f64 {
    let (sum, weight_sum) = values
        .iter()
        .fold((0.0, 0.0), |(sum, weights), &(value, weight)| {
            (sum + value * weight, weights + weight)
        });
    sum / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::rgb_to_hsl;
    use image::Rgb;

    fn swatch(rgb: [u8; 3], population: u32) -> Swatch {
        Swatch::new(Rgb::from(rgb), population)
    }

    fn from_hsl(h: f64, s: f64, l: f64, population: u32) -> Swatch {
        Swatch::new(hsl_to_rgb(Hsl::new(h, s, l)), population)
    }

    #[test]
    fn weighted_mean_of_pairs() {
        assert_eq!(weighted_mean(&[(1.0, 1.0), (0.0, 3.0)]), 0.25);
    }

    #[test]
    fn empty_input_gives_empty_palette() {
        let palette = DefaultGenerator::default().generate(&[]);
        assert!(palette.is_empty());
    }

    #[test]
    fn red_beats_blue_on_population() {
        let swatches = [swatch([255, 0, 0], 3), swatch([0, 0, 255], 1)];
        let palette = DefaultGenerator::default().generate(&swatches);
        assert_eq!(palette.vibrant(), Some(&swatches[0]));
        assert_eq!(palette.vibrant().unwrap().population(), 3);
    }

    #[test]
    fn first_seen_wins_ties() {
        let swatches = [swatch([0, 0, 255], 2), swatch([255, 0, 0], 2)];
        let palette = DefaultGenerator::default().generate(&swatches);
        assert_eq!(palette.vibrant(), Some(&swatches[0]));
    }

    #[test]
    fn every_role_from_matching_swatches() {
        let swatches = [
            from_hsl(0.0, 0.9, 0.5, 10),
            from_hsl(0.3, 0.9, 0.75, 10),
            from_hsl(0.6, 0.9, 0.25, 10),
            from_hsl(0.1, 0.3, 0.5, 10),
            from_hsl(0.4, 0.3, 0.75, 10),
            from_hsl(0.7, 0.3, 0.25, 10),
        ];
        let palette = DefaultGenerator::default().generate(&swatches);
        for (role, expected) in Role::ALL.into_iter().zip(&swatches) {
            assert_eq!(palette.get(role), Some(expected), "{role}");
        }
    }

    #[test]
    fn selected_swatches_are_not_reused() {
        let swatches = [from_hsl(0.0, 0.9, 0.56, 10)];
        let palette = DefaultGenerator::default().select(&swatches);
        assert_eq!(palette.vibrant(), Some(&swatches[0]));
        assert_eq!(palette.light_vibrant(), None);
    }

    #[test]
    fn reference_fallback_from_vibrant() {
        let generator = DefaultGenerator::default();
        let red = swatch([255, 0, 0], 3);
        let palette = generator.generate(&[red.clone()]);
        let hsl = rgb_to_hsl(red.rgb());

        assert_eq!(palette.vibrant(), Some(&red));
        assert_eq!(
            palette.dark_vibrant().unwrap().rgb(),
            hsl_to_rgb(hsl.with_lightness(0.26))
        );
        assert_eq!(
            palette.light_vibrant().unwrap().rgb(),
            hsl_to_rgb(hsl.with_lightness(0.74))
        );
        let muted = hsl_to_rgb(hsl.with_lightness(0.3));
        assert_eq!(palette.muted().unwrap().rgb(), muted);
        assert_eq!(palette.dark_muted().unwrap().rgb(), muted);
        assert_eq!(palette.light_muted().unwrap().rgb(), muted);
        assert!(palette
            .iter()
            .filter(|(role, _)| *role != Role::Vibrant)
            .all(|(_, s)| s.population() == 0));
    }

    #[test]
    fn reference_fallback_writes_light_muted_into_dark_vibrant() {
        let light_muted = from_hsl(0.5, 0.2, 0.8, 5);
        let palette = DefaultGenerator::default().generate(&[light_muted.clone()]);
        let expected = hsl_to_rgb(light_muted.hsl().with_lightness(0.26));

        assert_eq!(palette.light_muted(), Some(&light_muted));
        assert_eq!(palette.dark_vibrant().unwrap().rgb(), expected);
        assert!(palette.vibrant().is_some());
    }

    #[test]
    fn reference_fallback_light_muted_wins_dark_vibrant() {
        let dark_muted = from_hsl(0.7, 0.3, 0.25, 5);
        let light_muted = from_hsl(0.1, 0.2, 0.8, 5);
        let palette =
            DefaultGenerator::default().generate(&[dark_muted.clone(), light_muted.clone()]);

        assert_eq!(palette.dark_muted(), Some(&dark_muted));
        assert_eq!(palette.light_muted(), Some(&light_muted));
        let from_light = hsl_to_rgb(light_muted.hsl().with_lightness(0.26));
        let from_dark = hsl_to_rgb(dark_muted.hsl().with_lightness(0.26));
        assert_ne!(from_light, from_dark);
        assert_eq!(palette.dark_vibrant().unwrap().rgb(), from_light);
        assert!(palette.light_vibrant().is_some());
    }

    #[test]
    fn corrected_fallback_muted_family() {
        let generator = DefaultGenerator::new(GeneratorOptions {
            fallback: FallbackMode::Corrected,
            ..Default::default()
        });
        let red = swatch([255, 0, 0], 3);
        let palette = generator.generate(&[red.clone()]);

        for (role, luma) in [
            (Role::Muted, 0.5),
            (Role::DarkMuted, 0.26),
            (Role::LightMuted, 0.74),
        ] {
            let hsl = palette.get(role).unwrap().hsl();
            assert!((hsl.l - luma).abs() < 0.01, "{role}: {hsl:?}");
            assert!((hsl.s - 0.3).abs() < 0.02, "{role}: {hsl:?}");
            assert!(hsl.h.abs() < 1e-9, "{role}: {hsl:?}");
        }
        assert_ne!(palette.dark_muted(), palette.light_muted());
        assert_ne!(palette.muted(), palette.dark_muted());
    }

    #[test]
    fn corrected_fallback() {
        let generator = DefaultGenerator::new(GeneratorOptions {
            fallback: FallbackMode::Corrected,
            ..Default::default()
        });
        let light_muted = from_hsl(0.5, 0.2, 0.8, 5);
        let palette = generator.generate(&[light_muted.clone()]);
        let hsl = light_muted.hsl();

        assert_eq!(palette.light_muted(), Some(&light_muted));
        assert_eq!(
            palette.light_vibrant().unwrap().rgb(),
            hsl_to_rgb(hsl.with_lightness(0.74))
        );
        let vibrant = palette.vibrant().unwrap().hsl();
        assert!((vibrant.l - 0.5).abs() < 0.01);
        assert!((vibrant.h - hsl.h).abs() < 0.02);
        let dark_vibrant = palette.dark_vibrant().unwrap().hsl();
        assert!((dark_vibrant.l - 0.26).abs() < 0.01);

        let muted = palette.muted().unwrap().hsl();
        assert!((muted.l - 0.5).abs() < 0.02);
        assert!((muted.s - 0.3).abs() < 0.05);
    }

    #[test]
    fn grey_fills_only_muted() {
        let grey = swatch([128, 128, 128], 1);
        let generator = DefaultGenerator::default();
        let palette = generator.generate(&[grey.clone()]);
        assert_eq!(palette.muted(), Some(&grey));
        assert_eq!(palette.vibrant(), None);
        assert_eq!(palette.dark_vibrant(), None);
        assert_eq!(palette.light_vibrant(), None);
    }
}
