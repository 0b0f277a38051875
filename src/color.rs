use image::Rgb;
use std::fmt;

/// Hue, saturation and lightness, each in `0.0..=1.0`.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    #[inline]
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Same hue and saturation, different lightness.
    #[inline]
    pub fn with_lightness(self, l: f64) -> Self {
        Self { l, ..self }
    }
}

pub fn rgb_to_hsl(rgb: Rgb<u8>) -> Hsl {
    let [r, g, b] = rgb.0.map(|c| c as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return Hsl::new(0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    Hsl::new(h / 6.0, s, l)
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Channels are truncated, not rounded, when scaled back to 8 bits.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb<u8> {
    let Hsl { h, s, l } = hsl;
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };
    Rgb::from([r, g, b].map(|c| (c * 255.0) as u8))
}

pub fn rgb_to_hex(rgb: Rgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// YIQ luma on the 0..=255 scale.
pub fn yiq_luma(rgb: Rgb<u8>) -> f64 {
    let weighted = rgb[0] as u32 * 299 + rgb[1] as u32 * 587 + rgb[2] as u32 * 114;
    weighted as f64 / 1000.0
}

/// Parses `#RRGGBB` or `RRGGBB`, in either case.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb<u8>> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb::from([channel(0)?, channel(2)?, channel(4)?]))
}

/// CIE XYZ under D65, scaled so white has `y == 100`.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// CIE L*a*b* with `l` in `0.0..=100.0`.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

const D65_WHITE: Xyz = Xyz {
    x: 95.047,
    y: 100.0,
    z: 108.883,
};

pub fn rgb_to_xyz(rgb: Rgb<u8>) -> Xyz {
    let [r, g, b] = rgb.0.map(|c| {
        let c = c as f64 / 255.0;
        let linear = if c > 0.04045 {
            ((c + 0.055) / 1.055).powf(2.4)
        } else {
            c / 12.92
        };
        linear * 100.0
    });
    Xyz {
        x: r * 0.4124 + g * 0.3576 + b * 0.1805,
        y: r * 0.2126 + g * 0.7152 + b * 0.0722,
        z: r * 0.0193 + g * 0.1192 + b * 0.9505,
    }
}

pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let f = |t: f64| {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };
    let x = f(xyz.x / D65_WHITE.x);
    let y = f(xyz.y / D65_WHITE.y);
    let z = f(xyz.z / D65_WHITE.z);
    Lab {
        l: 116.0 * y - 16.0,
        a: 500.0 * (x - y),
        b: 200.0 * (y - z),
    }
}

#[inline]
pub fn rgb_to_lab(rgb: Rgb<u8>) -> Lab {
    xyz_to_lab(rgb_to_xyz(rgb))
}

/// CIE94 color difference with unit weights, `lab1` taken as the reference.
pub fn delta_e94(lab1: Lab, lab2: Lab) -> f64 {
    const WEIGHT_L: f64 = 1.0;
    const WEIGHT_C: f64 = 1.0;
    const WEIGHT_H: f64 = 1.0;

    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let dl = lab2.l - lab1.l;
    let dc = c2 - c1;
    let de = ((lab1.l - lab2.l).powi(2) + (lab1.a - lab2.a).powi(2) + (lab1.b - lab2.b).powi(2))
        .sqrt();
    let dh = if de.sqrt() > dl.abs().sqrt() + dc.abs().sqrt() {
        (de * de - dl * dl - dc * dc).max(0.0).sqrt()
    } else {
        0.0
    };

    let sc = 1.0 + 0.045 * c1;
    let sh = 1.0 + 0.015 * c1;
    let dl = dl / WEIGHT_L;
    let dc = dc / (WEIGHT_C * sc);
    let dh = dh / (WEIGHT_H * sh);
    (dl * dl + dc * dc + dh * dh).sqrt()
}

pub fn rgb_diff(rgb1: Rgb<u8>, rgb2: Rgb<u8>) -> f64 {
    delta_e94(rgb_to_lab(rgb1), rgb_to_lab(rgb2))
}

/// ΔE94 between two hex colors, `None` if either fails to parse.
pub fn hex_diff(hex1: &str, hex2: &str) -> Option<f64> {
    Some(rgb_diff(hex_to_rgb(hex1)?, hex_to_rgb(hex2)?))
}

/// How perceptible a ΔE94 difference is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffStatus {
    NotApplicable,
    /// Not perceptible by human eyes.
    Perfect,
    /// Perceptible through close observation.
    Close,
    /// Perceptible at a glance.
    Good,
    /// More similar than opposite.
    Similar,
    Wrong,
}

impl DiffStatus {
    /// Buckets the whole part of `delta`.
    pub fn from_delta(delta: f64) -> Self {
        let d = delta.trunc();
        if d.is_nan() || d < 0.0 {
            DiffStatus::NotApplicable
        } else if d <= 1.0 {
            DiffStatus::Perfect
        } else if d <= 2.0 {
            DiffStatus::Close
        } else if d <= 10.0 {
            DiffStatus::Good
        } else if d < 50.0 {
            DiffStatus::Similar
        } else {
            DiffStatus::Wrong
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DiffStatus::NotApplicable => "N/A",
            DiffStatus::Perfect => "Perfect",
            DiffStatus::Close => "Close",
            DiffStatus::Good => "Good",
            DiffStatus::Similar => "Similar",
            DiffStatus::Wrong => "Wrong",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
