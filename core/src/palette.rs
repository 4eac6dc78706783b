use plotters::style::RGBColor;

const SATURATION: f64 = 0.65;
const LIGHTNESS: f64 = 0.55;
/// Starting hue, kept off pure red so the first executor is not an alarm colour.
const HUE_OFFSET: f64 = 0.01;

pub const FALLBACK: RGBColor = RGBColor(128, 128, 128);

/// Executor → colour assignment shared by every chart of one report, so an
/// executor is drawn in the same colour everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<(String, RGBColor)>,
}

impl Palette {
    /// Evenly spaced hues, assigned in the order `executors` are given.
    pub fn for_executors<I, S>(executors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for executor in executors {
            let executor = executor.as_ref();
            if !names.iter().any(|n| n == executor) {
                names.push(executor.to_string());
            }
        }
        let count = names.len().max(1) as f64;
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let hue = (HUE_OFFSET + i as f64 / count).fract();
                (name, hsl_to_rgb(hue, SATURATION, LIGHTNESS))
            })
            .collect();
        Self { entries }
    }

    pub fn color_of(&self, executor: &str) -> RGBColor {
        self.entries
            .iter()
            .find(|(name, _)| name == executor)
            .map(|(_, color)| *color)
            .unwrap_or(FALLBACK)
    }

    pub fn executors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `h`, `s` and `l` are all in `0.0..=1.0`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGBColor {
    if s <= 0.0 {
        let v = channel(l);
        return RGBColor(v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    RGBColor(
        channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        channel(hue_to_rgb(p, q, h)),
        channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
