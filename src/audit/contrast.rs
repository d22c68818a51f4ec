//! Colour parsing and WCAG 2 contrast math for inline styles.

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Relative luminance as defined by WCAG 2.x.
    pub fn luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.0) + 0.7152 * channel(self.1) + 0.0722 * channel(self.2)
    }
}

/// Contrast ratio between two colours, from 1.0 to 21.0.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (a.luminance(), b.luminance());
    let (light, dark) = if la >= lb { (la, lb) } else { (lb, la) };
    (light + 0.05) / (dark + 0.05)
}

const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb(0, 0, 0)),
    ("white", Rgb(255, 255, 255)),
    ("red", Rgb(255, 0, 0)),
    ("green", Rgb(0, 128, 0)),
    ("lime", Rgb(0, 255, 0)),
    ("blue", Rgb(0, 0, 255)),
    ("navy", Rgb(0, 0, 128)),
    ("yellow", Rgb(255, 255, 0)),
    ("orange", Rgb(255, 165, 0)),
    ("purple", Rgb(128, 0, 128)),
    ("maroon", Rgb(128, 0, 0)),
    ("olive", Rgb(128, 128, 0)),
    ("teal", Rgb(0, 128, 128)),
    ("aqua", Rgb(0, 255, 255)),
    ("cyan", Rgb(0, 255, 255)),
    ("fuchsia", Rgb(255, 0, 255)),
    ("magenta", Rgb(255, 0, 255)),
    ("silver", Rgb(192, 192, 192)),
    ("gray", Rgb(128, 128, 128)),
    ("grey", Rgb(128, 128, 128)),
    ("lightgray", Rgb(211, 211, 211)),
    ("lightgrey", Rgb(211, 211, 211)),
    ("darkgray", Rgb(169, 169, 169)),
    ("darkgrey", Rgb(169, 169, 169)),
];

/// Parse a CSS colour value: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
/// `rgb()`/`rgba()` with integer or percentage channels, or a basic
/// keyword. Alpha is ignored. Anything else is `None`.
pub fn parse_color(value: &str) -> Option<Rgb> {
    let value = value.trim().trim_end_matches("!important").trim();
    let lower = value.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = args
            .split([',', ' ', '/'])
            .filter(|s| !s.is_empty())
            .take(3)
            .map(parse_channel)
            .collect::<Option<_>>()?;
        return match channels.as_slice() {
            [r, g, b] => Some(Rgb(*r, *g, *b)),
            _ => None,
        };
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| *rgb)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 | 4 => Some(Rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 | 8 => Some(Rgb(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    match s.strip_suffix('%') {
        Some(pct) => {
            let pct: f64 = pct.trim().parse().ok()?;
            Some((pct.clamp(0.0, 100.0) * 2.55).round() as u8)
        }
        None => {
            let v: f64 = s.trim().parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        }
    }
}

/// Split an inline `style` attribute into lowercase property names and
/// their raw values.
pub fn parse_inline_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(prop, value)| (prop.trim().to_ascii_lowercase(), value.trim().to_string()))
        .filter(|(prop, value)| !prop.is_empty() && !value.is_empty())
        .collect()
}

/// Foreground colour declared by an inline style.
pub fn style_color(style: &str) -> Option<Rgb> {
    parse_inline_style(style)
        .into_iter()
        .rev()
        .find(|(prop, _)| prop == "color")
        .and_then(|(_, value)| parse_color(&value))
}

/// Background colour declared by an inline style, from `background-color`
/// or the first colour token of a `background` shorthand.
pub fn style_background(style: &str) -> Option<Rgb> {
    parse_inline_style(style)
        .into_iter()
        .rev()
        .find_map(|(prop, value)| match prop.as_str() {
            "background-color" => parse_color(&value),
            "background" => shorthand_color(&value),
            _ => None,
        })
}

fn shorthand_color(value: &str) -> Option<Rgb> {
    // rgb(...) may contain spaces, so try the whole functional form first.
    let lower = value.to_ascii_lowercase();
    if let Some(start) = lower.find("rgb") {
        if let Some(end) = lower[start..].find(')') {
            return parse_color(&lower[start..=start + end]);
        }
    }
    value.split_whitespace().find_map(parse_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_on_white_is_21() {
        let ratio = contrast_ratio(Rgb(0, 0, 0), Rgb::WHITE);
        assert!((ratio - 21.0).abs() < 0.01, "{ratio}");
    }

    #[test]
    fn similar_greys_are_low_contrast() {
        let ratio = contrast_ratio(parse_color("#777777").unwrap(), parse_color("#888888").unwrap());
        assert!(ratio < 4.5);
        assert!((ratio - 1.26).abs() < 0.02, "{ratio}");
    }

    #[test]
    fn ratio_is_symmetric() {
        let a = Rgb(10, 80, 200);
        let b = Rgb(250, 240, 10);
        assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
    }

    #[test]
    fn colour_forms() {
        assert_eq!(parse_color("#fff"), Some(Rgb::WHITE));
        assert_eq!(parse_color("#FFFFFF80"), Some(Rgb::WHITE));
        assert_eq!(parse_color("rgb(255, 0, 10)"), Some(Rgb(255, 0, 10)));
        assert_eq!(parse_color("rgba(0 0 0 / 50%)"), Some(Rgb(0, 0, 0)));
        assert_eq!(parse_color("rgb(100%, 0%, 0%)"), Some(Rgb(255, 0, 0)));
        assert_eq!(parse_color("Navy"), Some(Rgb(0, 0, 128)));
        assert_eq!(parse_color("#abz"), None);
        assert_eq!(parse_color("var(--fg)"), None);
    }

    #[test]
    fn inline_styles() {
        let style = "color:#000000;background-color:#ffffff";
        assert_eq!(style_color(style), Some(Rgb(0, 0, 0)));
        assert_eq!(style_background(style), Some(Rgb::WHITE));
        assert_eq!(
            style_background("background: url(x.png) no-repeat #333"),
            Some(Rgb(0x33, 0x33, 0x33))
        );
        assert_eq!(
            style_background("background: rgb(1, 2, 3) url(x.png)"),
            Some(Rgb(1, 2, 3))
        );
        assert_eq!(style_color("background-color: red"), None);
    }
}
