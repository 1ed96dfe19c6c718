/// 24-bit display color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xffffff);
    /// Scene clear color, used as the blend target for opacity
    pub const BACKGROUND: Rgb = Rgb::from_hex(0x000010);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Composite this color over the background at the given opacity.
    /// The terminal has no alpha channel, so transparency becomes a fade.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (bg as f64 + (fg as f64 - bg as f64) * a).round() as u8;
        Self {
            r: mix(self.r, Self::BACKGROUND.r),
            g: mix(self.g, Self::BACKGROUND.g),
            b: mix(self.b, Self::BACKGROUND.b),
        }
    }
}

/// Fixed species palette
const SPECIES_COLORS: [(&str, Rgb); 6] = [
    ("Warbler", Rgb::from_hex(0x00ff00)),
    ("Hawk", Rgb::from_hex(0xff0000)),
    ("Crane", Rgb::from_hex(0x0000ff)),
    ("Eagle", Rgb::from_hex(0xffff00)),
    ("Owl", Rgb::from_hex(0x800080)),
    ("Pigeon", Rgb::from_hex(0x00ffff)),
];

/// Display color for a species; unmapped species are white.
pub fn species_color(species: &str) -> Rgb {
    SPECIES_COLORS
        .iter()
        .find(|(name, _)| *name == species)
        .map(|&(_, color)| color)
        .unwrap_or(Rgb::WHITE)
}

/// Species that have a dedicated palette entry
pub fn known_species() -> impl Iterator<Item = &'static str> {
    SPECIES_COLORS.iter().map(|(name, _)| *name)
}
