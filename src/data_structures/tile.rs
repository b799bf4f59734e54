//! Tiles, terrain kinds and the materials they are drawn with.

use cgmath::Vector3;

/// Stable handle of a tile: its index in the row-major tile list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// The four kinds of ground a tile can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    LightSoil,
    DarkSoil,
    Forest,
    Water,
}

impl Terrain {
    /// Palette order. The index of a terrain in this array is its material index.
    pub const ALL: [Terrain; 4] = [
        Terrain::LightSoil,
        Terrain::DarkSoil,
        Terrain::Forest,
        Terrain::Water,
    ];

    pub fn index(self) -> usize {
        match self {
            Terrain::LightSoil => 0,
            Terrain::DarkSoil => 1,
            Terrain::Forest => 2,
            Terrain::Water => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Water lies flat, every other terrain gets a little height jitter.
    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Water)
    }

    pub fn material(self) -> Material {
        match self {
            Terrain::LightSoil => Material::standard("light soil", 0xc19a6b),
            Terrain::DarkSoil => Material::standard("dark soil", 0x8b4513),
            Terrain::Forest => Material::standard("forest", 0x228b22),
            Terrain::Water => Material::standard("water", 0x4682b4),
        }
    }
}

/// Handle into the material table of a [`crate::tiles::TileManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

/// Surface description of a tile. Colours are linear RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub label: &'static str,
    pub colour: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Material {
    /// A plain lit material from an sRGB hex colour such as `0x228b22`.
    pub fn standard(label: &'static str, rgb: u32) -> Self {
        Self {
            label,
            colour: srgb_hex_to_linear(rgb),
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
        }
    }

    /// A material that also glows by itself.
    pub fn glowing(label: &'static str, rgb: u32, emissive: u32, intensity: f32) -> Self {
        Self {
            emissive: srgb_hex_to_linear(emissive),
            emissive_intensity: intensity,
            ..Self::standard(label, rgb)
        }
    }

    /// The shared selection highlight: bright yellow with a yellow glow.
    pub fn highlight() -> Self {
        Self::glowing("highlight", 0xffff00, 0xffff00, 0.5)
    }

    /// Emitted radiance, i.e. emissive colour scaled by its intensity.
    pub fn emitted(&self) -> [f32; 3] {
        self.emissive.map(|c| c * self.emissive_intensity)
    }
}

fn srgb_hex_to_linear(rgb: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((rgb >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

/// One hexagonal cell of the grid.
///
/// Tiles are created and owned by [`crate::tiles::TileManager`]; only the
/// manager swaps their material, which is why `material` has no setter.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub row: usize,
    pub col: usize,
    /// World position of the tile's base center.
    pub position: Vector3<f32>,
    pub terrain: Terrain,
    pub(crate) material: MaterialId,
}

impl Tile {
    pub fn material(&self) -> MaterialId {
        self.material
    }
}
