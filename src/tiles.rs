//! The tile grid: generation, selection highlighting and teardown.
//!
//! [`TileManager`] is the single owner of every tile and of the materials they
//! are drawn with. Selection swaps a tile's material for the shared highlight
//! and is always reversible through the table of original materials, which is
//! keyed by [`TileId`] rather than by object identity.

use std::collections::HashMap;

use cgmath::Vector3;
use rand::Rng;

use crate::data_structures::{
    mesh::TileGeometry,
    tile::{Material, MaterialId, Terrain, Tile, TileId},
};

/// Material slot of the shared highlight.
const HIGHLIGHT: MaterialId = MaterialId(0);
/// Upper bound (exclusive) of the random height added to dry tiles.
const HEIGHT_JITTER: f32 = 0.1;

#[derive(Debug)]
pub struct TileManager {
    hex_size: f32,
    grid_size: usize,
    tiles: Vec<Tile>,
    /// Slot 0 is the highlight, slots 1..=4 follow [`Terrain::ALL`].
    materials: Vec<Material>,
    original_materials: HashMap<TileId, MaterialId>,
    selected: Option<TileId>,
    geometry: Option<TileGeometry>,
    generation: u64,
}

impl TileManager {
    pub fn new(hex_size: f32) -> Self {
        Self {
            hex_size,
            grid_size: 0,
            tiles: Vec::new(),
            materials: Self::material_table(),
            original_materials: HashMap::new(),
            selected: None,
            geometry: None,
            generation: 0,
        }
    }

    fn material_table() -> Vec<Material> {
        std::iter::once(Material::highlight())
            .chain(Terrain::ALL.iter().map(|terrain| terrain.material()))
            .collect()
    }

    fn terrain_material(terrain: Terrain) -> MaterialId {
        MaterialId(1 + terrain.index())
    }

    /// Build a `grid_size` × `grid_size` grid of tiles.
    ///
    /// Tiles are laid out column by column `2·size·0.75` apart and row by row
    /// `size·√3` apart, with odd columns shifted by half a row, then the whole
    /// grid is moved so that it is centered on the origin. Terrain and the
    /// small height jitter of non-water tiles are drawn from `rng`; positions
    /// in the xz plane do not depend on it.
    ///
    /// Calling this again replaces the previous grid and clears the selection.
    pub fn create_tiles<R: Rng + ?Sized>(&mut self, grid_size: usize, rng: &mut R) {
        if !self.tiles.is_empty() {
            log::warn!("Replacing an existing grid of {} tiles", self.tiles.len());
        }
        self.tiles.clear();
        self.original_materials.clear();
        self.selected = None;
        if self.materials.is_empty() {
            self.materials = Self::material_table();
        }

        let size = self.hex_size;
        let hex_width = size * 2.0;
        let hex_height = size * 3f32.sqrt();

        self.tiles.reserve(grid_size * grid_size);
        for row in 0..grid_size {
            for col in 0..grid_size {
                let x = col as f32 * hex_width * 0.75;
                let z = row as f32 * hex_height + if col % 2 == 0 { 0.0 } else { hex_height / 2.0 };

                let terrain = Terrain::ALL[rng.random_range(0..Terrain::ALL.len())];
                let y = if terrain.is_water() {
                    0.0
                } else {
                    rng.random::<f32>() * HEIGHT_JITTER
                };

                let id = TileId(self.tiles.len());
                let material = Self::terrain_material(terrain);
                self.original_materials.insert(id, material);
                self.tiles.push(Tile {
                    id,
                    row,
                    col,
                    position: Vector3::new(x, y, z),
                    terrain,
                    material,
                });
            }
        }

        let grid_center = Vector3::new(
            grid_size as f32 * hex_width * 0.75 / 2.0,
            0.0,
            grid_size as f32 * hex_height / 2.0,
        );
        for tile in &mut self.tiles {
            tile.position -= grid_center;
        }

        self.geometry = Some(TileGeometry::extruded_hexagon(size));
        self.grid_size = grid_size;
        self.generation += 1;
        log::info!("Created {} tiles", self.tiles.len());
    }

    /// The tile in the middle of the grid, at row and column `grid_size / 2`.
    pub fn center_tile(&self, grid_size: usize) -> Option<&Tile> {
        let center = grid_size / 2;
        self.tiles.get(center * grid_size + center)
    }

    /// Highlight `id`, restoring whichever tile was highlighted before.
    ///
    /// Selecting the already selected tile or an unknown id changes nothing.
    pub fn select_tile(&mut self, id: TileId) {
        if self.selected == Some(id) {
            return;
        }
        let Some(tile) = self.tiles.get_mut(id.0) else {
            log::warn!("Ignoring selection of unknown tile {:?}", id);
            return;
        };
        tile.material = HIGHLIGHT;
        if let Some(previous) = self.selected.replace(id) {
            self.restore(previous);
        }
        self.generation += 1;
        log::debug!("Selected tile {:?}", id);
    }

    /// Restore the selected tile's material and clear the selection.
    pub fn deselect_tile(&mut self) {
        if let Some(previous) = self.selected.take() {
            self.restore(previous);
            self.generation += 1;
            log::debug!("Deselected tile {:?}", previous);
        }
    }

    fn restore(&mut self, id: TileId) {
        if let (Some(original), Some(tile)) =
            (self.original_materials.get(&id), self.tiles.get_mut(id.0))
        {
            tile.material = *original;
        }
    }

    /// Release the shared geometry, every material and all tile bookkeeping.
    ///
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.tiles.is_empty() && self.materials.is_empty() && self.geometry.is_none() {
            return;
        }
        log::debug!("Disposing {} tiles", self.tiles.len());
        self.geometry = None;
        self.materials.clear();
        self.tiles.clear();
        self.original_materials.clear();
        self.selected = None;
        self.grid_size = 0;
        self.generation += 1;
    }

    /// All tiles in row-major order; the index of a tile equals its id.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    pub fn selected(&self) -> Option<TileId> {
        self.selected
    }

    pub fn original_material(&self, id: TileId) -> Option<MaterialId> {
        self.original_materials.get(&id).copied()
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn highlight_material(&self) -> MaterialId {
        HIGHLIGHT
    }

    pub fn geometry(&self) -> Option<&TileGeometry> {
        self.geometry.as_ref()
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn hex_size(&self) -> f32 {
        self.hex_size
    }

    /// Bumped whenever tiles or their materials change.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
