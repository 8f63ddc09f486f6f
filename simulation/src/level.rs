//! Tile maps: a grid of glyphs turned into solid platforms and spawn points.
//!
//! ```text
//! ..........
//! .P.....E..
//! GGGG..GGGG
//! SSSSWWSSSS
//! ```

use crate::config::LevelConfig;
use crate::error::LevelError;
use crate::spatial::{ColliderIds, EntityKind, SpatialEntry};
use common::shapes::{Aabb, Collider, ColliderId};
use quadtree::quadtree::{Config, DynamicQuadtree};
use quadtree::QuadtreeResult;

/// Art variants per tile type in the atlas, for top and bottom rows.
pub const TOP_TILE_VARIANTS: u8 = 11;
pub const BOTTOM_TILE_VARIANTS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileType {
    Grass,
    Stone,
    Ice,
    Sand,
    Larva,
    Metal,
    Water,
    Wood,
}

impl TileType {
    pub fn from_glyph(glyph: char) -> Option<TileType> {
        match glyph {
            'G' => Some(TileType::Grass),
            'S' => Some(TileType::Stone),
            'I' => Some(TileType::Ice),
            'A' => Some(TileType::Sand),
            'L' => Some(TileType::Larva),
            'M' => Some(TileType::Metal),
            'W' => Some(TileType::Water),
            'D' => Some(TileType::Wood),
            _ => None,
        }
    }

    /// Top tiles of these types are drawn with a lip above their solid part.
    pub fn has_visual_lip(self) -> bool {
        matches!(self, TileType::Water | TileType::Grass | TileType::Sand)
    }
}

/// Whether a tile is the surface of its column or sits under another tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileLevel {
    Top,
    Bottom,
}

/// A static solid tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub id: ColliderId,
    /// Collision box. Lipped top tiles are shorter than the grid cell.
    pub bounds: Aabb,
    pub tile: TileType,
    pub tile_level: TileLevel,
    /// Added to `bounds.y` when drawing.
    pub draw_offset_y: f32,
    /// Atlas column; runs of the same tile cycle through the available art.
    pub variant: u8,
}

impl Platform {
    pub fn entry(&self) -> SpatialEntry {
        SpatialEntry::new(self.id, EntityKind::Platform, self.bounds)
    }
}

impl Collider for Platform {
    fn id(&self) -> ColliderId {
        self.id
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub bounds: Aabb,
    pub platforms: Vec<Platform>,
    /// Top-left corners of `E` cells.
    pub enemy_spawns: Vec<(f32, f32)>,
    /// Top-left corner of the first `P` cell.
    pub player_spawn: Option<(f32, f32)>,
}

enum Cell {
    Empty,
    Solid(TileType),
    EnemySpawn,
    PlayerSpawn,
}

fn parse_cell(glyph: char, row: usize, col: usize) -> Result<Cell, LevelError> {
    match glyph {
        '.' | ' ' => Ok(Cell::Empty),
        'E' => Ok(Cell::EnemySpawn),
        'P' => Ok(Cell::PlayerSpawn),
        other => TileType::from_glyph(other)
            .map(Cell::Solid)
            .ok_or(LevelError::UnknownGlyph {
                row,
                col,
                glyph: other,
            }),
    }
}

impl Level {
    /// Build a level from a glyph grid, one line per tile row.
    ///
    /// Blank lines are skipped. Every remaining row must be the same width.
    /// Platforms take ids from `ids` in row-major order.
    pub fn parse(map: &str, config: &LevelConfig, ids: &mut ColliderIds) -> Result<Level, LevelError> {
        let mut grid: Vec<Vec<Cell>> = Vec::new();
        for line in map.lines().map(str::trim_end).filter(|line| !line.is_empty()) {
            let row = grid.len();
            let cells = line
                .chars()
                .enumerate()
                .map(|(col, glyph)| parse_cell(glyph, row, col))
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(first) = grid.first() {
                if cells.len() != first.len() {
                    return Err(LevelError::RaggedRow {
                        row,
                        expected: first.len(),
                        found: cells.len(),
                    });
                }
            }
            grid.push(cells);
        }
        let columns = grid.first().map_or(0, Vec::len);
        if columns == 0 {
            return Err(LevelError::Empty);
        }

        let tile_w = config.tile_width;
        let tile_h = config.tile_height;
        let mut platforms = Vec::new();
        let mut enemy_spawns = Vec::new();
        let mut player_spawn = None;

        for (row, cells) in grid.iter().enumerate() {
            let mut previous: Option<(TileType, TileLevel, u8)> = None;
            for (col, cell) in cells.iter().enumerate() {
                let x = col as f32 * tile_w;
                let y = row as f32 * tile_h;
                let tile = match cell {
                    Cell::Solid(tile) => *tile,
                    Cell::EnemySpawn => {
                        enemy_spawns.push((x, y));
                        previous = None;
                        continue;
                    }
                    Cell::PlayerSpawn => {
                        if player_spawn.is_none() {
                            player_spawn = Some((x, y));
                        } else {
                            log::warn!("ignoring extra player spawn at row {}, column {}", row, col);
                        }
                        previous = None;
                        continue;
                    }
                    Cell::Empty => {
                        previous = None;
                        continue;
                    }
                };

                let covered = row > 0 && matches!(grid[row - 1][col], Cell::Solid(_));
                let tile_level = if covered {
                    TileLevel::Bottom
                } else {
                    TileLevel::Top
                };
                let variant = match previous {
                    Some((prev_tile, prev_level, prev_variant))
                        if prev_tile == tile && prev_level == tile_level =>
                    {
                        let count = match tile_level {
                            TileLevel::Top => TOP_TILE_VARIANTS,
                            TileLevel::Bottom => BOTTOM_TILE_VARIANTS,
                        };
                        (prev_variant + 1) % count
                    }
                    _ => 0,
                };
                previous = Some((tile, tile_level, variant));

                let mut bounds = Aabb::new(x, y, tile_w, tile_h);
                let mut draw_offset_y = 0.0;
                if tile_level == TileLevel::Top && tile.has_visual_lip() {
                    let offset = config.top_tile_visual_offset.min(tile_h);
                    bounds.y += offset;
                    bounds.height -= offset;
                    draw_offset_y = -offset;
                }

                platforms.push(Platform {
                    id: ids.next_id(),
                    bounds,
                    tile,
                    tile_level,
                    draw_offset_y,
                    variant,
                });
            }
        }

        let bounds = Aabb::new(
            0.0,
            0.0,
            columns as f32 * tile_w,
            grid.len() as f32 * tile_h,
        );
        log::info!(
            "parsed {}x{} level: {} platforms, {} enemy spawns",
            columns,
            grid.len(),
            platforms.len(),
            enemy_spawns.len()
        );
        Ok(Level {
            bounds,
            platforms,
            enemy_spawns,
            player_spawn,
        })
    }

    /// A dynamic quadtree over the level bounds holding every platform.
    pub fn build_quadtree(&self, config: Config) -> QuadtreeResult<DynamicQuadtree<SpatialEntry>> {
        let mut tree = DynamicQuadtree::new_with_config(self.bounds, config)?;
        for platform in &self.platforms {
            tree.insert(platform.entry())?;
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(map: &str) -> Result<Level, LevelError> {
        Level::parse(map, &LevelConfig::default(), &mut ColliderIds::default())
    }

    #[test]
    fn covered_tiles_are_bottom_tiles() {
        let level = parse("S.\nSS\n").unwrap();
        let levels: Vec<_> = level.platforms.iter().map(|p| p.tile_level).collect();
        assert_eq!(levels, vec![TileLevel::Top, TileLevel::Bottom, TileLevel::Top]);
    }

    #[test]
    fn lipped_top_tiles_are_shortened() {
        let level = parse("GS\nGG\n").unwrap();
        let grass_top = level.platforms[0];
        assert_eq!(grass_top.bounds, Aabb::new(0.0, 26.5625, 60.0, 60.0 - 26.5625));
        assert_eq!(grass_top.draw_offset_y, -26.5625);
        // Stone has no lip, and a covered grass tile keeps its full cell.
        assert_eq!(level.platforms[1].bounds, Aabb::new(60.0, 0.0, 60.0, 60.0));
        assert_eq!(level.platforms[2].bounds, Aabb::new(0.0, 60.0, 60.0, 60.0));
    }

    #[test]
    fn runs_cycle_through_variants() {
        let row: String = std::iter::repeat('S').take(13).collect();
        let level = parse(&row).unwrap();
        let variants: Vec<u8> = level.platforms.iter().map(|p| p.variant).collect();
        assert_eq!(&variants[..3], &[0, 1, 2]);
        assert_eq!(variants[11], 0);
        assert_eq!(variants[12], 1);
    }

    #[test]
    fn spawn_markers_are_not_solid() {
        let level = parse("P.E\nSSS\n").unwrap();
        assert_eq!(level.player_spawn, Some((0.0, 0.0)));
        assert_eq!(level.enemy_spawns, vec![(120.0, 0.0)]);
        assert_eq!(level.platforms.len(), 3);
        assert!(level.platforms.iter().all(|p| p.tile_level == TileLevel::Top));
    }

    #[test]
    fn rejects_malformed_maps() {
        assert_eq!(parse("\n\n"), Err(LevelError::Empty));
        assert_eq!(
            parse("SS\nS\n"),
            Err(LevelError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            parse("S?\n"),
            Err(LevelError::UnknownGlyph {
                row: 0,
                col: 1,
                glyph: '?'
            })
        );
    }
}
