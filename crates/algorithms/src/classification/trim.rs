//! Classification trimming

use std::collections::HashSet;

use cavescan_core::raster::{Raster, TerrainGrid};
use cavescan_core::Result;

/// Mask selecting the LAS class code from a stored classification byte
pub const CLASS_MASK: u8 = 0x0F;

/// Keep only cells whose class code is in `keep`.
///
/// The class code is the low nibble of the classification byte; the upper
/// flag bits are ignored when matching and preserved on kept cells. Other
/// cells lose their data: elevation 0, class 0 and no color.
pub fn trim_classifications(grid: &TerrainGrid, keep: &HashSet<u8>) -> Result<TerrainGrid> {
    let (elevation, classification, colors, metadata) = grid.clone().into_parts();
    let (width, height) = (elevation.width(), elevation.height());

    let kept: Vec<bool> = classification
        .iter()
        .map(|&c| keep.contains(&(c & CLASS_MASK)))
        .collect();

    let trimmed_z = elevation
        .iter()
        .zip(&kept)
        .map(|(&z, &k)| if k { z } else { 0.0 })
        .collect();
    let trimmed_class = classification
        .iter()
        .zip(&kept)
        .map(|(&c, &k)| if k { c } else { 0 })
        .collect();
    let trimmed_colors = colors.map(|colors| {
        colors
            .into_iter()
            .zip(&kept)
            .map(|(rgb, &k)| if k { rgb } else { None })
            .collect()
    });

    TerrainGrid::from_layers(
        Raster::from_vec(trimmed_z, width, height)?,
        Raster::from_vec(trimmed_class, width, height)?,
        trimmed_colors,
        metadata,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavescan_core::Rgb;

    fn grid() -> TerrainGrid {
        let gray = Some(Rgb {
            red: 100,
            green: 100,
            blue: 100,
        });
        // classes: ground, ground with a flag bit, vegetation, building
        TerrainGrid::new(2, 2, vec![5.0, 6.0, 7.0, 8.0], vec![2, 0x12, 5, 6])
            .unwrap()
            .with_colors(vec![gray; 4])
            .unwrap()
    }

    #[test]
    fn test_keeps_ground_only() {
        let keep: HashSet<u8> = [2].into_iter().collect();
        let out = trim_classifications(&grid(), &keep).unwrap();

        assert_eq!(out.elevation().iter().copied().collect::<Vec<_>>(), vec![5.0, 6.0, 0.0, 0.0]);
        assert_eq!(out.classification().iter().copied().collect::<Vec<_>>(), vec![2, 0x12, 0, 0]);
        let colors = out.colors().unwrap();
        assert!(colors[0].is_some() && colors[1].is_some());
        assert!(colors[2].is_none() && colors[3].is_none());
    }

    #[test]
    fn test_empty_set_clears_everything() {
        let out = trim_classifications(&grid(), &HashSet::new()).unwrap();
        assert!(out.elevation().iter().all(|&z| z == 0.0));
        assert_eq!(out.width(), 2);
    }
}
