//! End-to-end behavior of the terrain passes on small synthetic grids.

use cavescan_algorithms::hydrology::{
    drainage_path, find_caves_with, flood_region, map_drainage_with, CaveCandidate, CaveParams,
    DrainageParams, FindCaves, FloodOutcome, MapDrainage,
};
use cavescan_algorithms::morphology::{
    morphological_filter, MorphologicalFilter, MorphologicalParams,
};
use cavescan_algorithms::pits::{
    correlation_pit_filter, level_detect_with, CorrelationParams, CorrelationPitFilter, LevelDetect,
    LevelDetectParams,
};
use cavescan_algorithms::terrain::{
    geometric_mean_filter, slope_angle, GeometricMeanFilter, GeometricMeanParams, SlopeAngle,
};
use cavescan_core::{Algorithm, Error, TerrainGrid};
use cavescan_parallel::{CancelToken, ProcessingMode, RowScheduler};

fn parallel() -> RowScheduler {
    RowScheduler::new(ProcessingMode::ParallelWith(4)).unwrap()
}

/// Gentle hills with two enclosed hollows of different depth
fn hollows(width: usize, height: usize) -> TerrainGrid {
    TerrainGrid::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f64, y as f64);
        let base = 50.0 + (fx * 0.4).sin() * 2.0 + (fy * 0.3).cos() * 2.0;
        let d1 = ((fx - 8.0).powi(2) + (fy - 8.0).powi(2)).sqrt();
        let d2 = ((fx - 20.0).powi(2) + (fy - 14.0).powi(2)).sqrt();
        let hollow1 = if d1 < 3.0 { -6.0 + d1 } else { 0.0 };
        let hollow2 = if d2 < 2.0 { -3.0 + d2 } else { 0.0 };
        base + hollow1 + hollow2
    })
    .unwrap()
}

fn sorted(mut caves: Vec<CaveCandidate>) -> Vec<(u64, u64)> {
    caves.sort_by(|a, b| (a.y, a.x).partial_cmp(&(b.y, b.x)).unwrap());
    caves.iter().map(|c| (c.x as u64, c.y as u64)).collect()
}

// ---------------------------------------------------------------------------
// Cave detection
// ---------------------------------------------------------------------------

#[test]
fn single_pit_is_not_a_cave_but_a_bowl_is() {
    let pit = TerrainGrid::from_fn(5, 5, |x, y| if (x, y) == (2, 2) { 0.0 } else { 10.0 }).unwrap();
    let caves = find_caves_with(&pit, CaveParams::with_depth(1.0), &parallel()).unwrap();
    assert!(caves.is_empty());

    let bowl = TerrainGrid::from_fn(5, 5, |x, y| {
        if (1..=3).contains(&x) && (1..=3).contains(&y) {
            0.0
        } else {
            10.0
        }
    })
    .unwrap();
    for depth in [1.0, 5.0, 9.0] {
        let caves = find_caves_with(&bowl, CaveParams::with_depth(depth), &parallel()).unwrap();
        assert!(caves.iter().any(|c| (c.x, c.y) == (2.0, 2.0)), "depth {depth}");
    }
}

#[test]
fn raising_the_cap_keeps_every_candidate() {
    let grid = hollows(30, 24);
    let small = CaveParams {
        max_size: 20,
        ..CaveParams::with_depth(2.0)
    };
    let large = CaveParams {
        max_size: 300,
        ..CaveParams::with_depth(2.0)
    };

    let with_small = sorted(find_caves_with(&grid, small, &parallel()).unwrap());
    let with_large = sorted(find_caves_with(&grid, large, &parallel()).unwrap());
    assert!(!with_large.is_empty());
    for seed in &with_small {
        assert!(with_large.contains(seed), "{seed:?} lost when raising the cap");
    }
}

#[test]
fn shallower_floods_never_grow() {
    let grid = hollows(30, 24);
    for y in 1..23 {
        for x in 1..29 {
            let shallow = flood_region(&grid, x, y, 0.5, 300).unwrap();
            let deep = flood_region(&grid, x, y, 1.5, 300).unwrap();
            match (shallow, deep) {
                (FloodOutcome::Enclosed(a), FloodOutcome::Enclosed(b)) => assert!(a <= b),
                (FloodOutcome::ReachedBoundary | FloodOutcome::ReachedCap, deep) => {
                    assert!(deep.enclosed_size().is_none(), "({x}, {y})")
                }
                _ => {}
            }
        }
    }
}

#[test]
fn basin_open_to_the_edge_yields_nothing() {
    // a trough running out through the left edge
    let grid = TerrainGrid::from_fn(12, 9, |x, y| if y == 4 && x < 6 { 1.0 } else { 10.0 }).unwrap();
    let caves = find_caves_with(&grid, CaveParams::with_depth(1.0), &parallel()).unwrap();
    assert!(caves.is_empty());
}

#[test]
fn sequential_and_parallel_agree_on_caves() {
    let grid = hollows(30, 24);
    let seq = find_caves_with(&grid, CaveParams::default(), &RowScheduler::sequential()).unwrap();
    let par = find_caves_with(&grid, CaveParams::default(), &parallel()).unwrap();
    assert_eq!(sorted(seq), sorted(par));
}

#[test]
fn cancelled_scheduler_aborts_the_pass() {
    let token = CancelToken::new();
    let scheduler = parallel().with_cancel_token(token.clone());
    token.cancel();

    let err = find_caves_with(&hollows(30, 24), CaveParams::default(), &scheduler).unwrap_err();
    assert!(matches!(err, Error::Cancelled { completed: 0, total: 22 }));

    token.reset();
    assert!(find_caves_with(&hollows(30, 24), CaveParams::default(), &scheduler).is_ok());
}

// ---------------------------------------------------------------------------
// Drainage
// ---------------------------------------------------------------------------

#[test]
fn flat_grid_accumulates_ones() {
    let grid = TerrainGrid::from_elevation(10, 10, vec![10.0; 100]).unwrap();
    let acc = map_drainage_with(&grid, DrainageParams::default(), &parallel()).unwrap();
    assert!(acc.iter().all(|&c| c == 1));
}

#[test]
fn ramp_drains_toward_column_zero() {
    let (w, h) = (8, 6);
    let grid = TerrainGrid::from_fn(w, h, |x, _| x as f64 + 1.0).unwrap();

    for y in 0..h {
        for x in 0..w {
            let path = drainage_path(&grid, x, y, &DrainageParams::default()).unwrap();
            let mut last = x;
            for &(px, _) in &path[..path.len() - 1] {
                assert_eq!(px + 1, last);
                last = px;
            }
            assert_eq!(path.last().map(|p| p.0), Some(0));
        }
    }

    let acc = map_drainage_with(&grid, DrainageParams::default(), &parallel()).unwrap();
    let column_sums: Vec<u32> = (0..w).map(|x| (0..h).map(|y| acc.at(x, y)).sum()).collect();
    for pair in column_sums.windows(2) {
        assert!(pair[0] > pair[1], "column sums {column_sums:?}");
    }
    assert_eq!(column_sums[0], (h * (2 * w - 1)) as u32);
}

#[test]
fn accumulation_is_conserved() {
    let grid = hollows(30, 24);
    let acc = map_drainage_with(&grid, DrainageParams::default(), &parallel()).unwrap();

    let mut steps = 0u64;
    for y in 0..24 {
        for x in 0..30 {
            steps += drainage_path(&grid, x, y, &DrainageParams::default()).unwrap().len() as u64;
        }
    }
    assert_eq!(acc.iter().map(|&c| c as u64).sum::<u64>(), steps);
}

#[test]
fn sink_counts_itself_once() {
    let grid = hollows(30, 24);
    let path = drainage_path(&grid, 8, 8, &DrainageParams::default()).unwrap();
    assert_eq!(path, vec![(8, 8)]);
}

// ---------------------------------------------------------------------------
// Morphological filter
// ---------------------------------------------------------------------------

#[test]
fn filter_output_is_a_fixed_point() {
    let grid = TerrainGrid::from_fn(12, 4, |x, y| match (x, y) {
        (3, 1) => 30.0,
        (8, 2) => 45.0,
        _ => 20.0,
    })
    .unwrap();

    let first = morphological_filter(&grid, MorphologicalParams::default()).unwrap();
    assert!(first.converged);
    assert!(first.grid.elevation().iter().all(|&z| z == 20.0));

    let second = morphological_filter(&first.grid, MorphologicalParams::default()).unwrap();
    assert_eq!(second.total_removals(), 0);
}

// ---------------------------------------------------------------------------
// Algorithm trait
// ---------------------------------------------------------------------------

#[test]
fn passes_run_through_the_algorithm_trait() {
    let grid = hollows(30, 24);

    let caves = FindCaves.execute(grid.clone(), CaveParams::default()).unwrap();
    let direct = find_caves_with(&grid, CaveParams::default(), &RowScheduler::sequential()).unwrap();
    assert_eq!(sorted(caves), sorted(direct));

    let acc = MapDrainage.execute_default(grid.clone()).unwrap();
    let direct = map_drainage_with(&grid, DrainageParams::default(), &RowScheduler::sequential()).unwrap();
    assert_eq!(acc, direct);

    let filtered = MorphologicalFilter.execute_default(grid.clone()).unwrap();
    let direct = morphological_filter(&grid, MorphologicalParams::default()).unwrap();
    assert_eq!(filtered.grid, direct.grid);
    assert_eq!(filtered.iterations, direct.iterations);

    let scored = CorrelationPitFilter.execute_default(grid.clone()).unwrap();
    assert_eq!(scored, correlation_pit_filter(&grid, CorrelationParams::default()).unwrap());

    let params = LevelDetectParams {
        diameter: 4,
        count: true,
    };
    let levels = LevelDetect.execute(grid.clone(), params.clone()).unwrap();
    assert_eq!(levels, level_detect_with(&grid, params, &RowScheduler::sequential()).unwrap());

    let smoothed = GeometricMeanFilter
        .execute(grid.clone(), GeometricMeanParams::default())
        .unwrap();
    assert_eq!(smoothed, geometric_mean_filter(&grid, GeometricMeanParams::default()).unwrap());

    let angles = SlopeAngle.execute_default(grid.clone()).unwrap();
    assert_eq!(angles, slope_angle(&grid).unwrap());

    assert_eq!(FindCaves.name(), "Find Caves");
    assert!(!SlopeAngle.description().is_empty());
}
