//! Grid model tests: validation, commits, row detection, clearing.

use std::num::NonZeroU32;

use blockfall_engine::{BlockId, Grid};

fn id(n: u32) -> BlockId {
    NonZeroU32::new(n).expect("test ids are nonzero")
}

/// Fills `row` across the full grid width with ids starting at `base`.
fn fill_row(grid: &mut Grid, row: i32, base: u32) {
    for x in 0..grid.width() {
        let committed = grid.commit(&[((x, row), id(base + x as u32))]);
        assert_eq!(committed.len(), 1);
    }
}

#[test]
fn new_grid_is_empty() {
    let grid = Grid::new(10, 22);
    assert_eq!(grid.width(), 10);
    assert_eq!(grid.height(), 22);
    assert!(grid.occupied_cells().is_empty());
    assert!(grid.full_rows().is_empty());
    assert!(!grid.is_game_over());
}

#[test]
fn placement_validity_against_bounds() {
    let grid = Grid::new(10, 22);

    // In-bounds empty cells are valid.
    assert!(grid.is_valid_placement(&[(0, 0), (9, 0), (5, 21)]));
    // The spawn buffer above the grid is always valid.
    assert!(grid.is_valid_placement(&[(4, 22), (4, 100)]));
    // Side walls and floor are not.
    assert!(!grid.is_valid_placement(&[(-1, 5)]));
    assert!(!grid.is_valid_placement(&[(10, 5)]));
    assert!(!grid.is_valid_placement(&[(3, -1)]));
    // A single bad cell poisons the whole placement.
    assert!(!grid.is_valid_placement(&[(0, 0), (1, 0), (10, 0)]));
}

#[test]
fn committed_cells_report_occupied() {
    let mut grid = Grid::new(10, 22);
    let cells = [(3, 0), (4, 0), (5, 0), (4, 1)];
    assert!(grid.is_valid_placement(&cells));

    let placements: Vec<_> = cells
        .iter()
        .enumerate()
        .map(|(i, &cell)| (cell, id(i as u32 + 1)))
        .collect();
    let committed = grid.commit(&placements);
    assert_eq!(committed.len(), 4);

    for &cell in &cells {
        assert!(grid.is_occupied(cell));
    }
    assert!(!grid.is_valid_placement(&[(3, 0)]));
    assert_eq!(grid.block_at((4, 1)), Some(id(4)));
}

#[test]
fn over_height_commit_clamps_into_top_row() {
    let mut grid = Grid::new(10, 22);
    let committed = grid.commit(&[((4, 22), id(1))]);
    assert_eq!(committed, vec![((4, 21), id(1))]);
    assert!(grid.is_occupied((4, 21)));
    assert!(grid.is_game_over());
}

#[test]
fn clamp_collisions_are_skipped_not_overwritten() {
    let mut grid = Grid::new(10, 22);
    // Both cells clamp onto (4, 21); only the first one lands.
    let committed = grid.commit(&[((4, 22), id(1)), ((4, 23), id(2))]);
    assert_eq!(committed, vec![((4, 21), id(1))]);
    assert_eq!(grid.block_at((4, 21)), Some(id(1)));
}

#[test]
fn full_rows_are_reported_ascending() {
    let mut grid = Grid::new(4, 8);
    fill_row(&mut grid, 2, 10);
    fill_row(&mut grid, 0, 20);
    // A partial row is not full.
    grid.commit(&[((0, 1), id(30))]);

    assert_eq!(grid.full_rows(), vec![0, 2]);
}

#[test]
fn clearing_nothing_changes_nothing() {
    let mut grid = Grid::new(10, 22);
    fill_row(&mut grid, 0, 1);
    grid.commit(&[((3, 1), id(100))]);
    let before = grid.clone();

    assert!(grid.clear_rows(&[]).is_empty());
    assert_eq!(grid, before);

    // Out-of-range indices are filtered away entirely.
    assert!(grid.clear_rows(&[-1, 22, 99]).is_empty());
    assert_eq!(grid, before);
}

#[test]
fn clearing_duplicate_rows_clears_once() {
    let mut grid = Grid::new(4, 8);
    fill_row(&mut grid, 0, 1);
    let removed = grid.clear_rows(&[0, 0, 0]);
    assert_eq!(removed.len(), 4);
    assert!(grid.occupied_cells().is_empty());
}

#[test]
fn compaction_preserves_column_order() {
    let mut grid = Grid::new(4, 8);
    // Column 0 stacked rows 0..=3 with distinct ids.
    for y in 0..4 {
        grid.commit(&[((0, y), id(y as u32 + 1))]);
    }
    // Complete row 1 across the remaining columns.
    for x in 1..4 {
        grid.commit(&[((x, 1), id(10 + x as u32))]);
    }
    assert_eq!(grid.full_rows(), vec![1]);

    let removed = grid.clear_rows(&[1]);
    assert_eq!(removed.len(), 4);

    // Survivors shifted down one row, relative order intact, no gap below.
    assert_eq!(grid.block_at((0, 0)), Some(id(1)));
    assert_eq!(grid.block_at((0, 1)), Some(id(3)));
    assert_eq!(grid.block_at((0, 2)), Some(id(4)));
    assert_eq!(grid.block_at((0, 3)), None);
}

#[test]
fn multi_row_clear_shifts_by_rows_cleared_below() {
    let mut grid = Grid::new(4, 12);
    fill_row(&mut grid, 2, 10);
    fill_row(&mut grid, 5, 20);
    fill_row(&mut grid, 8, 30);
    // Markers above each full row.
    grid.commit(&[((0, 1), id(101))]); // below every cleared row, stays
    grid.commit(&[((1, 3), id(102))]); // above row 2, drops by 1
    grid.commit(&[((2, 6), id(103))]); // above rows 2 and 5, drops by 2
    grid.commit(&[((3, 9), id(104))]); // above all three, drops by 3

    let removed = grid.clear_rows(&[2, 5, 8]);
    assert_eq!(removed.len(), 12);

    assert_eq!(grid.block_at((0, 1)), Some(id(101)));
    assert_eq!(grid.block_at((1, 2)), Some(id(102)));
    assert_eq!(grid.block_at((2, 4)), Some(id(103)));
    assert_eq!(grid.block_at((3, 6)), Some(id(104)));
}

#[test]
fn full_bottom_row_clear_scenario() {
    // Literal scenario: 10x22 grid, row 0 filled by direct commits.
    let mut grid = Grid::new(10, 22);
    fill_row(&mut grid, 0, 1);
    grid.commit(&[((7, 1), id(50))]);

    assert_eq!(grid.full_rows(), vec![0]);

    let removed = grid.clear_rows(&[0]);
    assert_eq!(removed.len(), 10);

    // Row 1's contents shifted down into row 0; row 1 now empty.
    assert_eq!(grid.block_at((7, 0)), Some(id(50)));
    for x in 0..10 {
        assert!(!grid.is_occupied((x, 1)));
    }
    assert!(grid.full_rows().is_empty());
}

#[test]
fn top_row_occupancy_is_game_over() {
    let mut grid = Grid::new(10, 22);
    assert!(!grid.is_game_over());
    grid.commit(&[((6, 21), id(1))]);
    assert!(grid.is_game_over());
}

#[test]
fn reset_returns_every_held_id() {
    let mut grid = Grid::new(4, 8);
    fill_row(&mut grid, 0, 1);
    grid.commit(&[((2, 3), id(77))]);

    let mut released = grid.reset();
    released.sort();
    assert_eq!(released, vec![id(1), id(2), id(3), id(4), id(77)]);
    assert!(grid.occupied_cells().is_empty());
    assert!(!grid.is_game_over());
}
