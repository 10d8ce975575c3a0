//! Text form of a grid.
//!
//! Format, one line per row:
//! - `■` or `#`: obstacle
//! - `□` or `.`: free cell
//! - `S`: start (token or source)
//! - `T`: target
//! - `*`: free cell on a route (written by [`format_layout`], read as free)
//!
//! Blank lines are skipped; every other line must have the same width.

use crate::error::LayoutError;
use crate::grid::{CellPos, Grid};

/// A parsed layout: the grid plus any start/target markers
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub grid: Grid,
    pub start: Option<CellPos>,
    pub target: Option<CellPos>,
}

pub fn parse_layout(text: &str) -> Result<GridLayout, LayoutError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let cols = lines.first().ok_or(LayoutError::Empty)?.chars().count();

    let mut blocked = Vec::new();
    let mut start = None;
    let mut target = None;

    for (row, line) in lines.iter().enumerate() {
        let width = line.chars().count();
        if width != cols {
            return Err(LayoutError::RaggedRow {
                row,
                expected: cols,
                found: width,
            });
        }

        for (col, symbol) in line.chars().enumerate() {
            let pos = CellPos::new(row as i32, col as i32);
            match symbol {
                '■' | '#' => blocked.push(pos),
                '□' | '.' | '*' => {}
                'S' => place_marker(&mut start, pos, symbol)?,
                'T' => place_marker(&mut target, pos, symbol)?,
                _ => return Err(LayoutError::UnknownSymbol { symbol, row, col }),
            }
        }
    }

    Ok(GridLayout {
        grid: Grid::with_blocked(lines.len() as i32, cols as i32, &blocked),
        start,
        target,
    })
}

fn place_marker(slot: &mut Option<CellPos>, pos: CellPos, symbol: char) -> Result<(), LayoutError> {
    if slot.replace(pos).is_some() {
        return Err(LayoutError::DuplicateMarker(symbol));
    }
    Ok(())
}

/// Render the grid as text, marking start, target and route cells
pub fn format_layout(
    grid: &Grid,
    start: Option<CellPos>,
    target: Option<CellPos>,
    route: &[CellPos],
) -> String {
    let mut result = String::new();

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pos = CellPos::new(row, col);
            let symbol = if Some(pos) == start {
                'S'
            } else if Some(pos) == target {
                'T'
            } else if grid.is_obstacle(pos) {
                '■'
            } else if route.contains(&pos) {
                '*'
            } else {
                '□'
            };
            result.push(symbol);
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers_and_obstacles() {
        let layout = parse_layout(
            "
            S.#
            .##
            ..T
            ",
        )
        .unwrap();

        assert_eq!(layout.grid.rows(), 3);
        assert_eq!(layout.grid.cols(), 3);
        assert_eq!(layout.start, Some(CellPos::new(0, 0)));
        assert_eq!(layout.target, Some(CellPos::new(2, 2)));
        assert_eq!(layout.grid.obstacle_count(), 3);
        assert!(layout.grid.is_obstacle(CellPos::new(1, 1)));
    }

    #[test]
    fn test_format_round_trips_through_parse() {
        let text = "S□■\n□■□\n□□T\n";
        let layout = parse_layout(text).unwrap();

        assert_eq!(format_layout(&layout.grid, layout.start, layout.target, &[]), text);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_layout("  \n").unwrap_err(), LayoutError::Empty);
        assert_eq!(
            parse_layout("...\n..").unwrap_err(),
            LayoutError::RaggedRow { row: 1, expected: 3, found: 2 }
        );
        assert_eq!(
            parse_layout("S.S").unwrap_err(),
            LayoutError::DuplicateMarker('S')
        );
        assert_eq!(
            parse_layout(".x.").unwrap_err(),
            LayoutError::UnknownSymbol { symbol: 'x', row: 0, col: 1 }
        );
    }
}
