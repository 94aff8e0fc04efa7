//! Lattice snapshots.

use std::io::Write;

use crate::error::Result;
use crate::lattice::{CellState, Lattice};

/// Brightest grey level written.
pub const MAX_GREY: u8 = 255;

/// Grey level of a cell state. Insulator is white, paths are darkest.
pub fn grey_level(state: CellState) -> u8 {
    match state {
        CellState::Empty => MAX_GREY,
        CellState::Hoop => 200,
        CellState::Core => 160,
        CellState::SidePath => 110,
        CellState::Percolating => 80,
        CellState::Border => 40,
        CellState::OnPath => 0,
    }
}

/// Write the lattice states as an ASCII greymap, top row first.
pub fn write_pgm<W: Write>(lattice: &Lattice, mut out: W) -> Result<()> {
    writeln!(out, "P2")?;
    writeln!(out, "{} {}", lattice.width(), lattice.height())?;
    writeln!(out, "{}", MAX_GREY)?;
    for row in lattice.states().chunks(lattice.width()) {
        let line: Vec<String> = row.iter().map(|&s| grey_level(s).to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(())
}
