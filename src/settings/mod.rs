//! Settings files.
//!
//! A settings file is line-oriented. Every line holds one directive and
//! its arguments; `#` and `;` start comments. Numbers accept the SI
//! suffixes `p n u m k M G`.
//!
//! # Grammar Overview
//!
//! ```text
//! settings  = { line }
//! line      = comment | directive | empty
//! directive = '.' name { argument }
//! argument  = value | key '=' value
//! value     = number [suffix] | identifier
//! ```
//!
//! # Directives
//!
//! | Directive | Syntax |
//! |-----------|--------|
//! | .grid | `.grid <width> <height>` |
//! | .iterations | `.iterations <n>` |
//! | .seed | `.seed <n>` |
//! | .threads | `.threads <n>` |
//! | .analyses | `.analyses [conductivity] [fdm] [statistics] [all]` |
//! | .phase | `.phase <name> [sigma=] [kappa=] [E=] [nu=]` |
//! | .particle | `.particle <shape> core=<phase> [count=] [hoop=<phase>] [hoop_width=] [random] <shape params>` |
//! | .inverse | `.inverse [<phase>]` |
//! | .max_paths | `.max_paths <n>` |
//! | .field | `.field <ex> <ey>` |
//! | .solver | `.solver [tol=] [max_iter=]` |
//!
//! The first phase is the matrix. Shape parameters are `width height` for
//! `rectangle`, `width height [angle]` for `sloped_rectangle`, `radius` for
//! `circle` and `a b [angle]` for `ellipse`; angles are in degrees.
//!
//! # Example
//!
//! ```text
//! .grid 200 200
//! .iterations 50
//! .analyses conductivity statistics
//!
//! .phase polymer sigma=1e-10 E=2G nu=0.4
//! .phase graphite sigma=30k E=10G nu=0.3
//! .particle ellipse count=300 core=graphite a=6 b=1.5 random
//! ```

mod config;
mod lexer;
mod parser;

pub use config::{AnalysisFlags, SimulationConfig, DEFAULT_GRID_SIZE, DEFAULT_ITERATIONS};
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a settings string.
pub fn parse(input: &str) -> Result<SimulationConfig> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a settings file.
pub fn parse_file(path: &std::path::Path) -> Result<SimulationConfig> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::PercolationError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse(&content)
}
