//! Error types for the percolation engine.
//!
//! This module provides a unified error type [`PercolationError`] for the
//! conditions that abort a run: malformed settings, inconsistent
//! configuration, lattice contract violations and I/O failures.
//!
//! Conditions that are valid simulation outcomes (a search started on an
//! insulating cell, a solver that runs out of iterations, an empty cluster
//! population) are not errors; they are logged and reported in the
//! returned values instead.

use thiserror::Error;

/// Result type alias using [`PercolationError`].
pub type Result<T> = std::result::Result<T, PercolationError>;

/// Unified error type for all percolation operations.
#[derive(Error, Debug)]
pub enum PercolationError {
    // ============ Settings Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Unknown directive in a settings file
    #[error("Unknown directive '{directive}' at line {line}")]
    UnknownDirective { directive: String, line: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for '{owner}': {message}")]
    InvalidParameter {
        owner: String,
        param: String,
        message: String,
    },

    /// Undefined phase reference
    #[error("Undefined phase '{phase}' referenced at line {line}")]
    UndefinedPhase { phase: String, line: usize },

    /// Duplicate phase name
    #[error("Duplicate phase name '{name}'")]
    DuplicatePhase { name: String },

    // ============ Configuration Errors ============
    /// Grid dimensions are unusable
    #[error("Invalid grid {width}x{height}: both dimensions must be positive")]
    InvalidGrid { width: usize, height: usize },

    /// No phases were defined
    #[error("No phases defined (use '.phase <name> sigma=...')")]
    MissingPhases,

    /// Inconsistent configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Lattice Errors ============
    /// Coordinate outside the lattice
    #[error("Cell ({x}, {y}) is outside the {width}x{height} lattice")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Input array does not match the lattice size
    #[error("Expected {expected} cells, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Material id outside the phase table
    #[error("Material id {material} exceeds the {phases} defined phases")]
    UnknownMaterial { material: usize, phases: usize },

    // ============ Solver Errors ============
    /// Solver grid cannot be built
    #[error("Degenerate solver grid: {message}")]
    DegenerateSolverGrid { message: String },

    // ============ I/O Errors ============
    /// Error reading a settings file
    #[error("Failed to read settings file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Failed to write report: {source}")]
    ReportWriteError {
        #[source]
        source: std::io::Error,
    },
}

impl PercolationError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        owner: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            owner: owner.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PercolationError {
    fn from(source: std::io::Error) -> Self {
        Self::ReportWriteError { source }
    }
}
