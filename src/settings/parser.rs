//! Parser for settings files.

use super::config::{AnalysisFlags, SimulationConfig};
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{PercolationError, Result};
use crate::generator::{ParticleSpec, Shape};
use crate::phase::PhaseProperties;

/// Arguments following a directive on one line.
#[derive(Debug)]
struct Arguments {
    directive: String,
    line: usize,
    positional: Vec<Token>,
    named: Vec<(String, Token)>,
}

impl Arguments {
    fn reject_unknown(&self, allowed: &[&str]) -> Result<()> {
        match self.named.iter().find(|(key, _)| !allowed.contains(&key.as_str())) {
            Some((key, _)) => Err(PercolationError::invalid_parameter(
                &self.directive,
                key,
                format!("unknown parameter (expected one of: {})", allowed.join(", ")),
            )),
            None => Ok(()),
        }
    }

    fn get(&self, key: &str) -> Option<&Token> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, tok)| tok)
    }

    fn number(&self, key: &str) -> Result<Option<f64>> {
        self.get(key).map(|tok| self.to_number(key, tok)).transpose()
    }

    fn require_number(&self, key: &str) -> Result<f64> {
        self.number(key)?.ok_or_else(|| {
            PercolationError::invalid_parameter(&self.directive, key, "missing required value")
        })
    }

    fn count(&self, key: &str) -> Result<Option<usize>> {
        self.get(key)
            .map(|tok| self.to_count(key, tok).map(|v| v as usize))
            .transpose()
    }

    fn name(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            Some(tok) if tok.kind == TokenKind::Identifier => Ok(Some(tok.text.as_str())),
            Some(tok) => Err(PercolationError::invalid_parameter(
                &self.directive,
                key,
                format!("expected a phase name, got '{}'", tok.text),
            )),
            None => Ok(None),
        }
    }

    fn positional_count(&self, index: usize, what: &str) -> Result<u64> {
        let tok = self.positional.get(index).ok_or_else(|| {
            PercolationError::parse(self.line, format!("{} expects {}", self.directive, what))
        })?;
        self.to_count(what, tok)
    }

    fn positional_number(&self, index: usize, what: &str) -> Result<f64> {
        let tok = self.positional.get(index).ok_or_else(|| {
            PercolationError::parse(self.line, format!("{} expects {}", self.directive, what))
        })?;
        self.to_number(what, tok)
    }

    fn to_number(&self, key: &str, tok: &Token) -> Result<f64> {
        let value = if tok.kind == TokenKind::Number {
            parse_value(&tok.text)
        } else {
            None
        };
        value.filter(|v| v.is_finite()).ok_or_else(|| {
            PercolationError::invalid_parameter(
                &self.directive,
                key,
                format!("expected a number, got '{}'", tok.text),
            )
        })
    }

    fn to_count(&self, key: &str, tok: &Token) -> Result<u64> {
        if let Ok(value) = tok.text.parse::<u64>() {
            return Ok(value);
        }
        let value = self.to_number(key, tok)?;
        if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
            return Err(PercolationError::invalid_parameter(
                &self.directive,
                key,
                format!("expected a non-negative integer, got '{}'", tok.text),
            ));
        }
        Ok(value as u64)
    }
}

/// Parser for settings files.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            peeked: None,
        })
    }

    /// Parse the entire settings file.
    pub fn parse(&mut self) -> Result<SimulationConfig> {
        let mut config = SimulationConfig::default();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut config)?,
                _ => {
                    return Err(PercolationError::parse(
                        self.current.line,
                        format!("expected a directive, got '{}'", self.current.text),
                    ));
                }
            }

            if self.current.kind == TokenKind::Newline {
                self.advance()?;
            }
        }

        Ok(config)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = match self.peeked.take() {
            Some(tok) => tok,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    fn peek_kind(&mut self) -> Result<TokenKind> {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.lexer.next_token()?,
        };
        let kind = tok.kind;
        self.peeked = Some(tok);
        Ok(kind)
    }

    fn parse_arguments(&mut self, directive: String, line: usize) -> Result<Arguments> {
        let mut args = Arguments {
            directive,
            line,
            positional: Vec::new(),
            named: Vec::new(),
        };

        while !matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof) {
            let kind = self.current.kind;
            let named = kind == TokenKind::Identifier && self.peek_kind()? == TokenKind::Equals;
            match kind {
                TokenKind::Identifier if named => {
                    let key = self.current.text.clone();
                    self.advance()?;
                    self.advance()?;
                    if !matches!(self.current.kind, TokenKind::Number | TokenKind::Identifier) {
                        return Err(PercolationError::parse(
                            self.current.line,
                            format!("expected a value after '{}='", key),
                        ));
                    }
                    if args.named.iter().any(|(k, _)| *k == key) {
                        return Err(PercolationError::invalid_parameter(
                            &args.directive,
                            &key,
                            "given more than once",
                        ));
                    }
                    args.named.push((key, self.current.clone()));
                }
                TokenKind::Identifier | TokenKind::Number => {
                    args.positional.push(self.current.clone());
                }
                _ => {
                    return Err(PercolationError::parse(
                        self.current.line,
                        format!("unexpected '{}'", self.current.text),
                    ));
                }
            }
            self.advance()?;
        }

        Ok(args)
    }

    fn parse_directive(&mut self, config: &mut SimulationConfig) -> Result<()> {
        let directive = self.current.text.to_lowercase();
        let line = self.current.line;
        self.advance()?;
        let args = self.parse_arguments(directive, line)?;

        match args.directive.as_str() {
            ".grid" => {
                config.width = args.positional_count(0, "a width")? as usize;
                config.height = args.positional_count(1, "a height")? as usize;
            }
            ".iterations" => {
                config.iterations = args.positional_count(0, "a count")? as usize;
            }
            ".seed" => {
                config.seed = args.positional_count(0, "a seed")?;
            }
            ".threads" => {
                config.threads = Some(args.positional_count(0, "a thread count")? as usize);
            }
            ".max_paths" => {
                config.max_paths = args.positional_count(0, "a path count")? as usize;
            }
            ".field" => {
                config.field = (
                    args.positional_number(0, "a field along x")?,
                    args.positional_number(1, "a field along y")?,
                );
            }
            ".solver" => {
                args.reject_unknown(&["tol", "max_iter"])?;
                if let Some(tol) = args.number("tol")? {
                    config.solver_tolerance = tol;
                }
                if let Some(max_iter) = args.count("max_iter")? {
                    config.solver_max_iterations = max_iter;
                }
            }
            ".analyses" => config.analyses = parse_analyses(&args)?,
            ".phase" => {
                let phase = parse_phase(&args)?;
                config.phases.push(phase)?;
            }
            ".particle" => {
                let particle = parse_particle(&args, config)?;
                config.particles.push(particle);
            }
            ".inverse" => {
                config.inverse = true;
                config.inverse_material = match args.positional.first() {
                    Some(tok) => Some(lookup_phase(config, &tok.text, line)?),
                    None => None,
                };
            }
            _ => {
                return Err(PercolationError::UnknownDirective {
                    directive: args.directive,
                    line,
                });
            }
        }
        Ok(())
    }
}

fn parse_analyses(args: &Arguments) -> Result<AnalysisFlags> {
    let mut flags = AnalysisFlags::none();
    for tok in &args.positional {
        match tok.text.to_lowercase().as_str() {
            "conductivity" => flags.calc_electric_conductivity = true,
            "fdm" => flags.calc_electric_conductivity_with_fdm = true,
            "statistics" => flags.calc_statistics = true,
            "all" => flags = AnalysisFlags::all(),
            other => {
                return Err(PercolationError::parse(
                    args.line,
                    format!("unknown analysis '{}'", other),
                ));
            }
        }
    }
    Ok(flags)
}

fn parse_phase(args: &Arguments) -> Result<PhaseProperties> {
    let name = match args.positional.first() {
        Some(tok) if tok.kind == TokenKind::Identifier => tok.text.clone(),
        _ => return Err(PercolationError::parse(args.line, ".phase expects a name")),
    };
    args.reject_unknown(&["sigma", "kappa", "E", "nu"])?;

    Ok(PhaseProperties::conductor(name, args.number("sigma")?.unwrap_or(0.0))
        .with_thermal_conductivity(args.number("kappa")?.unwrap_or(0.0))
        .with_elastic(
            args.number("E")?.unwrap_or(0.0),
            args.number("nu")?.unwrap_or(0.0),
        ))
}

fn parse_particle(args: &Arguments, config: &SimulationConfig) -> Result<ParticleSpec> {
    let keyword = match args.positional.first() {
        Some(tok) if tok.kind == TokenKind::Identifier => tok.text.to_lowercase(),
        _ => return Err(PercolationError::parse(args.line, ".particle expects a shape")),
    };

    let shape = match keyword.as_str() {
        "rectangle" => {
            args.reject_unknown(&["count", "core", "hoop", "hoop_width", "width", "height"])?;
            Shape::Rectangle {
                width: args.require_number("width")?,
                height: args.require_number("height")?,
            }
        }
        "sloped_rectangle" => {
            args.reject_unknown(&[
                "count", "core", "hoop", "hoop_width", "width", "height", "angle",
            ])?;
            Shape::SlopedRectangle {
                width: args.require_number("width")?,
                height: args.require_number("height")?,
                angle: args.number("angle")?.unwrap_or(0.0),
            }
        }
        "circle" => {
            args.reject_unknown(&["count", "core", "hoop", "hoop_width", "radius"])?;
            Shape::Circle {
                radius: args.require_number("radius")?,
            }
        }
        "ellipse" => {
            args.reject_unknown(&["count", "core", "hoop", "hoop_width", "a", "b", "angle"])?;
            Shape::Ellipse {
                semi_major: args.require_number("a")?,
                semi_minor: args.require_number("b")?,
                angle: args.number("angle")?.unwrap_or(0.0),
            }
        }
        other => {
            return Err(PercolationError::parse(
                args.line,
                format!("unknown shape '{}'", other),
            ));
        }
    };

    let count = args.count("count")?.unwrap_or(1);
    let core = args.name("core")?.ok_or_else(|| {
        PercolationError::invalid_parameter(&args.directive, "core", "missing core phase")
    })?;
    let mut spec = ParticleSpec::new(shape, count, lookup_phase(config, core, args.line)?);

    let hoop_width = args.number("hoop_width")?.unwrap_or(0.0);
    if let Some(hoop) = args.name("hoop")? {
        spec = spec.with_hoop(lookup_phase(config, hoop, args.line)?, hoop_width);
    } else if hoop_width > 0.0 {
        let core = spec.core_material;
        spec = spec.with_hoop(core, hoop_width);
    }

    for flag in &args.positional[1..] {
        match flag.text.to_lowercase().as_str() {
            "random" => spec = spec.with_random_orientation(),
            other => {
                return Err(PercolationError::parse(
                    args.line,
                    format!("unknown particle flag '{}'", other),
                ));
            }
        }
    }

    Ok(spec)
}

fn lookup_phase(config: &SimulationConfig, name: &str, line: usize) -> Result<usize> {
    config
        .phases
        .find(name)
        .ok_or_else(|| PercolationError::UndefinedPhase {
            phase: name.to_string(),
            line,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Result<SimulationConfig> {
        Parser::new(Lexer::new(input))?.parse()
    }

    #[test]
    fn test_parse_full_settings() {
        let config = parse(
            r#"
# carbon black in epoxy
.grid 64 48
.iterations 20
.seed 1234
.analyses conductivity statistics
.phase epoxy sigma=1e-12 kappa=0.2 E=3G nu=0.35
.phase carbon sigma=10k kappa=100 E=30G nu=0.2
.phase shell sigma=100
.particle ellipse count=40 core=carbon hoop=shell hoop_width=1.5 a=4 b=1 random
.max_paths 3
.solver tol=1e-12 max_iter=500
"#,
        )
        .unwrap();

        assert_eq!((config.width, config.height), (64, 48));
        assert_eq!(config.iterations, 20);
        assert_eq!(config.seed, 1234);
        assert!(config.analyses.calc_statistics);
        assert!(!config.analyses.calc_electric_conductivity_with_fdm);
        assert_eq!(config.phases.len(), 3);
        assert_relative_eq!(config.phases.get(1).unwrap().electric_conductivity, 1e4);
        assert_relative_eq!(config.phases.get(0).unwrap().youngs_modulus, 3e9);
        assert_eq!(config.max_paths, 3);
        assert_eq!(config.solver_max_iterations, 500);

        let particle = &config.particles[0];
        assert_eq!(particle.count, 40);
        assert_eq!((particle.core_material, particle.hoop_material), (1, 2));
        assert_relative_eq!(particle.hoop_width, 1.5);
        assert!(particle.random_orientation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_inverse_and_field() {
        let config = parse(
            ".phase air\n.phase metal sigma=5\n.particle circle count=3 core=metal radius=2\n.inverse\n.field 1 0\n",
        )
        .unwrap();
        assert!(config.inverse);
        assert_eq!(config.inverse_material, None);
        assert_eq!(config.field, (1.0, 0.0));
        assert_eq!(config.generator(), crate::generator::Generator::new(config.particles.clone()).with_inverse(1));
    }

    #[test]
    fn test_hoop_width_without_hoop_phase_reuses_core() {
        let config = parse(".phase m\n.phase f sigma=1\n.particle circle core=f radius=2 hoop_width=1\n")
            .unwrap();
        let particle = &config.particles[0];
        assert_eq!(particle.core_material, 1);
        assert_eq!(particle.hoop_material, particle.core_material);
        assert_relative_eq!(particle.hoop_width, 1.0);
    }

    #[test]
    fn test_undefined_phase() {
        let err = parse(".phase matrix\n.particle circle core=filler radius=1\n").unwrap_err();
        assert!(matches!(
            err,
            PercolationError::UndefinedPhase { ref phase, line: 2 } if phase == "filler"
        ));
    }

    #[test]
    fn test_unknown_directive() {
        assert!(matches!(
            parse(".model foo\n"),
            Err(PercolationError::UnknownDirective { line: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_parameter() {
        assert!(matches!(
            parse(".phase matrix rho=3\n"),
            Err(PercolationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_missing_shape_parameter() {
        let err = parse(".phase m\n.particle rectangle core=m width=3\n").unwrap_err();
        assert!(matches!(err, PercolationError::InvalidParameter { ref param, .. } if param == "height"));
    }

    #[test]
    fn test_fractional_count_rejected() {
        assert!(parse(".iterations 2.5\n").is_err());
        assert!(parse(".grid 10\n").is_err());
    }

    #[test]
    fn test_stray_token_rejected() {
        assert!(matches!(
            parse("grid 10 10\n"),
            Err(PercolationError::ParseError { line: 1, .. })
        ));
    }
}
