//! Tick label formatting: SI-prefixed (`s`), fixed-point (`f`) and integer (`d`).
//!
//! Specifiers follow the familiar `[,][.precision]type` shape, e.g. `"s"`,
//! `".2s"`, `",.1f"`, `",d"`. For `s` the precision counts significant digits,
//! for `f` digits after the decimal point.

use crate::error::{Error, Result};
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

/// SI symbols from yocto (1e-24) to yotta (1e24).
const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Significant digits used by `s` when nothing else decides.
const DEFAULT_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Significant digits plus SI prefix (`1.5M`).
    Si,
    /// Fixed number of decimals.
    Fixed,
    /// Rounded integer.
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickFormat {
    pub grouping: bool,
    pub precision: Option<usize>,
    pub kind: FormatKind,
    /// Decimal exponent of an SI prefix shared by every label; `precision` then
    /// counts decimals of the scaled value instead of significant digits.
    pub fixed_prefix: Option<i32>,
}

fn specifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(,)?(?:\.(\d+))?([sfd])$").expect("static regex"))
}

impl FromStr for TickFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = specifier_regex()
            .captures(s.trim())
            .ok_or_else(|| Error::InvalidTickFormat(s.to_string()))?;
        let precision = match caps.get(2) {
            Some(m) => Some(
                m.as_str()
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidTickFormat(s.to_string()))?,
            ),
            None => None,
        };
        let kind = match &caps[3] {
            "s" => FormatKind::Si,
            "f" => FormatKind::Fixed,
            _ => FormatKind::Integer,
        };
        Ok(Self {
            grouping: caps.get(1).is_some(),
            precision,
            kind,
            fixed_prefix: None,
        })
    }
}

impl TickFormat {
    /// Fill in a missing precision from the tick step, so labels show just enough digits
    /// to tell neighbouring ticks apart. An unqualified `s` also pins every label to the
    /// prefix of the largest magnitude (`0.4M … 1.2M`).
    pub fn for_ticks(&self, start: f64, stop: f64, step: f64) -> TickFormat {
        if self.precision.is_some() {
            return *self;
        }
        match self.kind {
            FormatKind::Si => {
                let value = start.abs().max(stop.abs());
                TickFormat {
                    precision: Some(precision_prefix(step, value)),
                    fixed_prefix: Some(prefix_exponent(exponent(value))),
                    ..*self
                }
            }
            FormatKind::Fixed => TickFormat {
                precision: Some((-exponent(step)).max(0) as usize),
                ..*self
            },
            FormatKind::Integer => *self,
        }
    }

    pub fn format(&self, v: f64) -> String {
        if !v.is_finite() {
            return v.to_string();
        }
        let (body, suffix) = match (self.kind, self.fixed_prefix) {
            (FormatKind::Si, Some(e)) => {
                let p = self.precision.unwrap_or(0).min(20);
                let scaled = v.abs() * 10f64.powi(-e);
                (format!("{:.*}", p, scaled), SI_PREFIXES[(8 + e / 3) as usize])
            }
            (FormatKind::Si, None) => {
                let p = self.precision.unwrap_or(DEFAULT_PRECISION).clamp(1, 21);
                si_parts(v.abs(), p)
            }
            (FormatKind::Fixed, _) => {
                let p = self.precision.unwrap_or(DEFAULT_PRECISION).min(20);
                (format!("{:.*}", p, v.abs()), "")
            }
            (FormatKind::Integer, _) => (format!("{}", v.abs().round()), ""),
        };
        let body = if self.grouping { group_thousands(&body) } else { body };
        let negative = v < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0');
        format!("{}{}{}", if negative { "-" } else { "" }, body, suffix)
    }
}

/// SI-prefixed formatting with `precision` significant digits, e.g. `format_si(1.5e6, 2) == "1.5M"`.
pub fn format_si(v: f64, precision: usize) -> String {
    TickFormat {
        grouping: false,
        precision: Some(precision),
        kind: FormatKind::Si,
        fixed_prefix: None,
    }
    .format(v)
}

/// Digits and decimal exponent of `x` (non-negative), rounded to `p` significant
/// digits, or shortest round-trip digits when `p` is `None`.
fn decimal_parts(x: f64, p: Option<usize>) -> (String, i32) {
    let s = match p {
        Some(p) if p > 0 => format!("{:.*e}", p - 1, x),
        _ => format!("{:e}", x),
    };
    let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    (digits, exp.parse().unwrap_or(0))
}

fn exponent(x: f64) -> i32 {
    decimal_parts(x.abs(), None).1
}

fn prefix_exponent(exp: i32) -> i32 {
    exp.div_euclid(3).clamp(-8, 8) * 3
}

/// Significant digits needed for SI labels of ticks `step` apart up to `value`.
fn precision_prefix(step: f64, value: f64) -> usize {
    (prefix_exponent(exponent(value)) - exponent(step.abs())).max(0) as usize
}

fn si_parts(x: f64, p: usize) -> (String, &'static str) {
    let (coef, exp) = decimal_parts(x, Some(p));
    let pe = prefix_exponent(exp);
    let symbol = SI_PREFIXES[(8 + pe / 3) as usize];
    let i = exp - pe + 1;
    let n = coef.len() as i32;
    let body = if i == n {
        coef
    } else if i > n {
        format!("{}{}", coef, "0".repeat((i - n) as usize))
    } else if i > 0 {
        format!("{}.{}", &coef[..i as usize], &coef[i as usize..])
    } else {
        let tail_p = (p as i32 + i - 1).max(0) as usize;
        let (tail, _) = decimal_parts(x, if tail_p == 0 { None } else { Some(tail_p) });
        format!("0.{}{}", "0".repeat((-i) as usize), tail)
    };
    (body, symbol)
}

/// Insert thousands separators into the integer part of a plain decimal string.
fn group_thousands(s: &str) -> String {
    let (int, frac) = match s.split_once('.') {
        Some((a, b)) => (a, Some(b)),
        None => (s, None),
    };
    let grouped = match int.parse::<u64>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => int.to_string(),
    };
    match frac {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(specifier: &str, v: f64) -> String {
        specifier.parse::<TickFormat>().unwrap().format(v)
    }

    #[test]
    fn two_significant_digit_si() {
        assert_eq!(fmt(".2s", 1_500_000.0), "1.5M");
        assert_eq!(fmt(".2s", 150.0), "150");
        assert_eq!(fmt(".2s", 42_000.0), "42k");
        assert_eq!(fmt(".2s", 0.5), "500m");
        assert_eq!(fmt(".2s", 0.0), "0.0");
        assert_eq!(fmt(".2s", -2_500.0), "-2.5k");
        assert_eq!(fmt(".2s", 1e-6), "1.0µ");
    }

    #[test]
    fn rounding_can_bump_the_prefix() {
        assert_eq!(fmt(".2s", 999_700.0), "1.0M");
    }

    #[test]
    fn precision_follows_tick_step() {
        let f: TickFormat = "s".parse().unwrap();
        let f = f.for_ticks(0.0, 1_200_000.0, 200_000.0);
        assert_eq!(f.precision, Some(1));
        assert_eq!(f.fixed_prefix, Some(6));
        assert_eq!(f.format(400_000.0), "0.4M");
        assert_eq!(f.format(1_000_000.0), "1.0M");

        let g: TickFormat = "s".parse::<TickFormat>().unwrap().for_ticks(85.0, 210.0, 20.0);
        assert_eq!(g.format(120.0), "120");
    }

    #[test]
    fn fixed_and_grouped() {
        assert_eq!(fmt(",.1f", 1234567.26), "1,234,567.3");
        assert_eq!(fmt(",d", 98765.4), "98,765");
        let f = "f".parse::<TickFormat>().unwrap().for_ticks(0.0, 1.0, 0.2);
        assert_eq!(f.format(0.4), "0.4");
    }

    #[test]
    fn bad_specifiers_are_rejected() {
        assert!("x".parse::<TickFormat>().is_err());
        assert!(".s2".parse::<TickFormat>().is_err());
    }
}
