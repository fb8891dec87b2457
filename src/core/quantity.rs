/// Quantity resolver — plain integers and `NdM[+/-B]` dice notation.

use rand::Rng;

use crate::core::rng::unit;

/// Dice counts above this are treated as malformed.
const MAX_DICE: u32 = 1000;

/// A parsed quantity formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityFormula {
    Fixed(u32),
    Dice { count: u32, sides: u32, bonus: i32 },
}

impl QuantityFormula {
    /// Parse `\d+` or `\d+d\d+([+-]\d+)?`. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Option<QuantityFormula> {
        let input = input.trim();
        if let Some(n) = parse_digits(input) {
            return Some(QuantityFormula::Fixed(n));
        }

        let (count, rest) = input.split_once('d')?;
        let count = parse_digits(count)?;

        let (sides, bonus) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (sides, signed) = rest.split_at(pos);
                let magnitude = i32::try_from(parse_digits(&signed[1..])?).ok()?;
                let bonus = if signed.starts_with('-') { -magnitude } else { magnitude };
                (parse_digits(sides)?, bonus)
            }
            None => (parse_digits(rest)?, 0),
        };

        if sides == 0 || count > MAX_DICE {
            return None;
        }
        Some(QuantityFormula::Dice { count, sides, bonus })
    }

    /// Evaluate the formula; the result is never below 1.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let total: i64 = match *self {
            QuantityFormula::Fixed(n) => i64::from(n),
            QuantityFormula::Dice { count, sides, bonus } => {
                let rolled: i64 = (0..count).map(|_| i64::from(roll_die(rng, sides))).sum();
                rolled + i64::from(bonus)
            }
        };
        clamp_quantity(total)
    }

    /// Smallest and largest possible results.
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            QuantityFormula::Fixed(n) => (n.max(1), n.max(1)),
            QuantityFormula::Dice { count, sides, bonus } => {
                let lo = i64::from(count) + i64::from(bonus);
                let hi = i64::from(count) * i64::from(sides) + i64::from(bonus);
                (clamp_quantity(lo), clamp_quantity(hi))
            }
        }
    }
}

fn clamp_quantity(total: i64) -> u32 {
    u32::try_from(total.max(1)).unwrap_or(u32::MAX)
}

/// Digits only, no sign. Oversized values fail to parse.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn roll_die<R: Rng + ?Sized>(rng: &mut R, sides: u32) -> u32 {
    let face = 1 + (unit(rng) * f64::from(sides)) as u32;
    face.min(sides)
}

/// Resolve a formula string to a quantity. Unparseable input yields 1.
pub fn resolve_quantity<R: Rng + ?Sized>(formula: &str, rng: &mut R) -> u32 {
    match QuantityFormula::parse(formula) {
        Some(parsed) => parsed.roll(rng),
        None => {
            tracing::debug!("unparseable quantity formula {:?}, using 1", formula);
            1
        }
    }
}
