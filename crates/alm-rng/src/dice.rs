//! Dice notation parsing and rolling.
//!
//! Supports `NdM`, `NdM+K`, and `NdM-K` (e.g. `2d6+1`). Malformed notation
//! never aborts a roll: it yields an invalid result with total 0, so a bad
//! duration string in an event definition cannot halt day resolution.

use crate::SeededRng;

/// Upper bound on the dice count, so a typo cannot request millions of rolls.
const MAX_DICE: i64 = 1000;

/// The outcome of rolling a dice-notation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    /// The notation as supplied by the caller.
    pub notation: String,
    /// The individual die values, in roll order. Empty when invalid.
    pub rolls: Vec<i64>,
    /// The flat modifier (`+K`/`-K`), 0 when absent or invalid.
    pub modifier: i64,
    /// Sum of all rolls plus the modifier. 0 when invalid.
    pub total: i64,
    /// Whether the notation parsed successfully.
    pub valid: bool,
}

impl DiceRoll {
    /// Construct the zero-total marker result for malformed notation.
    fn invalid(notation: &str) -> Self {
        Self {
            notation: notation.to_string(),
            rolls: Vec::new(),
            modifier: 0,
            total: 0,
            valid: false,
        }
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.valid {
            return write!(f, "{}: invalid notation = 0", self.notation);
        }
        let values: Vec<String> = self.rolls.iter().map(|v| v.to_string()).collect();
        write!(f, "{}: [{}]", self.notation, values.join(", "))?;
        match self.modifier.cmp(&0) {
            std::cmp::Ordering::Greater => write!(f, " + {}", self.modifier)?,
            std::cmp::Ordering::Less => write!(f, " - {}", -self.modifier)?,
            std::cmp::Ordering::Equal => {}
        }
        write!(f, " = {}", self.total)
    }
}

/// A parsed `NdM+K` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Notation {
    count: i64,
    sides: i64,
    modifier: i64,
}

/// Parse a bare digit sequence, rejecting explicit signs.
fn parse_unsigned(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

/// Parse dice notation. Returns `None` for anything malformed.
fn parse_notation(input: &str) -> Option<Notation> {
    let s = input.trim().to_lowercase();
    let (count_part, rest) = s.split_once('d')?;

    let count = if count_part.is_empty() {
        1
    } else {
        parse_unsigned(count_part)?
    };

    let (sides_part, modifier) = if let Some((sides, k)) = rest.split_once('+') {
        (sides, parse_unsigned(k)?)
    } else if let Some((sides, k)) = rest.split_once('-') {
        (sides, -parse_unsigned(k)?)
    } else {
        (rest, 0)
    };
    let sides = sides_part.parse::<i64>().ok()?;

    if count < 1 || count > MAX_DICE || sides < 1 {
        return None;
    }
    Some(Notation {
        count,
        sides,
        modifier,
    })
}

impl SeededRng {
    /// Roll a dice-notation expression such as `2d6+1`.
    ///
    /// Malformed notation returns an invalid [`DiceRoll`] with total 0
    /// rather than an error, and consumes no randomness.
    pub fn roll_dice(&mut self, notation: &str) -> DiceRoll {
        let Some(parsed) = parse_notation(notation) else {
            return DiceRoll::invalid(notation);
        };
        let rolls: Vec<i64> = (0..parsed.count)
            .map(|_| self.random_int(1, parsed.sides))
            .collect();
        let total = rolls.iter().sum::<i64>() + parsed.modifier;
        DiceRoll {
            notation: notation.to_string(),
            rolls,
            modifier: parsed.modifier,
            total,
            valid: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain() {
        assert_eq!(
            parse_notation("2d6"),
            Some(Notation {
                count: 2,
                sides: 6,
                modifier: 0
            })
        );
    }

    #[test]
    fn parse_with_positive_modifier() {
        assert_eq!(
            parse_notation("3d8+2"),
            Some(Notation {
                count: 3,
                sides: 8,
                modifier: 2
            })
        );
    }

    #[test]
    fn parse_with_negative_modifier() {
        assert_eq!(
            parse_notation("1d20-4"),
            Some(Notation {
                count: 1,
                sides: 20,
                modifier: -4
            })
        );
    }

    #[test]
    fn parse_implicit_count() {
        assert_eq!(
            parse_notation("d10"),
            Some(Notation {
                count: 1,
                sides: 10,
                modifier: 0
            })
        );
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(
            parse_notation("  2D6+1 "),
            Some(Notation {
                count: 2,
                sides: 6,
                modifier: 1
            })
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "d", "2d", "xdy", "2d6+", "0d6", "2d0", "-1d6", "+2d6", "6", "2d6++1"] {
            assert_eq!(parse_notation(bad), None, "should reject {bad:?}");
        }
    }

    #[test]
    fn parse_rejects_excessive_count() {
        assert_eq!(parse_notation("100000d6"), None);
    }

    #[test]
    fn roll_valid_notation() {
        let mut rng = SeededRng::new(42);
        let roll = rng.roll_dice("4d6+2");
        assert!(roll.valid);
        assert_eq!(roll.rolls.len(), 4);
        assert_eq!(roll.modifier, 2);
        assert!(roll.rolls.iter().all(|&v| (1..=6).contains(&v)));
        assert_eq!(roll.total, roll.rolls.iter().sum::<i64>() + 2);
    }

    #[test]
    fn roll_golden_seed_12345() {
        // floor(0.9797... * 6) + 1 = 6, floor(0.3067... * 6) + 1 = 2
        let mut rng = SeededRng::new(12345);
        let roll = rng.roll_dice("2d6+1");
        assert_eq!(roll.rolls, vec![6, 2]);
        assert_eq!(roll.total, 9);
    }

    #[test]
    fn roll_malformed_is_zero_and_consumes_nothing() {
        let mut rng = SeededRng::new(12345);
        let before = rng.state();
        let roll = rng.roll_dice("not dice");
        assert!(!roll.valid);
        assert_eq!(roll.total, 0);
        assert!(roll.rolls.is_empty());
        assert_eq!(rng.state(), before);
    }

    #[test]
    fn roll_is_deterministic() {
        let mut a = SeededRng::new(9);
        let mut b = SeededRng::new(9);
        assert_eq!(a.roll_dice("5d12-3"), b.roll_dice("5d12-3"));
    }

    #[test]
    fn display_breakdown() {
        let mut rng = SeededRng::new(12345);
        let roll = rng.roll_dice("2d6+1");
        assert_eq!(roll.to_string(), "2d6+1: [6, 2] + 1 = 9");
    }

    #[test]
    fn display_negative_modifier() {
        let mut rng = SeededRng::new(12345);
        let roll = rng.roll_dice("2d6-1");
        assert_eq!(roll.to_string(), "2d6-1: [6, 2] - 1 = 7");
    }

    #[test]
    fn display_invalid() {
        let mut rng = SeededRng::new(1);
        let roll = rng.roll_dice("oops");
        assert_eq!(roll.to_string(), "oops: invalid notation = 0");
    }
}
