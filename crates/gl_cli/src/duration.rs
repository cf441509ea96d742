use std::str::FromStr;
use std::time::Duration;

/// Durations such as `1500ms`, `5s`, `2m` or `1m30s`. A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut number = String::new();
        let mut unit = String::new();
        let mut parts = 0;

        for c in s.chars() {
            if c.is_ascii_digit() {
                if !unit.is_empty() {
                    total = add(total, component(&number, &unit)?, s)?;
                    parts += 1;
                    number.clear();
                    unit.clear();
                }
                number.push(c);
            } else if c.is_ascii_alphabetic() {
                if number.is_empty() {
                    return Err(format!("Duration unit without a number: {}", s));
                }
                unit.push(c);
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        if !number.is_empty() {
            total = add(total, component(&number, &unit)?, s)?;
            parts += 1;
        }
        if parts == 0 {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(total))
    }
}

fn component(number: &str, unit: &str) -> Result<Duration, String> {
    let invalid = || format!("Invalid number in duration: {}", number);
    let n: u64 = number.parse().map_err(|_| invalid())?;
    let secs = |factor: u64| n.checked_mul(factor).map(Duration::from_secs).ok_or_else(invalid);
    match unit {
        "ms" => Ok(Duration::from_millis(n)),
        "" | "s" => Ok(Duration::from_secs(n)),
        "m" => secs(60),
        "h" => secs(3600),
        _ => Err(format!("Invalid duration unit: {}", unit)),
    }
}

fn add(total: Duration, part: Duration, input: &str) -> Result<Duration, String> {
    total
        .checked_add(part)
        .ok_or_else(|| format!("Duration too large: {}", input))
}
