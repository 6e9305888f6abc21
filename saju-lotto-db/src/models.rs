use anyhow::{bail, Result};

/// Highest number in the 6/45 pool.
pub const POOL_SIZE: u8 = 45;
/// Main numbers per draw (the bonus is drawn on top).
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone)]
pub struct Draw {
    pub draw_no: u32,
    pub date: String,
    pub numbers: [u8; 6],
    pub bonus: u8,
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

pub fn validate_draw(numbers: &[u8; 6], bonus: u8) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            bail!("Number {} out of range (1-{})", n, POOL_SIZE);
        }
    }
    if bonus < 1 || bonus > POOL_SIZE {
        bail!("Bonus number {} out of range (1-{})", bonus, POOL_SIZE);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    if numbers.contains(&bonus) {
        bail!("Bonus number {} repeats a main number", bonus);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_draw_ok() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 7).is_ok());
        assert!(validate_draw(&[45, 44, 43, 42, 41, 40], 1).is_ok());
    }

    #[test]
    fn test_validate_draw_out_of_range() {
        assert!(validate_draw(&[0, 2, 3, 4, 5, 6], 7).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 46], 7).is_err());
    }

    #[test]
    fn test_validate_draw_bonus_out_of_range() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 0).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 46).is_err());
    }

    #[test]
    fn test_validate_draw_duplicates() {
        assert!(validate_draw(&[1, 1, 3, 4, 5, 6], 7).is_err());
    }

    #[test]
    fn test_validate_draw_bonus_in_main() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 3).is_err());
    }
}
