//! Plaintext password policy, applied before a password is ever hashed.

use crate::constants::{MIN_PASSWORD_LENGTH, PASSWORD_SYMBOLS};

/// Checks a plaintext password against the account policy: at least
/// eight characters, at least one letter, one digit and one symbol from
/// [`PASSWORD_SYMBOLS`], and nothing outside those three classes.
pub fn check_password_policy(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters");
    }

    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(is_symbol);
    let only_allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_symbol(c));

    if !(has_letter && has_digit && has_symbol && only_allowed) {
        return Err("Password must contain at least one letter, one number, and one symbol");
    }

    Ok(())
}

/// Generates a random password that satisfies [`check_password_policy`].
#[must_use]
pub fn generate_password(length: usize) -> String {
    use rand::Rng;
    use rand::seq::{IndexedRandom, SliceRandom};

    const LETTERS: &[u8] = b"abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";
    const DIGITS: &[u8] = b"23456789";

    let length = length.max(MIN_PASSWORD_LENGTH);
    let symbols = PASSWORD_SYMBOLS.as_bytes();
    let mut rng = rand::rng();

    let mut chars: Vec<u8> = Vec::with_capacity(length);
    chars.extend(LETTERS.choose(&mut rng));
    chars.extend(DIGITS.choose(&mut rng));
    chars.extend(symbols.choose(&mut rng));

    let pool: Vec<u8> = [LETTERS, DIGITS, symbols].concat();
    while chars.len() < length {
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compliant_passwords() {
        assert!(check_password_policy("Newpassword1*").is_ok());
        assert!(check_password_policy("Updatedpassword*1").is_ok());
        assert!(check_password_policy("a1@aaaaa").is_ok());
    }

    #[test]
    fn rejects_short_passwords() {
        assert_eq!(
            check_password_policy("a1@"),
            Err("Password must be at least 8 characters")
        );
    }

    #[test]
    fn rejects_missing_character_classes() {
        assert!(check_password_policy("password").is_err());
        assert!(check_password_policy("password1").is_err());
        assert!(check_password_policy("password!").is_err());
        assert!(check_password_policy("12345678!").is_err());
    }

    #[test]
    fn rejects_characters_outside_allowed_set() {
        assert!(check_password_policy("Passw0rd! with spaces").is_err());
        assert!(check_password_policy("Passw0rd!^").is_err());
    }

    #[test]
    fn generated_passwords_satisfy_policy() {
        for _ in 0..50 {
            let password = generate_password(16);
            assert_eq!(password.len(), 16);
            assert!(check_password_policy(&password).is_ok(), "{password}");
        }
    }
}
