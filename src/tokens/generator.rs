use rand::Rng;

/// Length of generated access and re-entry tokens.
pub const TOKEN_LENGTH: usize = 6;

/// Generate a uniformly random 6-digit numeric token, leading zeros
/// preserved ("000000" through "999999").
pub fn generate_numeric_token() -> String {
    let mut rng = rand::thread_rng();
    let n: u32 = rng.gen_range(0..1_000_000);
    format!("{n:06}")
}

/// Check a manually supplied token: digits only, 4 or 6 characters.
pub fn is_valid_manual_token(token: &str) -> bool {
    (token.len() == 4 || token.len() == TOKEN_LENGTH)
        && token.chars().all(|c| c.is_ascii_digit())
}
