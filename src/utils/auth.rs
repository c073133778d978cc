/// Compare a supplied API key with the configured one in constant time.
///
/// Every byte of the expected key is visited regardless of where the first
/// mismatch is. An empty configured key never matches.
pub fn verify_api_key(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    if expected.is_empty() {
        return false;
    }

    let mut diff = provided.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        let other = provided.get(i).copied().unwrap_or(0);
        diff |= usize::from(other ^ byte);
    }

    diff == 0
}
