/// API key generation and hashing
///
/// Every directory user owns exactly one API key. The key is generated by the server
/// at registration, returned to the caller once, and stored only as a SHA-256 digest.
/// Authentication looks the caller up by that digest.
///
/// # Key Format
///
/// `udk_` followed by 32 random base62 characters (36 chars total). The key is pure
/// randomness; it is not derived from any user field.
///
/// # Example
///
/// ```
/// use userdir_shared::auth::api_key::{generate_api_key, hash_api_key, validate_api_key_format};
///
/// let (key, hash) = generate_api_key();
/// assert!(key.starts_with("udk_"));
/// assert!(validate_api_key_format(&key));
/// assert_eq!(hash_api_key(&key), hash);
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the API key (characters)
const KEY_RANDOM_LENGTH: usize = 32;

/// API key prefix
pub const KEY_PREFIX: &str = "udk_";

/// Total length of an API key (prefix + random)
pub const API_KEY_LENGTH: usize = KEY_PREFIX.len() + KEY_RANDOM_LENGTH;

/// Generates a new API key
///
/// Key space is 62^32 (about 2^190), drawn from `rand::thread_rng()`.
///
/// # Returns
///
/// Tuple of (plaintext_key, sha256_hex_hash)
pub fn generate_api_key() -> (String, String) {
    let key = format!("{}{}", KEY_PREFIX, generate_random_string(KEY_RANDOM_LENGTH));
    let hash = hash_api_key(&key);

    (key, hash)
}

/// Generates a random base62 string
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hashes an API key using SHA-256
///
/// # Returns
///
/// Lowercase hex digest (64 characters)
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checks that a key has the `udk_` prefix, the right length and a base62 body
///
/// Malformed keys can be rejected without a store lookup.
pub fn validate_api_key_format(key: &str) -> bool {
    if key.len() != API_KEY_LENGTH {
        return false;
    }

    match key.strip_prefix(KEY_PREFIX) {
        Some(random_part) => random_part.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Returns a log-safe prefix of a key, e.g. `udk_AbCd...`
pub fn display_prefix(key: &str) -> String {
    let visible: String = key.chars().take(KEY_PREFIX.len() + 4).collect();
    format!("{}...", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_api_key() {
        let (key1, hash1) = generate_api_key();
        let (key2, hash2) = generate_api_key();

        assert!(key1.starts_with("udk_"));
        assert_eq!(key1.len(), API_KEY_LENGTH);
        assert_eq!(key1.len(), 36);

        assert_ne!(key1, key2);
        assert_ne!(hash1, hash2);

        assert_eq!(hash1.len(), 64);
        assert_eq!(hash2.len(), 64);
    }

    #[test]
    fn test_generated_keys_do_not_repeat() {
        let keys: std::collections::HashSet<String> =
            (0..1000).map(|_| generate_api_key().0).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_hash_api_key_is_deterministic() {
        let hash = hash_api_key("udk_test123");

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_api_key("udk_test123"));
        assert_ne!(hash, hash_api_key("udk_different"));
    }

    #[test]
    fn test_validate_api_key_format() {
        assert!(validate_api_key_format("udk_abcdefghijklmnopqrstuvwxyz123456"));
        assert!(validate_api_key_format("udk_ABCDEFGHIJKLMNOPQRSTUVWXYZ123456"));

        // wrong prefix
        assert!(!validate_api_key_format("key_abcdefghijklmnopqrstuvwxyz123456"));
        // too short / too long
        assert!(!validate_api_key_format("udk_short"));
        assert!(!validate_api_key_format("udk_abcdefghijklmnopqrstuvwxyz1234567"));
        // special and non-ascii characters
        assert!(!validate_api_key_format("udk_abc!@#$%^&*()_+={}[]|\\:;\"'<>?/"));
        assert!(!validate_api_key_format("udk_ééééééééééééééé"));
        // legacy uuid-shaped keys
        assert!(!validate_api_key_format("bf7e5609-dfc4-42ed-afd5-f342d3f9bc13"));
    }

    #[test]
    fn test_display_prefix_hides_key_body() {
        let (key, _) = generate_api_key();
        let shown = display_prefix(&key);

        assert!(shown.starts_with("udk_"));
        assert!(shown.ends_with("..."));
        assert_eq!(shown.len(), 11);
        assert!(!shown.contains(&key[8..]));
    }

    #[test]
    fn test_generate_random_string() {
        let s = generate_random_string(32);

        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
