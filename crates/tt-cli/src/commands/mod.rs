pub mod character;
pub mod play;
pub mod template;
pub mod tropes;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seeded RNG when a seed is given, OS entropy otherwise.
fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Shorten `text` to `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
