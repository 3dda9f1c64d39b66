//! Result presentation.
//!
//! Renders recommendation records for display. Images come exclusively
//! from the cache, joined on `img-{id}` — never from anything the model
//! produced. A cache miss renders a placeholder, and zero recommendations
//! render a distinct no-results state rather than an empty list.

use crate::cache::{image_key, KvCache};
use crate::recommend::Recommendation;

/// Shown when the pipeline produced no recommendations.
pub const NO_RESULTS: &str = "No recommendations found.";

/// Placeholder when no cached image exists for a recommended id.
const NO_IMAGE: &str = "(no image available)";

/// Render recommendations as display text, resolving images from `cache`.
pub fn render_text(recommendations: &[Recommendation], cache: &dyn KvCache) -> String {
    if recommendations.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    for (index, rec) in recommendations.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let image = cache
            .get(&image_key(&rec.id))
            .unwrap_or_else(|| NO_IMAGE.to_string());
        out.push_str(&format!("{}. {} ({})\n", index + 1, rec.name, rec.id));
        out.push_str(&format!("   image: {image}\n"));
        out.push_str(&format!("   {}\n", rec.summary));
        if let Some(unique) = &rec.unique {
            out.push_str(&format!("   {unique}\n"));
        }
        out.push_str(&format!("   {}\n", rec.reason));
    }
    out
}
