//! Target-size labels.
//!
//! Target sizes are recorded in the traditional two-tier system: *sun* (寸)
//! and *bu* (分), where one sun is ten bu. Labels are free text typed in by
//! hand, so an unreadable label is an ordinary outcome rather than an error.

use std::sync::LazyLock;

use regex::Regex;

/// Label used for months without data in a reconstructed history.
pub const NO_DATA_LABEL: &str = "-";

static SUN_AND_BU: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([0-9]+)寸([0-9]+)分").expect("valid regex"));
static SUN_ONLY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([0-9]+)寸").expect("valid regex"));
static BU_ONLY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([0-9]+)分$").expect("valid regex"));

/// Convert a label such as `"1寸2分"` into sun, e.g. `1.2`.
///
/// Patterns are tried in order: sun and bu, sun only, then bu only (which
/// must be the whole label). Returns `None` for anything else, including
/// [`NO_DATA_LABEL`].
///
/// ```
/// use matoba_core::target::parse_target_size;
///
/// assert_eq!(parse_target_size("1寸"), Some(1.0));
/// assert_eq!(parse_target_size("-"), None);
/// ```
pub fn parse_target_size(label: &str) -> Option<f64> {
  if let Some(caps) = SUN_AND_BU.captures(label) {
    let sun = number(&caps[1])?;
    let bu = number(&caps[2])?;
    return Some(sun + bu * 0.1);
  }

  if let Some(caps) = SUN_ONLY.captures(label) {
    return number(&caps[1]);
  }

  if let Some(caps) = BU_ONLY.captures(label) {
    return Some(number(&caps[1])? * 0.1);
  }

  None
}

fn number(digits: &str) -> Option<f64> { digits.parse::<u64>().ok().map(|n| n as f64) }
