use std::{fs, path::PathBuf};

use dirs::data_dir;
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let root = base.join("kinquest");
    if let Err(err) = fs::create_dir_all(&root) {
        tracing::warn!("failed to create data root {:?}: {err}", root);
    }
    root
});

static LOCATION_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("valid location key regex"));

pub fn database_path() -> PathBuf {
    DATA_ROOT.join("kinquest.sqlite")
}

/// Location keys are 5-digit postal codes, same format the profile layer enforces.
pub fn is_valid_location_key(key: &str) -> bool {
    LOCATION_KEY_RE.is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_key_format() {
        assert!(is_valid_location_key("90210"));
        assert!(!is_valid_location_key(""));
        assert!(!is_valid_location_key("9021"));
        assert!(!is_valid_location_key("902100"));
        assert!(!is_valid_location_key("9021a"));
        assert!(!is_valid_location_key(" 90210"));
    }
}
