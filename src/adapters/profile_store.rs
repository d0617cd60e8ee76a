//! Configuration profile persistence
//!
//! Save/load/list/delete `ClientConfig` profiles as JSON files, one
//! `<name>.json` per profile, in a caller-chosen directory.

use std::path::{Path, PathBuf};

use crate::domain::{ClientConfig, FirmataError, FirmataResult};

/// Sanitize a profile name to prevent path traversal.
/// Rejects anything with path separators, "..", or empty strings.
pub fn sanitize_name(name: &str) -> FirmataResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FirmataError::Config("Profile name cannot be empty".into()));
    }
    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FirmataError::Config(format!("Invalid profile name: '{trimmed}'")));
    }
    // Only allow alphanumeric, spaces, hyphens, underscores
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(FirmataError::Config(format!(
            "Profile name contains invalid characters: '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

fn profile_path(dir: &Path, name: &str) -> FirmataResult<PathBuf> {
    let name = sanitize_name(name)?;
    Ok(dir.join(format!("{name}.json")))
}

pub fn save_profile(dir: &Path, config: &ClientConfig) -> FirmataResult<()> {
    let path = profile_path(dir, &config.name)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| FirmataError::Config(format!("Failed to create {}: {e}", dir.display())))?;
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| FirmataError::Config(format!("Serialization error: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| FirmataError::Config(format!("Failed to write profile: {e}")))?;
    log::info!("Saved profile to {}", path.display());
    Ok(())
}

pub fn load_profile(dir: &Path, name: &str) -> FirmataResult<ClientConfig> {
    let path = profile_path(dir, name)?;
    let json = std::fs::read_to_string(&path)
        .map_err(|e| FirmataError::Config(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&json)
        .map_err(|e| FirmataError::Config(format!("Invalid profile {}: {e}", path.display())))
}

/// Names of every saved profile, sorted
pub fn list_profiles(dir: &Path) -> FirmataResult<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir)
        .map_err(|e| FirmataError::Config(format!("Failed to read {}: {e}", dir.display())))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

pub fn delete_profile(dir: &Path, name: &str) -> FirmataResult<()> {
    let path = profile_path(dir, name)?;
    std::fs::remove_file(&path)
        .map_err(|e| FirmataError::Config(format!("Failed to delete {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> ClientConfig {
        ClientConfig {
            name: name.to_string(),
            serial_port: Some("/dev/ttyACM0".into()),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_name("../etc/passwd").is_err());
        assert!(sanitize_name("a/b").is_err());
        assert!(sanitize_name("a\\b").is_err());
        assert!(sanitize_name("   ").is_err());
        assert!(sanitize_name("semi;colon").is_err());
    }

    #[test]
    fn sanitize_trims_valid_names() {
        assert_eq!(sanitize_name("  Greenhouse Uno ").unwrap(), "Greenhouse Uno");
        assert_eq!(sanitize_name("bench-2_b").unwrap(), "bench-2_b");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = profile("Greenhouse");
        save_profile(dir.path(), &config).unwrap();
        assert_eq!(load_profile(dir.path(), "Greenhouse").unwrap(), config);
    }

    #[test]
    fn list_returns_sorted_names() {
        let dir = tempfile::tempdir().unwrap();
        save_profile(dir.path(), &profile("bench")).unwrap();
        save_profile(dir.path(), &profile("attic")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();
        assert_eq!(list_profiles(dir.path()).unwrap(), vec!["attic", "bench"]);
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_profiles(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_profile() {
        let dir = tempfile::tempdir().unwrap();
        save_profile(dir.path(), &profile("attic")).unwrap();
        delete_profile(dir.path(), "attic").unwrap();
        assert!(load_profile(dir.path(), "attic").is_err());
        assert!(delete_profile(dir.path(), "attic").is_err());
    }

    #[test]
    fn load_rejects_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        assert!(matches!(
            load_profile(dir.path(), "broken"),
            Err(FirmataError::Config(_))
        ));
    }
}
