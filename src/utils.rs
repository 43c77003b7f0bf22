use crate::models::Library;

/// OS name as used by the library rules in version JSON files.
pub fn get_os_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "osx",
        "windows" => "windows",
        _ => "linux",
    }
}

pub fn is_library_allowed(lib: &Library, os_name: &str) -> bool {
    let rules = match &lib.rules {
        Some(r) => r,
        None => return true,
    };
    let mut allowed = false;
    for rule in rules {
        let matches = if let Some(os) = &rule.os {
            if let Some(name) = &os.name {
                name == os_name
            } else {
                true
            }
        } else {
            true
        };
        if matches {
            allowed = rule.action == "allow";
        }
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(rules: &str) -> Library {
        serde_json::from_str(&format!(r#"{{"name": "org.lwjgl:lwjgl:3.3.1", "rules": {rules}}}"#)).unwrap()
    }

    #[test]
    fn library_without_rules_is_allowed() {
        let lib: Library = serde_json::from_str(r#"{"name": "com.mojang:brigadier:1.1.8"}"#).unwrap();
        assert!(is_library_allowed(&lib, "linux"));
    }

    #[test]
    fn last_matching_rule_wins() {
        let lib = library(r#"[{"action": "allow"}, {"action": "disallow", "os": {"name": "osx"}}]"#);
        assert!(is_library_allowed(&lib, "linux"));
        assert!(!is_library_allowed(&lib, "osx"));
    }

    #[test]
    fn os_specific_allow_excludes_others() {
        let lib = library(r#"[{"action": "allow", "os": {"name": "windows"}}]"#);
        assert!(is_library_allowed(&lib, "windows"));
        assert!(!is_library_allowed(&lib, "linux"));
    }
}
