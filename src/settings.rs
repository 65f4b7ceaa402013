use crate::geometry::{SizePreset, SizePresets};
use crate::license::cache::{DEFAULT_CACHE_DIR, DEFAULT_CONTENT_FILE, DEFAULT_EXTENSION};
use crate::license::gate::CachePolicy;
use crate::license::verifier::EndpointFlavor;
use crate::prompts::DEFAULT_PROMPTS_DIR;
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "settings.json";

/// Display colours of a target profile, as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelTheme {
    pub button_color: String,
    pub submenu_color: String,
    pub size_color: String,
}

impl Default for PanelTheme {
    fn default() -> Self {
        Self {
            button_color: "#10a37f".into(),
            submenu_color: "#0d846b".into(),
            size_color: "#0b6d58".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub theme: PanelTheme,
}

fn default_targets() -> Vec<TargetProfile> {
    vec![
        TargetProfile {
            name: "ChatGPT".into(),
            url: "https://chat.openai.com".into(),
            theme: PanelTheme::default(),
        },
        TargetProfile {
            name: "Grok".into(),
            url: "https://grok.com/".into(),
            theme: PanelTheme {
                button_color: "#1DA1F2".into(),
                submenu_color: "#0C7ABF".into(),
                size_color: "#0A5C8F".into(),
            },
        },
        TargetProfile {
            name: "Claude".into(),
            url: "https://claude.ai".into(),
            theme: PanelTheme {
                button_color: "#F28C38".into(),
                submenu_color: "#D97530".into(),
                size_color: "#C1622A".into(),
            },
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseSettings {
    #[serde(default)]
    pub policy: CachePolicy,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub flavor: EndpointFlavor,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Mixed into cache file names. A deterrent only: anyone holding the
    /// binary or this file can forge a record.
    #[serde(default = "default_secret")]
    pub secret: String,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_content_file")]
    pub content_file: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://everywearai-website.onrender.com/register".into()
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.into()
}

fn default_secret() -> String {
    "float-launcher-activation".into()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.into()
}

fn default_content_file() -> String {
    DEFAULT_CONTENT_FILE.into()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for LicenseSettings {
    fn default() -> Self {
        Self {
            policy: CachePolicy::default(),
            endpoint: default_endpoint(),
            flavor: EndpointFlavor::default(),
            cache_dir: default_cache_dir(),
            secret: default_secret(),
            extension: default_extension(),
            content_file: default_content_file(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_icon_size")]
    pub icon_size: (i32, i32),
    /// Initial icon position. When absent the icon starts 100 px from the
    /// bottom-right corner of the screen.
    #[serde(default)]
    pub icon_position: Option<(i32, i32)>,
    #[serde(default)]
    pub size_presets: SizePresets,
    #[serde(default)]
    pub default_preset: SizePreset,
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default = "default_toast_secs")]
    pub toast_secs: f32,
}

fn default_icon_size() -> (i32, i32) {
    (50, 50)
}

fn default_animation_ms() -> u64 {
    300
}

fn default_toast_secs() -> f32 {
    2.0
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            icon_size: default_icon_size(),
            icon_position: None,
            size_presets: SizePresets::default(),
            default_preset: SizePreset::default(),
            animation_ms: default_animation_ms(),
            toast_secs: default_toast_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub license: LicenseSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default = "default_targets")]
    pub targets: Vec<TargetProfile>,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of the log output.
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_prompts_dir() -> String {
    DEFAULT_PROMPTS_DIR.into()
}

fn default_toasts() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            license: LicenseSettings::default(),
            session: SessionSettings::default(),
            targets: default_targets(),
            prompts_dir: default_prompts_dir(),
            enable_toasts: default_toasts(),
            debug_logging: false,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Return a description of every URL that does not parse. Problems are
    /// also logged.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Err(e) = url::Url::parse(&self.license.endpoint) {
            problems.push(format!("license endpoint '{}': {e}", self.license.endpoint));
        }
        for target in &self.targets {
            if let Err(e) = url::Url::parse(&target.url) {
                problems.push(format!("target '{}' url '{}': {e}", target.name, target.url));
            }
        }
        for p in &problems {
            tracing::warn!("invalid setting: {p}");
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let s = Settings::load(path.to_str().unwrap()).expect("load");
        assert_eq!(s.license.policy, CachePolicy::HashNamed);
        assert_eq!(s.license.timeout_secs, 5);
        assert_eq!(s.session.icon_size, (50, 50));
        assert_eq!(s.targets.len(), 3);
        assert!(s.validate().is_empty());
    }

    #[test]
    fn partial_file_fills_serde_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"license":{"policy":"content","flavor":"validate_token","endpoint":"http://127.0.0.1:1111/validate_token"}}"#,
        )
        .expect("write");
        let s = Settings::load(path.to_str().unwrap()).expect("load");
        assert_eq!(s.license.policy, CachePolicy::Content);
        assert_eq!(s.license.flavor, EndpointFlavor::ValidateToken);
        assert_eq!(s.license.content_file, "api_token.txt");
        assert_eq!(s.session.animation_ms, 300);
        assert!(s.enable_toasts);
    }

    #[test]
    fn save_and_reload_preserves_targets() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let mut s = Settings::default();
        s.targets.truncate(1);
        s.session.default_preset = SizePreset::Large;
        s.save(path.to_str().unwrap()).expect("save");
        let loaded = Settings::load(path.to_str().unwrap()).expect("load");
        assert_eq!(loaded.targets, s.targets);
        assert_eq!(loaded.session.default_preset, SizePreset::Large);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, [0xff, 0xfe, 0xfd]).expect("write");
        assert!(Settings::load(path.to_str().unwrap()).is_err());

        let as_dir = dir.path().join("nested");
        std::fs::create_dir(&as_dir).expect("mkdir");
        assert!(Settings::load(as_dir.to_str().unwrap()).is_err());
    }

    #[test]
    fn invalid_urls_are_reported() {
        let mut s = Settings::default();
        s.license.endpoint = "not a url".into();
        s.targets[0].url = "::".into();
        assert_eq!(s.validate().len(), 2);
    }
}
