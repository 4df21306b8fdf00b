//! Generated plugin-registrant artifacts
//!
//! Every native platform gets a file generated by `flutter pub get` that wires
//! plugins into the embedder. The plugin names referenced in it are pulled out
//! with a fixed, ordered set of regular expressions per platform.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use detective_core::Platform;

/// Where a platform's registrant lives and how to read plugin names out of it
#[derive(Debug)]
pub struct RegistrantSpec {
    pub platform: Platform,
    /// Path relative to the project root
    pub relative_path: &'static str,
    /// Sentinel plugin name used when the file itself is missing
    pub sentinel: &'static str,
    patterns: &'static LazyLock<Vec<Regex>>,
}

impl RegistrantSpec {
    pub fn path_in(&self, project_path: &Path) -> PathBuf {
        project_path.join(self.relative_path)
    }

    /// Plugin names referenced by the registrant, in discovery order
    pub fn extract_plugin_names(&self, content: &str) -> Vec<String> {
        extract_with(self.patterns, content)
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Invalid registrant regex"))
        .collect()
}

// GeneratedPluginRegistrant.java
static ANDROID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"Error registering plugin (\w+)",
        r"(\w+)Plugin\.register",
        r#"registrarFor\("([^"]+)"\)"#,
    ])
});

// GeneratedPluginRegistrant.m
static IOS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"#import <(\w+)/",
        r"@import (\w+);",
        r#"registrarForPlugin:@"(\w+)""#,
    ])
});

// GeneratedPluginRegistrant.swift
static MACOS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?m)^import (\w+)\s*$",
        r#"registrar\(forPlugin: "(\w+)"\)"#,
    ])
});

// generated_plugin_registrant.cc (Windows and Linux share the C++ shape)
static DESKTOP_CPP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"#include <(\w+)/",
        r#"GetRegistrarForPlugin\("(\w+)"\)"#,
        r#"get_registrar_for_plugin\(\s*registry,\s*"(\w+)"\)"#,
    ])
});

static ANDROID: RegistrantSpec = RegistrantSpec {
    platform: Platform::Android,
    relative_path: "android/app/src/main/java/io/flutter/plugins/GeneratedPluginRegistrant.java",
    sentinel: "android_registrant",
    patterns: &ANDROID_PATTERNS,
};

static IOS: RegistrantSpec = RegistrantSpec {
    platform: Platform::Ios,
    relative_path: "ios/Runner/GeneratedPluginRegistrant.m",
    sentinel: "ios_registrant",
    patterns: &IOS_PATTERNS,
};

static MACOS: RegistrantSpec = RegistrantSpec {
    platform: Platform::Macos,
    relative_path: "macos/Flutter/GeneratedPluginRegistrant.swift",
    sentinel: "macos_registrant",
    patterns: &MACOS_PATTERNS,
};

static WINDOWS: RegistrantSpec = RegistrantSpec {
    platform: Platform::Windows,
    relative_path: "windows/flutter/generated_plugin_registrant.cc",
    sentinel: "windows_registrant",
    patterns: &DESKTOP_CPP_PATTERNS,
};

static LINUX: RegistrantSpec = RegistrantSpec {
    platform: Platform::Linux,
    relative_path: "linux/flutter/generated_plugin_registrant.cc",
    sentinel: "linux_registrant",
    patterns: &DESKTOP_CPP_PATTERNS,
};

/// Registrant description for a native platform; `None` for web and sentinels
pub fn registrant_for(platform: Platform) -> Option<&'static RegistrantSpec> {
    match platform {
        Platform::Android => Some(&ANDROID),
        Platform::Ios => Some(&IOS),
        Platform::Macos => Some(&MACOS),
        Platform::Windows => Some(&WINDOWS),
        Platform::Linux => Some(&LINUX),
        Platform::Web | Platform::All | Platform::Unknown => None,
    }
}

/// Union of the first capture group of every match, pattern by pattern
fn extract_with(patterns: &[Regex], content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for pattern in patterns {
        for captures in pattern.captures_iter(content) {
            if let Some(name) = captures.get(1).map(|m| m.as_str()) {
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

// ─────────────────────────────────────────────────────────────────────────────
// Name matching
// ─────────────────────────────────────────────────────────────────────────────

/// Platform-implementation suffixes of federated plugins
/// (`camera_avfoundation`, `path_provider_foundation`, `url_launcher_linux`)
const FEDERATED_SUFFIXES: &[&str] = &[
    "avfoundation",
    "foundation",
    "android",
    "darwin",
    "ios",
    "macos",
    "windows",
    "linux",
    "web",
    "wkwebview",
];

/// Reduce a package or class name to a comparable stem.
///
/// `CameraPlugin`, `camera_avfoundation` and
/// `io.flutter.plugins.camera.CameraPlugin` all become `camera`.
pub fn normalize_plugin_name(name: &str) -> String {
    let last_segment = name.rsplit('.').next().unwrap_or(name);
    let mut stem: String = last_segment
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();

    if let Some(stripped) = stem.strip_suffix("plugin") {
        if !stripped.is_empty() {
            stem = stripped.to_string();
        }
    }
    for suffix in FEDERATED_SUFFIXES {
        if let Some(stripped) = stem.strip_suffix(suffix) {
            if !stripped.is_empty() {
                stem = stripped.to_string();
                break;
            }
        }
    }
    stem
}

/// Whether a declared plugin appears among the names found in a registrant
pub fn is_registered(plugin: &str, registered: &[String]) -> bool {
    let wanted = normalize_plugin_name(plugin);
    registered
        .iter()
        .any(|name| name == plugin || normalize_plugin_name(name) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_REGISTRANT: &str = r#"package io.flutter.plugins;

import androidx.annotation.Keep;
import androidx.annotation.NonNull;
import io.flutter.Log;

import io.flutter.embedding.engine.FlutterEngine;

@Keep
public final class GeneratedPluginRegistrant {
  private static final String TAG = "GeneratedPluginRegistrant";
  public static void registerWith(@NonNull FlutterEngine flutterEngine) {
    try {
      flutterEngine.getPlugins().add(new io.flutter.plugins.camera.CameraPlugin());
    } catch (Exception e) {
      Log.e(TAG, "Error registering plugin camera_android, io.flutter.plugins.camera.CameraPlugin", e);
    }
    try {
      flutterEngine.getPlugins().add(new io.flutter.plugins.sharedpreferences.SharedPreferencesPlugin());
    } catch (Exception e) {
      Log.e(TAG, "Error registering plugin shared_preferences_android, io.flutter.plugins.sharedpreferences.SharedPreferencesPlugin", e);
    }
  }
}
"#;

    const IOS_REGISTRANT: &str = r#"#import "GeneratedPluginRegistrant.h"

#if __has_include(<camera_avfoundation/CameraPlugin.h>)
#import <camera_avfoundation/CameraPlugin.h>
#else
@import camera_avfoundation;
#endif

@implementation GeneratedPluginRegistrant

+ (void)registerWithRegistry:(NSObject<FlutterPluginRegistry>*)registry {
  [CameraPlugin registerWithRegistrar:[registry registrarForPlugin:@"CameraPlugin"]];
}

@end
"#;

    const MACOS_REGISTRANT: &str = r#"import FlutterMacOS
import Foundation

import path_provider_foundation

func RegisterGeneratedPlugins(registry: FlutterPluginRegistry) {
  PathProviderPlugin.register(with: registry.registrar(forPlugin: "PathProviderPlugin"))
}
"#;

    const LINUX_REGISTRANT: &str = r#"#include "generated_plugin_registrant.h"

#include <url_launcher_linux/url_launcher_plugin.h>

void fl_register_plugins(FlPluginRegistry* registry) {
  g_autoptr(FlPluginRegistrar) url_launcher_linux_registrar =
      fl_plugin_registry_get_registrar_for_plugin(registry, "UrlLauncherPlugin");
  url_launcher_plugin_register_with_registrar(url_launcher_linux_registrar);
}
"#;

    #[test]
    fn test_android_names() {
        let spec = registrant_for(Platform::Android).unwrap();
        let names = spec.extract_plugin_names(ANDROID_REGISTRANT);
        assert_eq!(names, vec!["camera_android", "shared_preferences_android"]);
    }

    #[test]
    fn test_android_v1_embedding_names() {
        let spec = registrant_for(Platform::Android).unwrap();
        let names = spec.extract_plugin_names(
            r#"CameraPlugin.registerWith(registry.registrarFor("io.flutter.plugins.camera.CameraPlugin"));"#,
        );
        assert_eq!(names, vec!["Camera", "io.flutter.plugins.camera.CameraPlugin"]);
    }

    #[test]
    fn test_ios_names_deduplicated_in_order() {
        let spec = registrant_for(Platform::Ios).unwrap();
        let names = spec.extract_plugin_names(IOS_REGISTRANT);
        assert_eq!(names, vec!["camera_avfoundation", "CameraPlugin"]);
    }

    #[test]
    fn test_macos_names() {
        let spec = registrant_for(Platform::Macos).unwrap();
        let names = spec.extract_plugin_names(MACOS_REGISTRANT);
        assert!(names.contains(&"path_provider_foundation".to_string()));
        assert!(names.contains(&"PathProviderPlugin".to_string()));
    }

    #[test]
    fn test_linux_names() {
        let spec = registrant_for(Platform::Linux).unwrap();
        let names = spec.extract_plugin_names(LINUX_REGISTRANT);
        assert_eq!(names, vec!["url_launcher_linux", "UrlLauncherPlugin"]);
    }

    #[test]
    fn test_web_has_no_registrant() {
        assert!(registrant_for(Platform::Web).is_none());
        assert!(registrant_for(Platform::All).is_none());
    }

    #[test]
    fn test_normalize_plugin_name() {
        assert_eq!(normalize_plugin_name("CameraPlugin"), "camera");
        assert_eq!(normalize_plugin_name("camera_avfoundation"), "camera");
        assert_eq!(normalize_plugin_name("path_provider_foundation"), "pathprovider");
        assert_eq!(
            normalize_plugin_name("io.flutter.plugins.camera.CameraPlugin"),
            "camera"
        );
        assert_eq!(normalize_plugin_name("webview_flutter"), "webviewflutter");
        assert_eq!(normalize_plugin_name("ios"), "ios");
    }

    #[test]
    fn test_is_registered() {
        let names = vec!["camera_android".to_string(), "UrlLauncherPlugin".to_string()];
        assert!(is_registered("camera", &names));
        assert!(is_registered("url_launcher", &names));
        assert!(!is_registered("shared_preferences", &names));
    }
}
