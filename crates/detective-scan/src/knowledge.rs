//! Curated plugin lists used by the heuristics
//!
//! These are allow-lists, not a registry: a plugin missing from a list simply
//! gets the default treatment.

/// Packages with no native code; they never appear in a registrant file
pub const PURE_DART_PACKAGES: &[&str] = &[
    "flutter_localizations",
    "flutter_web_plugins",
    "cupertino_icons",
    "provider",
    "riverpod",
    "flutter_riverpod",
    "hooks_riverpod",
    "flutter_bloc",
    "bloc",
    "equatable",
    "get",
    "get_it",
    "http",
    "dio",
    "intl",
    "collection",
    "meta",
    "path",
    "rxdart",
    "freezed_annotation",
    "json_annotation",
    "logger",
    "logging",
    "uuid",
    "crypto",
    "async",
    "go_router",
    "auto_route",
    "flutter_svg",
    "cached_network_image",
    "google_fonts",
    "lottie",
    "shimmer",
    "flutter_hooks",
    "dartz",
    "fpdart",
    "plugin_platform_interface",
    "flutter_lints",
    "lints",
];

/// Plugins whose web implementation needs a `<script>` tag in `web/index.html`
pub const WEB_SCRIPT_PLUGINS: &[&str] = &[
    "firebase_core",
    "firebase_auth",
    "firebase_analytics",
    "firebase_messaging",
    "cloud_firestore",
    "google_maps_flutter",
    "google_sign_in",
    "flutter_stripe",
    "pdfx",
];

/// Plugins written in Swift that need `use_frameworks!` in the Podfile
pub const SWIFT_PLUGINS: &[&str] = &[
    "camera",
    "video_player",
    "webview_flutter",
    "in_app_purchase",
    "sign_in_with_apple",
    "health",
    "flutter_local_notifications",
    "mobile_scanner",
    "permission_handler",
    "geolocator",
];

/// Whether a declared plugin is expected to show up in native registrants
pub fn requires_registration(plugin: &str) -> bool {
    !PURE_DART_PACKAGES.contains(&plugin)
}

pub fn requires_web_script(plugin: &str) -> bool {
    WEB_SCRIPT_PLUGINS.contains(&plugin)
}

pub fn is_swift_plugin(plugin: &str) -> bool {
    SWIFT_PLUGINS.contains(&plugin)
}
