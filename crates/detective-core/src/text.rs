//! Log-line cleanup and stack-frame recognition
//!
//! Log files captured from `flutter run`, `adb logcat` or Xcode carry terminal
//! colour codes and per-line tool prefixes. Signature matching runs on the
//! cleaned text.

use regex::Regex;
use std::sync::LazyLock;

/// ANSI escape sequences, plus the caret notation (`^[`) used by
/// Flutter's `--machine` output.
static ANSI_ESCAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \x1b\[[0-9;?]*[A-Za-z]               # CSI sequences
        | \x1b\][^\x07\x1b]*(?:\x07|\x1b\\)  # OSC sequences
        | \x1b[A-Za-z]                       # Simple escapes
        | \^[\[]\[[0-9;?]*[A-Za-z]           # ^[[ CSI sequences
        | \^\[[0-9;?]*[A-Za-z]               # ^[ CSI sequences
        ",
    )
    .expect("Invalid ANSI_ESCAPE_PATTERN")
});

/// Logcat / Flutter tool prefixes: `E/flutter (12345): `, `I/flutter ( 123): `,
/// `flutter: `
static TOOL_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[VDIWEF]/flutter\s*\(\s*\d+\):\s?|flutter:\s?)")
        .expect("Invalid TOOL_PREFIX_PATTERN")
});

/// Dart VM frame: `#0      main (package:app/main.dart:15:3)`
static DART_FRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\d+\s+\S.*\(.+\)\s*$").expect("Invalid DART_FRAME_PATTERN")
});

/// JVM frame: `at io.flutter.plugin.common.MethodChannel.invokeMethod(MethodChannel.java:12)`
static JVM_FRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^at\s+[\w$.<>]+\(.*\)\s*$").expect("Invalid JVM_FRAME_PATTERN")
});

/// Friendly package_trace frame: `package:app/main.dart 15:3  main`
static FRIENDLY_FRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:package:|dart:|file://)\S+\s+\d+(?::\d+)?\s+\S")
        .expect("Invalid FRIENDLY_FRAME_PATTERN")
});

/// Native crash frame: `0   Runner   0x0000000100a3c 0x100000000 + 12345`
static NATIVE_FRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\s+\S+\s+0x[0-9a-fA-F]+").expect("Invalid NATIVE_FRAME_PATTERN")
});

/// Strip ANSI escape sequences from a string
///
/// # Examples
///
/// ```
/// use detective_core::text::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mred text\x1b[0m"), "red text");
/// ```
pub fn strip_ansi_codes(input: &str) -> String {
    ANSI_ESCAPE_PATTERN.replace_all(input, "").into_owned()
}

/// Remove colour codes and tool prefixes from a captured log line
pub fn clean_log_line(line: &str) -> String {
    let stripped = strip_ansi_codes(line);
    TOOL_PREFIX_PATTERN.replace(&stripped, "").into_owned()
}

/// Whether a (cleaned) line looks like one frame of a stack trace
pub fn is_stack_frame_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed == "<asynchronous suspension>"
        || DART_FRAME_PATTERN.is_match(trimmed)
        || JVM_FRAME_PATTERN.is_match(trimmed)
        || FRIENDLY_FRAME_PATTERN.is_match(trimmed)
        || NATIVE_FRAME_PATTERN.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_color_codes() {
        assert_eq!(strip_ansi_codes("\x1b[38;5;244m│ Trace\x1b[0m"), "│ Trace");
        assert_eq!(strip_ansi_codes("^[[31mred^[[0m"), "red");
        assert_eq!(strip_ansi_codes("plain"), "plain");
    }

    #[test]
    fn test_clean_log_line_removes_prefixes() {
        assert_eq!(
            clean_log_line("E/flutter (12345): MissingPluginException(x)"),
            "MissingPluginException(x)"
        );
        assert_eq!(clean_log_line("flutter: hello"), "hello");
        assert_eq!(
            clean_log_line("\x1b[31mI/flutter ( 42): #0 main\x1b[0m"),
            "#0 main"
        );
    }

    #[test]
    fn test_dart_frames() {
        assert!(is_stack_frame_line(
            "#0      MethodChannel._invokeMethod (package:flutter/src/services/platform_channel.dart:308:7)"
        ));
        assert!(is_stack_frame_line("<asynchronous suspension>"));
        assert!(is_stack_frame_line("package:demo/main.dart 15:3  main"));
    }

    #[test]
    fn test_jvm_and_native_frames() {
        assert!(is_stack_frame_line(
            "    at io.flutter.plugin.common.MethodChannel$IncomingMethodCallHandler.onMessage(MethodChannel.java:258)"
        ));
        assert!(is_stack_frame_line(
            "3   Runner   0x0000000102a1c4e8 0x102a18000 + 17640"
        ));
    }

    #[test]
    fn test_non_frames() {
        assert!(!is_stack_frame_line(""));
        assert!(!is_stack_frame_line("Launching lib/main.dart on Pixel 7 in debug mode..."));
        assert!(!is_stack_frame_line(
            "MissingPluginException(No implementation found for method x on channel y)"
        ));
    }
}
