//! Recipe settings.
//!
//! Settings are the closed set of build-configuration axes a recipe can fix:
//! `os`, `compiler`, `build_type` and `arch`. Keys are validated when the
//! recipe is loaded. Values stay free-form strings until layout planning,
//! where they are checked against the values the CMake backend supports.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A recognized settings key.
///
/// The declaration order is the canonical order used when settings are
/// rendered into generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    Os,
    Compiler,
    BuildType,
    Arch,
}

impl SettingKey {
    /// All keys in canonical order.
    pub const ALL: [SettingKey; 4] = [
        SettingKey::Os,
        SettingKey::Compiler,
        SettingKey::BuildType,
        SettingKey::Arch,
    ];

    /// Get the key as it appears in recipes.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Os => "os",
            SettingKey::Compiler => "compiler",
            SettingKey::BuildType => "build_type",
            SettingKey::Arch => "arch",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Error building a settings map.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    #[diagnostic(
        code(rigging::settings::unknown_key),
        help("recognized settings are: os, compiler, build_type, arch")
    )]
    UnknownKey(String),

    #[error("invalid setting assignment `{0}`")]
    #[diagnostic(
        code(rigging::settings::malformed),
        help("settings are written as `key=value`, for example `build_type=Debug`")
    )]
    MalformedAssignment(String),
}

/// Settings as declared by a recipe, config file or command line.
///
/// Absent keys are filled in with backend defaults during layout planning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<SettingKey, String>,
}

impl Settings {
    /// Create an empty settings map.
    pub fn new() -> Self {
        Settings::default()
    }

    /// Build settings from raw string pairs, rejecting unknown keys.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, SettingsError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Settings::new();
        for (key, value) in pairs {
            settings.insert(key.as_ref().parse()?, value);
        }
        Ok(settings)
    }

    /// Parse a single `key=value` assignment.
    pub fn parse_assignment(s: &str) -> Result<(SettingKey, String), SettingsError> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| SettingsError::MalformedAssignment(s.to_string()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(SettingsError::MalformedAssignment(s.to_string()));
        }
        Ok((key.trim().parse()?, value.to_string()))
    }

    /// Builder-style insert.
    pub fn with(mut self, key: SettingKey, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a value, replacing any previous one.
    pub fn insert(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Get the value for a key.
    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Iterate over set values in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (SettingKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Check if no values are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of these settings (other takes precedence).
    pub fn merge(&mut self, other: &Settings) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str("<defaults>");
        }
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Error for a settings value the backend does not support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported value `{value}` for setting `{key}` (expected one of: {expected})")]
pub struct SettingValueError {
    pub key: SettingKey,
    pub value: String,
    pub expected: String,
}

macro_rules! setting_values {
    (
        $(#[$meta:meta])*
        $name:ident: $key:expr => { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All supported values.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Get the value as spelled in recipes.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse a recipe value.
            pub fn parse_value(value: &str) -> Result<Self, SettingValueError> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == value)
                    .ok_or_else(|| SettingValueError {
                        key: $key,
                        value: value.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

setting_values! {
    /// Target operating system.
    Os: SettingKey::Os => {
        Linux => "Linux",
        Windows => "Windows",
        Macos => "Macos",
        FreeBsd => "FreeBSD",
        Android => "Android",
        Ios => "iOS",
    }
}

setting_values! {
    /// Compiler family.
    Compiler: SettingKey::Compiler => {
        Gcc => "gcc",
        Clang => "clang",
        AppleClang => "apple-clang",
        Msvc => "msvc",
    }
}

setting_values! {
    /// CMake build type.
    BuildType: SettingKey::BuildType => {
        Debug => "Debug",
        Release => "Release",
        RelWithDebInfo => "RelWithDebInfo",
        MinSizeRel => "MinSizeRel",
    }
}

setting_values! {
    /// Target architecture.
    Arch: SettingKey::Arch => {
        X86 => "x86",
        X86_64 => "x86_64",
        Armv7 => "armv7",
        Armv8 => "armv8",
        Ppc64le => "ppc64le",
        Riscv64 => "riscv64",
    }
}

impl Os {
    /// The operating system this binary was built for.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            "freebsd" => Os::FreeBsd,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Linux,
        }
    }

    /// The value of `CMAKE_SYSTEM_NAME` for this os.
    pub fn cmake_system_name(&self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::Windows => "Windows",
            Os::Macos => "Darwin",
            Os::FreeBsd => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
        }
    }

    fn is_apple(&self) -> bool {
        matches!(self, Os::Macos | Os::Ios)
    }
}

impl Compiler {
    /// The default compiler family for an os.
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows => Compiler::Msvc,
            Os::Macos | Os::Ios => Compiler::AppleClang,
            _ => Compiler::Gcc,
        }
    }

    /// C and C++ compiler executables for this family.
    pub fn executables(&self) -> (&'static str, &'static str) {
        match self {
            Compiler::Gcc => ("gcc", "g++"),
            Compiler::Clang | Compiler::AppleClang => ("clang", "clang++"),
            Compiler::Msvc => ("cl", "cl"),
        }
    }

    /// Whether builds with this compiler use a multi-configuration generator,
    /// which shares one build directory across build types.
    pub fn is_multi_config(&self) -> bool {
        matches!(self, Compiler::Msvc)
    }

    /// Whether this compiler can target the given os.
    pub fn supports(&self, os: Os) -> bool {
        match self {
            Compiler::Msvc => os == Os::Windows,
            Compiler::AppleClang => os.is_apple(),
            Compiler::Gcc | Compiler::Clang => true,
        }
    }
}

impl Arch {
    /// The architecture this binary was built for.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => Arch::X86,
            "arm" => Arch::Armv7,
            "aarch64" => Arch::Armv8,
            "powerpc64" => Arch::Ppc64le,
            "riscv64" => Arch::Riscv64,
            _ => Arch::X86_64,
        }
    }

    /// The value of `CMAKE_SYSTEM_PROCESSOR` for this architecture.
    pub fn cmake_processor(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv8 => "aarch64",
            Arch::Ppc64le => "ppc64le",
            Arch::Riscv64 => "riscv64",
        }
    }
}

impl Default for BuildType {
    fn default() -> Self {
        BuildType::Release
    }
}

/// Settings with every key resolved to a supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EffectiveSettings {
    pub os: Os,
    pub compiler: Compiler,
    pub build_type: BuildType,
    pub arch: Arch,
}

impl EffectiveSettings {
    /// Resolve declared settings, filling absent keys with host defaults.
    ///
    /// The compiler default depends on the resolved os, not on the host.
    pub fn resolve(settings: &Settings) -> Result<Self, SettingValueError> {
        let os = settings
            .get(SettingKey::Os)
            .map(Os::parse_value)
            .transpose()?
            .unwrap_or_else(Os::host);
        let compiler = settings
            .get(SettingKey::Compiler)
            .map(Compiler::parse_value)
            .transpose()?
            .unwrap_or_else(|| Compiler::default_for(os));
        let build_type = settings
            .get(SettingKey::BuildType)
            .map(BuildType::parse_value)
            .transpose()?
            .unwrap_or_default();
        let arch = settings
            .get(SettingKey::Arch)
            .map(Arch::parse_value)
            .transpose()?
            .unwrap_or_else(Arch::host);

        Ok(EffectiveSettings {
            os,
            compiler,
            build_type,
            arch,
        })
    }

    /// Whether these settings target a platform other than the host.
    pub fn is_cross(&self) -> bool {
        self.os != Os::host() || self.arch != Arch::host()
    }

    /// Values in canonical key order.
    pub fn pairs(&self) -> [(SettingKey, &'static str); 4] {
        [
            (SettingKey::Os, self.os.as_str()),
            (SettingKey::Compiler, self.compiler.as_str()),
            (SettingKey::BuildType, self.build_type.as_str()),
            (SettingKey::Arch, self.arch.as_str()),
        ]
    }
}

impl fmt::Display for EffectiveSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        f.write_str(&parts.join(" "))
    }
}
