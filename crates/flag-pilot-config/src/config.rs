// crates/flag-pilot-config/src/config.rs
// ============================================================================
// Module: Flag-Set Configuration
// Description: TOML document model, load guards, validation, and seeding.
// Purpose: Turn operator-authored flag-set documents into runtime inputs.
// Dependencies: flag-pilot-core, serde, thiserror, time, toml
// ============================================================================

//! ## Overview
//! A flag-set document declares `[[flag]]` entries, one shared `[safety]`
//! section, and optional `[[trigger]]` rows. Loading is strict: path and size
//! guards, UTF-8 enforcement, unknown-field rejection, and full validation
//! before the document is usable. Structural problems (bad ranges, unknown
//! enum labels, duplicate ids) are hard errors; advisory findings (unknown
//! dependencies, dependency cycles, flags with no enabled environment) are
//! surfaced as diagnostics so operators see them without blocking the load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use flag_pilot_core::AlertSeverity;
use flag_pilot_core::BusinessSize;
use flag_pilot_core::DayOfWeek;
use flag_pilot_core::Environment;
use flag_pilot_core::FlagDefinition;
use flag_pilot_core::FlagId;
use flag_pilot_core::HoursWindow;
use flag_pilot_core::InMemoryFlagRegistry;
use flag_pilot_core::LatencyCeilings;
use flag_pilot_core::RegionId;
use flag_pilot_core::RollbackThresholds;
use flag_pilot_core::SafetyCheckConfig;
use flag_pilot_core::Timestamp;
use flag_pilot_core::TriggerCondition;
use flag_pilot_core::TriggerId;
use flag_pilot_core::TriggerSpec;
use flag_pilot_core::TriggerTable;
use flag_pilot_core::WeeklyWindow;
use serde::Deserialize;
use thiserror::Error;
use time::Date;
use time::format_description::well_known::Iso8601;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;

/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Environment variable naming an explicit config path.
pub(crate) const CONFIG_ENV_VAR: &str = "FLAG_PILOT_CONFIG";

/// Default config file name resolved in the working directory.
pub(crate) const DEFAULT_CONFIG_NAME: &str = "flag-pilot.toml";

// ============================================================================
// SECTION: Errors and Diagnostics
// ============================================================================

/// Errors raised while loading or validating a flag-set document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Advisory finding classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// A dependency names a flag absent from the document.
    UnknownDependency,
    /// A dependency chain loops back on itself.
    DependencyCycle,
    /// A flag enables no environment at all.
    NoEnabledEnvironments,
}

/// One advisory finding attached to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    /// Finding classification.
    pub code: DiagnosticCode,
    /// Flag the finding applies to.
    pub flag_id: String,
    /// Human-readable description.
    pub message: String,
}

// ============================================================================
// SECTION: Document Model
// ============================================================================

/// Root flag-set document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagSetConfig {
    /// Declared flags.
    #[serde(default, rename = "flag")]
    pub flags: Vec<FlagEntryConfig>,
    /// Shared safety-check configuration.
    #[serde(default)]
    pub safety: SafetySectionConfig,
    /// Optional rollback trigger rows.
    #[serde(default, rename = "trigger")]
    pub triggers: Vec<TriggerEntryConfig>,
}

/// One `[[flag]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagEntryConfig {
    /// Flag identifier.
    pub id: String,
    /// Per-environment gates; absent environments are gated off.
    #[serde(default)]
    pub environments: BTreeMap<String, bool>,
    /// Region targeting labels; empty means unrestricted.
    #[serde(default)]
    pub target_regions: Vec<String>,
    /// Business-size targeting labels; empty means unrestricted.
    #[serde(default)]
    pub target_business_sizes: Vec<String>,
    /// Flags that must all evaluate true for this flag to be on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Marks an operator kill switch.
    #[serde(default)]
    pub kill_switch: bool,
    /// Rollback thresholds for monitoring.
    #[serde(default)]
    pub rollback_thresholds: ThresholdsConfig,
}

/// Rollback thresholds for one flag.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsConfig {
    /// Maximum tolerated error-rate ratio.
    #[serde(default = "default_max_error_rate")]
    pub max_error_rate: f64,
    /// Ceiling for the p95 latency figure in milliseconds.
    #[serde(default = "default_p95_latency_ms")]
    pub p95_latency_ms: f64,
    /// Ceiling for the p99 latency figure in milliseconds.
    #[serde(default = "default_p99_latency_ms")]
    pub p99_latency_ms: f64,
    /// Minimum tolerated quality score.
    #[serde(default = "default_min_quality_score")]
    pub min_quality_score: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            max_error_rate: default_max_error_rate(),
            p95_latency_ms: default_p95_latency_ms(),
            p99_latency_ms: default_p99_latency_ms(),
            min_quality_score: default_min_quality_score(),
        }
    }
}

/// Shared `[safety]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafetySectionConfig {
    /// Business-hours opening hour in `0..24`.
    #[serde(default = "default_open_hour")]
    pub open_hour: u8,
    /// Business-hours closing hour in `0..=24`, exclusive.
    #[serde(default = "default_close_hour")]
    pub close_hour: u8,
    /// Days counted as business days.
    #[serde(default = "default_business_days")]
    pub business_days: Vec<String>,
    /// Recurring weekly restricted window, if any.
    #[serde(default)]
    pub restricted_window: Option<RestrictedWindowConfig>,
    /// Whether the restricted window blocks instead of warning.
    #[serde(default)]
    pub restricted_window_blocks: bool,
    /// ISO-8601 blackout dates.
    #[serde(default)]
    pub blackout_dates: Vec<String>,
    /// Whether blackout dates block instead of warning.
    #[serde(default)]
    pub blackout_blocks: bool,
    /// Minimum quality/cultural compliance score.
    #[serde(default = "default_safety_min_quality")]
    pub min_quality_score: f64,
    /// Minimum security/privacy validation score.
    #[serde(default = "default_min_security_score")]
    pub min_security_score: f64,
    /// Ceiling for the p95 latency figure in milliseconds.
    #[serde(default = "default_p95_latency_ms")]
    pub p95_latency_ms: f64,
    /// Ceiling for the p99 latency figure in milliseconds.
    #[serde(default = "default_p99_latency_ms")]
    pub p99_latency_ms: f64,
}

impl Default for SafetySectionConfig {
    fn default() -> Self {
        Self {
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            business_days: default_business_days(),
            restricted_window: None,
            restricted_window_blocks: false,
            blackout_dates: Vec::new(),
            blackout_blocks: false,
            min_quality_score: default_safety_min_quality(),
            min_security_score: default_min_security_score(),
            p95_latency_ms: default_p95_latency_ms(),
            p99_latency_ms: default_p99_latency_ms(),
        }
    }
}

/// Recurring weekly restricted window.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestrictedWindowConfig {
    /// Day the window recurs on.
    pub day: String,
    /// Opening hour in `0..24`.
    pub open_hour: u8,
    /// Closing hour in `0..=24`, exclusive.
    pub close_hour: u8,
}

/// One `[[trigger]]` row.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerEntryConfig {
    /// Stable trigger identifier.
    pub id: String,
    /// Condition kind label.
    pub kind: String,
    /// Scalar threshold for threshold-based kinds.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// p95 latency ceiling for the latency kind.
    #[serde(default)]
    pub p95_latency_ms: Option<f64>,
    /// p99 latency ceiling for the latency kind.
    #[serde(default)]
    pub p99_latency_ms: Option<f64>,
    /// Whether a firing trigger rolls the flag back automatically.
    #[serde(default)]
    pub auto_rollback: bool,
    /// Alert severity label raised when the trigger fires.
    #[serde(default = "default_severity")]
    pub severity: String,
}

// ============================================================================
// SECTION: Field Defaults
// ============================================================================

/// Default maximum error-rate ratio.
const fn default_max_error_rate() -> f64 {
    0.05
}

/// Default p95 latency ceiling in milliseconds.
const fn default_p95_latency_ms() -> f64 {
    500.0
}

/// Default p99 latency ceiling in milliseconds.
const fn default_p99_latency_ms() -> f64 {
    1_000.0
}

/// Default minimum quality score for rollback thresholds.
const fn default_min_quality_score() -> f64 {
    60.0
}

/// Default minimum quality score for the safety pipeline.
const fn default_safety_min_quality() -> f64 {
    70.0
}

/// Default minimum security score.
const fn default_min_security_score() -> f64 {
    80.0
}

/// Default business-hours opening hour.
const fn default_open_hour() -> u8 {
    9
}

/// Default business-hours closing hour.
const fn default_close_hour() -> u8 {
    17
}

/// Default business days.
fn default_business_days() -> Vec<String> {
    ["monday", "tuesday", "wednesday", "thursday", "friday"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Default trigger severity label.
fn default_severity() -> String {
    "medium".to_string()
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl FlagSetConfig {
    /// Loads a flag-set document from disk using the default resolution
    /// rules: explicit path, then `FLAG_PILOT_CONFIG`, then
    /// `flag-pilot.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates a flag-set document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the document for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for flag in &self.flags {
            if flag.id.trim().is_empty() {
                return Err(ConfigError::Invalid("flag.id must not be empty".to_string()));
            }
            if !seen.insert(flag.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate flag id: {}", flag.id)));
            }
            flag.validate()?;
        }
        self.safety.validate()?;
        let mut trigger_ids = BTreeSet::new();
        for trigger in &self.triggers {
            if trigger.id.trim().is_empty() {
                return Err(ConfigError::Invalid("trigger.id must not be empty".to_string()));
            }
            if !trigger_ids.insert(trigger.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate trigger id: {}",
                    trigger.id
                )));
            }
            trigger.condition()?;
            parse_severity(&trigger.severity)?;
        }
        Ok(())
    }
}

/// Resolves the effective config path.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Applies length guards to the resolved path.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Conversion to Runtime Inputs
// ============================================================================

impl FlagEntryConfig {
    /// Validates this entry by attempting the full conversion.
    fn validate(&self) -> Result<(), ConfigError> {
        self.definition()?;
        Ok(())
    }

    /// Converts this entry into a core flag definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on bad labels or out-of-range thresholds.
    pub fn definition(&self) -> Result<FlagDefinition, ConfigError> {
        let thresholds = &self.rollback_thresholds;
        if !(0.0..=1.0).contains(&thresholds.max_error_rate) {
            return Err(ConfigError::Invalid(format!(
                "{}: max_error_rate must be in [0, 1]",
                self.id
            )));
        }
        if !(0.0..=100.0).contains(&thresholds.min_quality_score) {
            return Err(ConfigError::Invalid(format!(
                "{}: min_quality_score must be in [0, 100]",
                self.id
            )));
        }
        if thresholds.p95_latency_ms <= 0.0 || thresholds.p99_latency_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{}: latency ceilings must be positive",
                self.id
            )));
        }

        let mut sizes = BTreeSet::new();
        for label in &self.target_business_sizes {
            sizes.insert(parse_business_size(label)?);
        }
        Ok(FlagDefinition {
            id: FlagId::new(self.id.as_str()),
            environments: self
                .environments
                .iter()
                .map(|(name, enabled)| (Environment::new(name.as_str()), *enabled))
                .collect(),
            target_regions: self
                .target_regions
                .iter()
                .map(|region| RegionId::new(region.as_str()))
                .collect(),
            target_business_sizes: sizes,
            dependencies: self
                .dependencies
                .iter()
                .map(|dependency| FlagId::new(dependency.as_str()))
                .collect(),
            kill_switch: self.kill_switch,
            rollback_thresholds: RollbackThresholds {
                max_error_rate: thresholds.max_error_rate,
                latency: LatencyCeilings {
                    p95_ms: thresholds.p95_latency_ms,
                    p99_ms: thresholds.p99_latency_ms,
                },
                min_quality_score: thresholds.min_quality_score,
            },
        })
    }
}

impl SafetySectionConfig {
    /// Validates this section by attempting the full conversion.
    fn validate(&self) -> Result<(), ConfigError> {
        self.check_config()?;
        Ok(())
    }

    /// Converts this section into the runtime safety-check configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on bad hour ranges, day labels, or dates.
    pub fn check_config(&self) -> Result<SafetyCheckConfig, ConfigError> {
        validate_hours(self.open_hour, self.close_hour, "safety")?;
        let mut business_days = BTreeSet::new();
        for label in &self.business_days {
            business_days.insert(parse_day(label)?);
        }
        let restricted_window = match &self.restricted_window {
            Some(window) => {
                validate_hours(window.open_hour, window.close_hour, "restricted_window")?;
                Some(WeeklyWindow {
                    day: parse_day(&window.day)?,
                    hours: HoursWindow {
                        open_hour: window.open_hour,
                        close_hour: window.close_hour,
                    },
                })
            }
            None => None,
        };
        let mut blackout_dates = BTreeSet::new();
        for date in &self.blackout_dates {
            blackout_dates.insert(parse_date(date)?);
        }
        if !(0.0..=100.0).contains(&self.min_quality_score)
            || !(0.0..=100.0).contains(&self.min_security_score)
        {
            return Err(ConfigError::Invalid(
                "safety score minimums must be in [0, 100]".to_string(),
            ));
        }
        if self.p95_latency_ms <= 0.0 || self.p99_latency_ms <= 0.0 {
            return Err(ConfigError::Invalid(
                "safety latency ceilings must be positive".to_string(),
            ));
        }
        Ok(SafetyCheckConfig {
            business_hours: HoursWindow {
                open_hour: self.open_hour,
                close_hour: self.close_hour,
            },
            business_days,
            restricted_window,
            restricted_window_blocks: self.restricted_window_blocks,
            blackout_dates,
            blackout_blocks: self.blackout_blocks,
            min_quality_score: self.min_quality_score,
            min_security_score: self.min_security_score,
            latency_ceilings: LatencyCeilings {
                p95_ms: self.p95_latency_ms,
                p99_ms: self.p99_latency_ms,
            },
        })
    }
}

impl TriggerEntryConfig {
    /// Converts this row into a trigger condition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown kinds or missing parameters.
    pub fn condition(&self) -> Result<TriggerCondition, ConfigError> {
        let threshold = |name: &str| {
            self.threshold.ok_or_else(|| {
                ConfigError::Invalid(format!("trigger {}: {name} requires threshold", self.id))
            })
        };
        match self.kind.as_str() {
            "error_rate_above" => Ok(TriggerCondition::ErrorRateAbove {
                threshold: threshold("error_rate_above")?,
            }),
            "quality_score_below" => Ok(TriggerCondition::QualityScoreBelow {
                threshold: threshold("quality_score_below")?,
            }),
            "user_satisfaction_below" => Ok(TriggerCondition::UserSatisfactionBelow {
                threshold: threshold("user_satisfaction_below")?,
            }),
            "regulatory_non_compliant" => Ok(TriggerCondition::RegulatoryNonCompliant),
            "latency_above" => {
                let (Some(p95_ms), Some(p99_ms)) = (self.p95_latency_ms, self.p99_latency_ms)
                else {
                    return Err(ConfigError::Invalid(format!(
                        "trigger {}: latency_above requires p95_latency_ms and p99_latency_ms",
                        self.id
                    )));
                };
                Ok(TriggerCondition::LatencyAbove {
                    ceilings: LatencyCeilings {
                        p95_ms,
                        p99_ms,
                    },
                })
            }
            other => {
                Err(ConfigError::Invalid(format!("trigger {}: unknown kind {other}", self.id)))
            }
        }
    }

    /// Converts this row into a full trigger spec.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown kinds, parameters, or severities.
    pub fn spec(&self) -> Result<TriggerSpec, ConfigError> {
        Ok(TriggerSpec {
            id: TriggerId::new(self.id.as_str()),
            condition: self.condition()?,
            auto_rollback: self.auto_rollback,
            severity: parse_severity(&self.severity)?,
        })
    }
}

impl FlagSetConfig {
    /// Converts every flag entry into a core definition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any entry fails conversion.
    pub fn flag_definitions(&self) -> Result<Vec<FlagDefinition>, ConfigError> {
        self.flags.iter().map(FlagEntryConfig::definition).collect()
    }

    /// Builds the optional document-level trigger table.
    ///
    /// Returns `None` when the document declares no trigger rows; callers
    /// then fall back to the standard per-flag table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any row fails conversion.
    pub fn trigger_table(&self) -> Result<Option<TriggerTable>, ConfigError> {
        if self.triggers.is_empty() {
            return Ok(None);
        }
        let rows =
            self.triggers.iter().map(TriggerEntryConfig::spec).collect::<Result<Vec<_>, _>>()?;
        Ok(Some(TriggerTable::new(rows)))
    }

    /// Collects advisory findings over the whole document.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<ConfigDiagnostic> {
        let known: BTreeSet<&str> = self.flags.iter().map(|flag| flag.id.as_str()).collect();
        let mut findings = Vec::new();

        for flag in &self.flags {
            for dependency in &flag.dependencies {
                if !known.contains(dependency.as_str()) {
                    findings.push(ConfigDiagnostic {
                        code: DiagnosticCode::UnknownDependency,
                        flag_id: flag.id.clone(),
                        message: format!("depends on undeclared flag {dependency}"),
                    });
                }
            }
            if !flag.environments.values().any(|enabled| *enabled) {
                findings.push(ConfigDiagnostic {
                    code: DiagnosticCode::NoEnabledEnvironments,
                    flag_id: flag.id.clone(),
                    message: "no environment is enabled; the flag can never be on".to_string(),
                });
            }
        }

        for flag_id in self.cyclic_flags() {
            findings.push(ConfigDiagnostic {
                code: DiagnosticCode::DependencyCycle,
                flag_id: flag_id.clone(),
                message: "participates in a dependency cycle".to_string(),
            });
        }
        findings
    }

    /// Seeds every declared flag into the registry, disabled.
    ///
    /// Returns the document diagnostics so callers can surface them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when conversion or registration fails.
    pub fn seed(
        &self,
        registry: &InMemoryFlagRegistry,
        registered_at: Timestamp,
    ) -> Result<Vec<ConfigDiagnostic>, ConfigError> {
        for definition in self.flag_definitions()? {
            registry
                .register(definition, registered_at)
                .map_err(|err| ConfigError::Invalid(format!("registry seed failed: {err}")))?;
        }
        Ok(self.diagnostics())
    }

    /// Returns the ids of flags participating in dependency cycles.
    fn cyclic_flags(&self) -> Vec<String> {
        let edges: BTreeMap<&str, Vec<&str>> = self
            .flags
            .iter()
            .map(|flag| {
                (
                    flag.id.as_str(),
                    flag.dependencies.iter().map(String::as_str).collect(),
                )
            })
            .collect();

        let mut cyclic = Vec::new();
        for start in edges.keys() {
            if on_cycle(start, start, &edges, &mut BTreeSet::new()) {
                cyclic.push((*start).to_string());
            }
        }
        cyclic
    }
}

/// Returns true when a path from `current` leads back to `start`.
fn on_cycle<'a>(
    start: &str,
    current: &'a str,
    edges: &BTreeMap<&'a str, Vec<&'a str>>,
    visited: &mut BTreeSet<&'a str>,
) -> bool {
    let Some(dependencies) = edges.get(current) else {
        return false;
    };
    for &dependency in dependencies {
        if dependency == start {
            return true;
        }
        if visited.insert(dependency) && on_cycle(start, dependency, edges, visited) {
            return true;
        }
    }
    false
}

// ============================================================================
// SECTION: Label Parsing
// ============================================================================

/// Validates an hour window.
fn validate_hours(open_hour: u8, close_hour: u8, context: &str) -> Result<(), ConfigError> {
    if open_hour >= close_hour || close_hour > 24 {
        return Err(ConfigError::Invalid(format!(
            "{context}: hours must satisfy open < close <= 24"
        )));
    }
    Ok(())
}

/// Parses a business-size label.
fn parse_business_size(label: &str) -> Result<BusinessSize, ConfigError> {
    match label {
        "micro" => Ok(BusinessSize::Micro),
        "small" => Ok(BusinessSize::Small),
        "medium" => Ok(BusinessSize::Medium),
        "large" => Ok(BusinessSize::Large),
        other => Err(ConfigError::Invalid(format!("unknown business size: {other}"))),
    }
}

/// Parses a day-of-week label.
fn parse_day(label: &str) -> Result<DayOfWeek, ConfigError> {
    match label {
        "monday" => Ok(DayOfWeek::Monday),
        "tuesday" => Ok(DayOfWeek::Tuesday),
        "wednesday" => Ok(DayOfWeek::Wednesday),
        "thursday" => Ok(DayOfWeek::Thursday),
        "friday" => Ok(DayOfWeek::Friday),
        "saturday" => Ok(DayOfWeek::Saturday),
        "sunday" => Ok(DayOfWeek::Sunday),
        other => Err(ConfigError::Invalid(format!("unknown day of week: {other}"))),
    }
}

/// Parses an alert-severity label.
fn parse_severity(label: &str) -> Result<AlertSeverity, ConfigError> {
    match label {
        "low" => Ok(AlertSeverity::Low),
        "medium" => Ok(AlertSeverity::Medium),
        "high" => Ok(AlertSeverity::High),
        "critical" => Ok(AlertSeverity::Critical),
        other => Err(ConfigError::Invalid(format!("unknown severity: {other}"))),
    }
}

/// Parses an ISO-8601 calendar date.
fn parse_date(value: &str) -> Result<Date, ConfigError> {
    Date::parse(value, &Iso8601::DEFAULT)
        .map_err(|err| ConfigError::Invalid(format!("invalid blackout date {value}: {err}")))
}
