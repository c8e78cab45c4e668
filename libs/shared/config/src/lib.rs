use std::env;
use tracing::warn;

/// Policy constants for the fuzzy command matcher.
///
/// Threshold and bonus directly set the false-accept/false-reject balance for
/// near-homophone doctor names, so they are configuration rather than
/// constants buried at the call site.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum final score for a doctor match to be accepted.
    pub score_threshold: f32,
    /// Bonus added when a doctor's first or last name token appears verbatim
    /// in the normalized command.
    pub name_token_bonus: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.4,
            name_token_bonus: 0.4,
        }
    }
}

/// Policy constants for voice booking sessions.
#[derive(Debug, Clone)]
pub struct VoiceSessionConfig {
    /// How many unrecognized commands to tolerate before the session gives
    /// up and asks the caller to use another booking path.
    pub max_reprompts: u32,
}

impl Default for VoiceSessionConfig {
    fn default() -> Self {
        Self { max_reprompts: 5 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub matcher: MatcherConfig,
    pub voice_session: VoiceSessionConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            matcher: MatcherConfig {
                score_threshold: parse_env_f32("MATCHER_SCORE_THRESHOLD", 0.4),
                name_token_bonus: parse_env_f32("MATCHER_NAME_TOKEN_BONUS", 0.4),
            },
            voice_session: VoiceSessionConfig {
                max_reprompts: parse_env_u32("VOICE_MAX_REPROMPTS", 5),
            },
        }
    }
}

fn parse_env_f32(key: &str, default: f32) -> f32 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a number ({:?}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a number ({:?}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
