use asr_domain::ResponseFormat;

use crate::ApplicationError;

/// Whether word/segment timing is requested from the model for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPolicy {
    Disabled,
    Enabled,
}

impl TimestampPolicy {
    /// `text` never carries timestamps, subtitles always need them, the other
    /// formats follow the caller's flag.
    pub fn resolve(format: ResponseFormat, requested: bool) -> Self {
        let enabled = match format {
            ResponseFormat::Text => false,
            format if format.is_subtitle() => true,
            _ => requested,
        };
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    pub fn check_capability(self, supports_timestamps: bool) -> Result<(), ApplicationError> {
        if self.is_enabled() && !supports_timestamps {
            return Err(ApplicationError::TimestampsUnsupported);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_format_forces_timestamps_off() {
        assert_eq!(
            TimestampPolicy::resolve(ResponseFormat::Text, true),
            TimestampPolicy::Disabled
        );
    }

    #[test]
    fn subtitle_formats_force_timestamps_on() {
        for format in [ResponseFormat::Srt, ResponseFormat::Vtt] {
            assert_eq!(TimestampPolicy::resolve(format, false), TimestampPolicy::Enabled);
        }
    }

    #[test]
    fn structured_formats_follow_the_flag() {
        for format in [ResponseFormat::Json, ResponseFormat::VerboseJson] {
            assert_eq!(TimestampPolicy::resolve(format, true), TimestampPolicy::Enabled);
            assert_eq!(TimestampPolicy::resolve(format, false), TimestampPolicy::Disabled);
        }
    }

    #[test]
    fn enabled_policy_requires_capability_support() {
        assert!(matches!(
            TimestampPolicy::Enabled.check_capability(false),
            Err(ApplicationError::TimestampsUnsupported)
        ));
        assert!(TimestampPolicy::Enabled.check_capability(true).is_ok());
        assert!(TimestampPolicy::Disabled.check_capability(false).is_ok());
    }
}
