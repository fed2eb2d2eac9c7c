use asr_domain::LanguageTag;

use crate::ApplicationError;

const WAV_SIGNATURE: &[u8; 4] = b"RIFF";

pub struct InputValidator {
    supported_languages: Vec<LanguageTag>,
}

impl InputValidator {
    pub fn new<I, S>(supported_languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            supported_languages: supported_languages
                .into_iter()
                .map(|code| LanguageTag::new(code.as_ref()))
                .collect(),
        }
    }

    pub fn validate(&self, language: &str, audio: &[u8]) -> Result<LanguageTag, ApplicationError> {
        let tag = LanguageTag::new(language);
        if !self.supported_languages.contains(&tag) {
            return Err(ApplicationError::UnsupportedLanguage {
                language: language.to_string(),
                supported: self
                    .supported_languages
                    .iter()
                    .map(LanguageTag::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        if !audio.starts_with(WAV_SIGNATURE) {
            return Err(ApplicationError::InvalidAudioContainer);
        }

        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> InputValidator {
        InputValidator::new(["en", "de", "fr", "es"])
    }

    #[test]
    fn accepts_supported_language_and_riff_payload() {
        let tag = validator()
            .validate("en", b"RIFF\x24\x00\x00\x00WAVE")
            .expect("valid input");
        assert_eq!(tag.as_str(), "en");
    }

    #[test]
    fn language_match_is_case_sensitive() {
        for language in ["EN", "En", " en"] {
            let err = validator()
                .validate(language, b"RIFF\x24\x00\x00\x00WAVE")
                .expect_err("not in the supported set");
            assert!(
                matches!(err, ApplicationError::UnsupportedLanguage { language: ref got, .. } if got == language)
            );
        }
    }

    #[test]
    fn rejects_unsupported_language_before_inspecting_audio() {
        let err = validator().validate("it", b"").expect_err("italian unsupported");
        match err {
            ApplicationError::UnsupportedLanguage { language, supported } => {
                assert_eq!(language, "it");
                assert_eq!(supported, "en, de, fr, es");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_riff_and_truncated_payloads() {
        for payload in [&b""[..], b"RIF", b"ID3\x04mp3", b"OggS"] {
            let err = validator().validate("en", payload).expect_err("not wav");
            assert!(matches!(err, ApplicationError::InvalidAudioContainer));
        }
    }
}
