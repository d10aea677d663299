//! Upload validation and registration-payload assembly.

use crate::features::upload::state::UploadDraft;
use vitrine_api_models::{MediaKind, RegisterMediaRequest, WatermarkConfig};

/// First failing validation check; checks are ordered, not cumulative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadIssue {
    /// No file staged.
    MissingFile,
    /// Title empty.
    MissingTitle,
    /// No subject chosen.
    MissingSubject,
    /// Authorization box not ticked.
    NotAuthorized,
}

impl UploadIssue {
    /// Translation key for the user-visible message.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::MissingFile => "upload.missing_file",
            Self::MissingTitle => "upload.missing_title",
            Self::MissingSubject => "upload.missing_subject",
            Self::NotAuthorized => "upload.not_authorized",
        }
    }
}

/// Validate the draft in order: file, title, subject, authorization.
///
/// # Errors
/// Returns the first failing check only.
pub fn validate(draft: &UploadDraft) -> Result<(), UploadIssue> {
    if draft.file_name.is_none() {
        return Err(UploadIssue::MissingFile);
    }
    if draft.title.trim().is_empty() {
        return Err(UploadIssue::MissingTitle);
    }
    if draft.subject.trim().is_empty() {
        return Err(UploadIssue::MissingSubject);
    }
    if !draft.authorized {
        return Err(UploadIssue::NotAuthorized);
    }
    Ok(())
}

/// Media kind of the staged file, from its MIME type.
#[must_use]
pub fn staged_kind(draft: &UploadDraft) -> MediaKind {
    MediaKind::from_wire(&draft.file_mime)
}

/// Assemble the registration payload for phase two.
///
/// Watermark directives are only attached for image/video files and only to
/// the extent the config permits: the enable flag when the user may toggle,
/// and the chosen preset — sent under both the current and the legacy field
/// name — when the user may choose.
#[must_use]
pub fn build_register_request(
    draft: &UploadDraft,
    upload_id: String,
    watermark: &WatermarkConfig,
) -> RegisterMediaRequest {
    let kind = staged_kind(draft);
    let watermark_applies = watermark.enabled && kind != MediaKind::Audio;
    let watermark_enabled = (watermark_applies && watermark.user_can_toggle)
        .then_some(draft.watermark_enabled);
    let choice = if watermark_applies && watermark.user_can_choose_preset {
        draft
            .watermark_choice
            .clone()
            .or_else(|| watermark.default_choice.clone())
    } else {
        None
    };
    RegisterMediaRequest {
        upload_id,
        title: draft.title.trim().to_string(),
        gender: draft.subject.clone(),
        description: {
            let trimmed = draft.description.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        },
        tags: if draft.tags.is_empty() {
            None
        } else {
            Some(draft.tags.clone())
        },
        watermark_enabled,
        watermark_choice: choice.clone(),
        watermark_preset_id: choice,
        authorized: draft.authorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_draft() -> UploadDraft {
        UploadDraft {
            file_name: Some("clip.mp4".into()),
            file_mime: "video/mp4".into(),
            title: "A clip".into(),
            subject: "any".into(),
            authorized: true,
            ..UploadDraft::default()
        }
    }

    #[test]
    fn validation_reports_first_failure_only() {
        let mut draft = UploadDraft::default();
        assert_eq!(validate(&draft), Err(UploadIssue::MissingFile));
        draft.file_name = Some("a.jpg".into());
        assert_eq!(validate(&draft), Err(UploadIssue::MissingTitle));
        draft.title = "t".into();
        assert_eq!(validate(&draft), Err(UploadIssue::MissingSubject));
        draft.subject = "any".into();
        assert_eq!(validate(&draft), Err(UploadIssue::NotAuthorized));
        draft.authorized = true;
        assert_eq!(validate(&draft), Ok(()));
    }

    #[test]
    fn whitespace_title_fails_validation() {
        let mut draft = ready_draft();
        draft.title = "   ".into();
        assert_eq!(validate(&draft), Err(UploadIssue::MissingTitle));
    }

    #[test]
    fn preset_travels_under_both_field_names() {
        let mut draft = ready_draft();
        draft.watermark_enabled = true;
        draft.watermark_choice = Some("corner".into());
        let config = WatermarkConfig {
            enabled: true,
            user_can_toggle: true,
            user_can_choose_preset: true,
            choices: vec!["corner".into()],
            default_choice: None,
        };
        let request = build_register_request(&draft, "u1".into(), &config);
        assert_eq!(request.watermark_enabled, Some(true));
        assert_eq!(request.watermark_choice.as_deref(), Some("corner"));
        assert_eq!(request.watermark_preset_id.as_deref(), Some("corner"));
    }

    #[test]
    fn audio_uploads_never_carry_watermark_fields() {
        let mut draft = ready_draft();
        draft.file_name = Some("song.ogg".into());
        draft.file_mime = "audio/ogg".into();
        draft.watermark_enabled = true;
        draft.watermark_choice = Some("corner".into());
        let config = WatermarkConfig {
            enabled: true,
            user_can_toggle: true,
            user_can_choose_preset: true,
            choices: vec!["corner".into()],
            default_choice: None,
        };
        let request = build_register_request(&draft, "u1".into(), &config);
        assert_eq!(request.watermark_enabled, None);
        assert_eq!(request.watermark_choice, None);
        assert_eq!(request.watermark_preset_id, None);
    }

    #[test]
    fn restricted_config_strips_directives_and_defaults_apply() {
        let draft = ready_draft();
        let no_toggle = WatermarkConfig {
            enabled: true,
            user_can_toggle: false,
            user_can_choose_preset: true,
            choices: vec!["corner".into()],
            default_choice: Some("corner".into()),
        };
        let request = build_register_request(&draft, "u1".into(), &no_toggle);
        assert_eq!(request.watermark_enabled, None);
        assert_eq!(request.watermark_choice.as_deref(), Some("corner"));

        let request = build_register_request(&draft, "u2".into(), &WatermarkConfig::default());
        assert_eq!(request.watermark_enabled, None);
        assert_eq!(request.watermark_choice, None);
    }

    #[test]
    fn empty_description_and_tags_are_omitted() {
        let request = build_register_request(&ready_draft(), "u1".into(), &WatermarkConfig::default());
        assert_eq!(request.description, None);
        assert_eq!(request.tags, None);
        assert_eq!(request.gender, "any");
        assert!(request.authorized);
    }
}
