//! Upload panel slice.

/// Staged upload form. Exists only while the panel is open; cleared on
/// successful submission or explicit reset.
#[derive(Clone, Debug, Default)]
pub struct UploadDraft {
    /// Picked file handle (wasm only; the name/MIME mirror below are what
    /// the pure logic reads).
    #[cfg(target_arch = "wasm32")]
    pub file: Option<web_sys::File>,
    /// File name of the staged file.
    pub file_name: Option<String>,
    /// MIME type reported for the staged file.
    pub file_mime: String,
    /// Item title.
    pub title: String,
    /// Optional description.
    pub description: String,
    /// Subject/category choice.
    pub subject: String,
    /// Selected tags.
    pub tags: Vec<String>,
    /// Watermark toggle, when the user is allowed to toggle.
    pub watermark_enabled: bool,
    /// Chosen watermark preset, when the user may choose.
    pub watermark_choice: Option<String>,
    /// Explicit authorization acknowledgment.
    pub authorized: bool,
}

// The raw file handle is deliberately excluded: two drafts describing the
// same staged file are equal for re-render purposes.
impl PartialEq for UploadDraft {
    fn eq(&self, other: &Self) -> bool {
        self.file_name == other.file_name
            && self.file_mime == other.file_mime
            && self.title == other.title
            && self.description == other.description
            && self.subject == other.subject
            && self.tags == other.tags
            && self.watermark_enabled == other.watermark_enabled
            && self.watermark_choice == other.watermark_choice
            && self.authorized == other.authorized
    }
}

/// Upload slice stored in the app state.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UploadState {
    /// Whether the upload panel is open.
    pub open: bool,
    /// Staged form values.
    pub draft: UploadDraft,
    /// A submit is in flight.
    pub busy: bool,
    /// Validation or server failure shown in the panel.
    pub error: Option<String>,
}

/// Reset the staged form, keeping the panel open flag as-is.
pub fn clear_draft(state: &mut UploadState) {
    state.draft = UploadDraft::default();
    state.error = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_equality_ignores_nothing_visible() {
        let mut a = UploadDraft::default();
        let mut b = UploadDraft::default();
        assert_eq!(a, b);
        a.title = "t".into();
        assert_ne!(a, b);
        b.title = "t".into();
        assert_eq!(a, b);
    }

    #[test]
    fn clear_draft_resets_form_and_error() {
        let mut state = UploadState::default();
        state.draft.title = "t".into();
        state.error = Some("boom".into());
        clear_draft(&mut state);
        assert_eq!(state.draft, UploadDraft::default());
        assert!(state.error.is_none());
    }
}
