//! Catalog of canned rejection reasons.

use serde::Serialize;

/// Whether a reason carries fixed text or caller-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteForm {
    /// Fixed text from the catalog.
    Static,
    /// Free text supplied by the approver.
    Dynamic,
}

/// Localized labels of a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Translations {
    /// Dutch.
    pub nl: &'static str,
    /// English.
    pub en: &'static str,
    /// German.
    pub de: &'static str,
}

/// One canned rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RejectionNote {
    /// Catalog id.
    pub rnote_id: u32,
    /// Static or dynamic.
    pub form: NoteForm,
    /// Text stored on the claim for static reasons.
    pub rnote: &'static str,
    /// Labels per locale.
    pub translations: Translations,
}

/// Id of the free-text reason.
pub const OTHER_REASON_ID: u32 = 4;

/// The fixed catalog, ordered by id.
pub const REJECTION_NOTES: [RejectionNote; 4] = [
    RejectionNote {
        rnote_id: 1,
        form: NoteForm::Static,
        rnote: "Deze kosten kun je declareren via Regweb (PSA)",
        translations: Translations {
            nl: "Deze kosten kun je declareren via Regweb (PSA)",
            en: "These costs can be claimed via Regweb (PSA)",
            de: "Diese Kosten können über Regweb (PSA) geltend gemacht werden",
        },
    },
    RejectionNote {
        rnote_id: 2,
        form: NoteForm::Static,
        rnote: "Deze kosten kun je declareren via de leasemaatschappij",
        translations: Translations {
            nl: "Deze kosten kun je declareren via de leasemaatschappij",
            en: "These costs can be claimed via the lease company",
            de: "Diese Kosten können über die Leasinggesellschaft geltend gemacht werden",
        },
    },
    RejectionNote {
        rnote_id: 3,
        form: NoteForm::Static,
        rnote: "Deze kosten zijn al gedeclareerd",
        translations: Translations {
            nl: "Deze kosten zijn al gedeclareerd",
            en: "These costs have already been claimed",
            de: "Diese Kosten wurden bereits geltend gemacht",
        },
    },
    RejectionNote {
        rnote_id: OTHER_REASON_ID,
        form: NoteForm::Dynamic,
        rnote: "note",
        translations: Translations {
            nl: "Andere reden:",
            en: "Other reason:",
            de: "Anderer Grund:",
        },
    },
];

/// Looks up a reason by id.
#[must_use]
pub fn find(rnote_id: u32) -> Option<&'static RejectionNote> {
    REJECTION_NOTES.iter().find(|note| note.rnote_id == rnote_id)
}

/// Resolves the reason to store from the requested id and text.
///
/// Returns `None` when no valid reason can be formed: unknown id, the
/// dynamic reason without text, or neither id nor text. A bare text is
/// matched against the static reasons and otherwise treated as the dynamic
/// one.
#[must_use]
pub fn resolve(rnote_id: Option<u32>, rnote: Option<&str>) -> Option<(u32, String)> {
    let text = rnote.map(str::trim).filter(|t| !t.is_empty());

    let id = match (rnote_id, text) {
        (Some(id), _) => id,
        (None, Some(text)) => REJECTION_NOTES
            .iter()
            .find(|note| note.form == NoteForm::Static && note.rnote == text)
            .map_or(OTHER_REASON_ID, |note| note.rnote_id),
        (None, None) => return None,
    };

    let note = find(id)?;
    match note.form {
        NoteForm::Static => Some((id, note.rnote.to_string())),
        NoteForm::Dynamic => text.map(|t| (id, t.to_string())),
    }
}
