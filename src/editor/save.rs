//! Template persistence.
//!
//! Saving is wholesale: children are deleted and reinserted through a
//! single [`ContentStore::replace_children`] call, never diffed. A save
//! whose target differs from the template's owner (premade template, or a
//! different organization) forks a copy; premade and foreign templates
//! are never overwritten.

use crate::editor::state::EditorState;
use crate::foundation::error::SlidecastResult;
use crate::scene::{OrgId, TemplateId};
use crate::store::ContentStore;

/// How a save resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The template was updated under its existing identity.
    UpdatedInPlace { template: TemplateId },
    /// A copy was inserted for the target organization; the editor now
    /// points at the fork.
    ForkedCopy { template: TemplateId },
}

impl SaveOutcome {
    /// The template id the document is persisted under after the save.
    pub fn template(self) -> TemplateId {
        match self {
            SaveOutcome::UpdatedInPlace { template } | SaveOutcome::ForkedCopy { template } => {
                template
            }
        }
    }
}

/// Persist the edited document for `target_org`.
///
/// On failure the in-memory document keeps its dirty flag, so the user
/// can retry without re-entering anything.
pub fn save_template(
    store: &mut dyn ContentStore,
    state: &mut EditorState,
    target_org: OrgId,
) -> SlidecastResult<SaveOutcome> {
    state.template().validate()?;

    let foreign = state.template().org != Some(target_org);
    let outcome = if state.template().premade || foreign {
        state.fork_for(target_org);
        let (slides, layers) = state.snapshot_children();
        let template = state.template().clone();
        let id = template.id;
        store.insert_template(template, slides, layers)?;
        tracing::debug!(template = %id, "saved template as fork");
        SaveOutcome::ForkedCopy { template: id }
    } else {
        let (slides, layers) = state.snapshot_children();
        let template = state.template().clone();
        let id = template.id;
        store.update_template(template)?;
        store.replace_children(id, slides, layers)?;
        tracing::debug!(template = %id, "saved template in place");
        SaveOutcome::UpdatedInPlace { template: id }
    };

    state.dirty = false;
    Ok(outcome)
}

#[cfg(test)]
#[path = "../../tests/unit/editor/save.rs"]
mod tests;
