use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DeleteTarget {
    Trip(String),
    Collection(String),
    Activity(String),
    Friendship(String),
    Collaborator(String),
}

impl DeleteTarget {
    pub fn id(&self) -> &str {
        match self {
            DeleteTarget::Trip(id)
            | DeleteTarget::Collection(id)
            | DeleteTarget::Activity(id)
            | DeleteTarget::Friendship(id)
            | DeleteTarget::Collaborator(id) => id,
        }
    }

    pub fn prompt(&self) -> (&'static str, &'static str) {
        match self {
            DeleteTarget::Trip(_) => (
                "Delete trip",
                "All days and activities of this trip will be lost.",
            ),
            DeleteTarget::Collection(_) => (
                "Delete collection",
                "The trips inside are kept and become standalone trips.",
            ),
            DeleteTarget::Activity(_) => ("Delete activity", "This activity will be removed."),
            DeleteTarget::Friendship(_) => ("Remove friend", "Remove this friend or request?"),
            DeleteTarget::Collaborator(_) => ("Remove collaborator", "Remove this collaborator?"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDeletion {
    target: Option<DeleteTarget>,
}

impl PendingDeletion {
    pub fn request(&mut self, target: DeleteTarget) {
        self.target = Some(target);
    }

    pub fn pending(&self) -> Option<&DeleteTarget> {
        self.target.as_ref()
    }

    pub fn cancel(&mut self) {
        self.target = None;
    }

    pub fn confirm(&mut self) -> Option<DeleteTarget> {
        self.target.take()
    }
}
