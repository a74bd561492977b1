/// In-flight mutations and the optimistic board view
///
/// Every background form submission is recorded in [`PendingMutations`]
/// under a key of (kind, target). One key holds at most one mutation:
/// submitting again for the same key replaces the earlier entry and hands
/// out a new [`Ticket`], so the latest submission is the one shown. When a
/// request completes its ticket is settled; settling a ticket that has since
/// been replaced does nothing.
///
/// [`Board::view`] combines the authoritative board with whatever is pending:
///
/// - created sections and tasks appear as placeholders at the end of their list
/// - rows being deleted stay visible with `deleting` set
/// - title and description edits show the submitted value
/// - a toggle shows the opposite of the completion state it was sent with
///
/// Mutations that target a row missing from the board are skipped.
///
/// # Example
///
/// ```
/// # use swft_shared::board::{Board, Mutation, PendingMutations};
/// # fn example(board: &Board, task_id: uuid::Uuid) {
/// let mut pending = PendingMutations::new();
/// let ticket = pending.submit(Mutation::EditTaskTitle {
///     task_id,
///     title: "Ship it".to_string(),
/// });
///
/// let view = board.view(&pending);
/// // ... render view, then once the request returns:
/// pending.settle(ticket);
/// # }
/// ```

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::Board;
use crate::models::{project::Project, user::UserSummary};

/// The independent kinds of board mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    CreateSection,
    EditSectionTitle,
    DeleteSection,
    CreateTask,
    DeleteTask,
    EditTaskTitle,
    EditTaskDescription,
    ToggleTask,
}

/// A submitted but unconfirmed change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateSection { title: String },
    EditSectionTitle { section_id: Uuid, title: String },
    DeleteSection { section_id: Uuid },
    CreateTask { section_id: Uuid, title: String },
    DeleteTask { task_id: Uuid },
    EditTaskTitle { task_id: Uuid, title: String },
    EditTaskDescription { task_id: Uuid, description: Option<String> },
    /// `completed` is the state the client displayed when it toggled
    ToggleTask { task_id: Uuid, completed: bool },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::CreateSection { .. } => MutationKind::CreateSection,
            Mutation::EditSectionTitle { .. } => MutationKind::EditSectionTitle,
            Mutation::DeleteSection { .. } => MutationKind::DeleteSection,
            Mutation::CreateTask { .. } => MutationKind::CreateTask,
            Mutation::DeleteTask { .. } => MutationKind::DeleteTask,
            Mutation::EditTaskTitle { .. } => MutationKind::EditTaskTitle,
            Mutation::EditTaskDescription { .. } => MutationKind::EditTaskDescription,
            Mutation::ToggleTask { .. } => MutationKind::ToggleTask,
        }
    }

    /// Row the mutation applies to
    ///
    /// `None` for creating a section (one add-section form per board).
    /// Creating a task targets its section, which owns the add-task form.
    pub fn target(&self) -> Option<Uuid> {
        match self {
            Mutation::CreateSection { .. } => None,
            Mutation::EditSectionTitle { section_id, .. }
            | Mutation::DeleteSection { section_id }
            | Mutation::CreateTask { section_id, .. } => Some(*section_id),
            Mutation::DeleteTask { task_id }
            | Mutation::EditTaskTitle { task_id, .. }
            | Mutation::EditTaskDescription { task_id, .. }
            | Mutation::ToggleTask { task_id, .. } => Some(*task_id),
        }
    }

    pub fn key(&self) -> MutationKey {
        MutationKey {
            kind: self.kind(),
            target: self.target(),
        }
    }
}

/// Identity of a tracked mutation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationKey {
    pub kind: MutationKind,
    pub target: Option<Uuid>,
}

/// Receipt for one submission, used to settle it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
struct Entry {
    ticket: Ticket,
    mutation: Mutation,
}

/// Tracker of in-flight mutations, at most one per key
#[derive(Debug, Clone, Default)]
pub struct PendingMutations {
    entries: HashMap<MutationKey, Entry>,
    next_ticket: u64,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a submission, replacing any pending one with the same key
    pub fn submit(&mut self, mutation: Mutation) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.entries.insert(mutation.key(), Entry { ticket, mutation });
        ticket
    }

    /// Clears the entry for `ticket`
    ///
    /// Returns `false` when the ticket is unknown or was superseded by a
    /// later submission for the same key.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        let key = self
            .entries
            .iter()
            .find(|(_, entry)| entry.ticket == ticket)
            .map(|(key, _)| *key);

        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn get(&self, key: &MutationKey) -> Option<&Mutation> {
        self.entries.get(key).map(|entry| &entry.mutation)
    }

    pub fn is_pending(&self, kind: MutationKind, target: Option<Uuid>) -> bool {
        self.entries.contains_key(&MutationKey { kind, target })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, kind: MutationKind, target: Option<Uuid>) -> Option<&Mutation> {
        self.get(&MutationKey { kind, target })
    }

    /// Pending kinds targeting `target`, sorted
    fn kinds_for(&self, target: Uuid) -> Vec<MutationKind> {
        let mut kinds: Vec<MutationKind> = self
            .entries
            .keys()
            .filter(|key| key.target == Some(target))
            .map(|key| key.kind)
            .collect();
        kinds.sort();
        kinds
    }
}

/// Task as displayed, with optimistic changes applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// `None` for a placeholder not yet confirmed by the server
    pub id: Option<Uuid>,
    pub section_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub placeholder: bool,
    pub deleting: bool,
    pub pending: Vec<MutationKind>,
}

impl TaskView {
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.pending.contains(&kind)
    }

    /// Placeholders and rows being deleted don't accept input
    pub fn is_interactive(&self) -> bool {
        !self.placeholder && !self.deleting
    }
}

/// Section as displayed, with optimistic changes applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: Option<Uuid>,
    pub title: String,
    pub placeholder: bool,
    pub deleting: bool,
    pub pending: Vec<MutationKind>,
    pub tasks: Vec<TaskView>,
}

impl SectionView {
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.pending.contains(&kind)
    }

    pub fn is_interactive(&self) -> bool {
        !self.placeholder && !self.deleting
    }
}

/// Board as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub owner: UserSummary,
    pub project: Project,
    pub sections: Vec<SectionView>,
}

impl BoardView {
    pub fn section(&self, id: Uuid) -> Option<&SectionView> {
        self.sections.iter().find(|s| s.id == Some(id))
    }

    pub fn task(&self, id: Uuid) -> Option<&TaskView> {
        self.sections
            .iter()
            .flat_map(|s| s.tasks.iter())
            .find(|t| t.id == Some(id))
    }
}

impl Board {
    /// Derives the displayed board from server data plus pending mutations
    pub fn view(&self, pending: &PendingMutations) -> BoardView {
        let mut sections: Vec<SectionView> = self
            .sections
            .iter()
            .map(|entry| {
                let section = &entry.section;

                let mut tasks: Vec<TaskView> = entry
                    .tasks
                    .iter()
                    .map(|task| {
                        let title = match pending.find(MutationKind::EditTaskTitle, Some(task.id)) {
                            Some(Mutation::EditTaskTitle { title, .. }) => title.clone(),
                            _ => task.title.clone(),
                        };
                        let description =
                            match pending.find(MutationKind::EditTaskDescription, Some(task.id)) {
                                Some(Mutation::EditTaskDescription { description, .. }) => {
                                    description.clone()
                                }
                                _ => task.description.clone(),
                            };
                        let completed = match pending.find(MutationKind::ToggleTask, Some(task.id)) {
                            Some(Mutation::ToggleTask { completed, .. }) => !completed,
                            _ => task.completed,
                        };

                        TaskView {
                            id: Some(task.id),
                            section_id: task.section_id,
                            title,
                            description,
                            completed,
                            placeholder: false,
                            deleting: pending.is_pending(MutationKind::DeleteTask, Some(task.id)),
                            pending: pending.kinds_for(task.id),
                        }
                    })
                    .collect();

                if let Some(Mutation::CreateTask { title, .. }) =
                    pending.find(MutationKind::CreateTask, Some(section.id))
                {
                    tasks.push(TaskView {
                        id: None,
                        section_id: section.id,
                        title: title.clone(),
                        description: None,
                        completed: false,
                        placeholder: true,
                        deleting: false,
                        pending: vec![MutationKind::CreateTask],
                    });
                }

                let title = match pending.find(MutationKind::EditSectionTitle, Some(section.id)) {
                    Some(Mutation::EditSectionTitle { title, .. }) => title.clone(),
                    _ => section.title.clone(),
                };

                SectionView {
                    id: Some(section.id),
                    title,
                    placeholder: false,
                    deleting: pending.is_pending(MutationKind::DeleteSection, Some(section.id)),
                    pending: pending.kinds_for(section.id),
                    tasks,
                }
            })
            .collect();

        if let Some(Mutation::CreateSection { title }) = pending.find(MutationKind::CreateSection, None) {
            sections.push(SectionView {
                id: None,
                title: title.clone(),
                placeholder: true,
                deleting: false,
                pending: vec![MutationKind::CreateSection],
                tasks: Vec::new(),
            });
        }

        BoardView {
            owner: self.owner.clone(),
            project: self.project.clone(),
            sections,
        }
    }
}
