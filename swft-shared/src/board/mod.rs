/// Project board
///
/// A [`Board`] is what the board loader returns: the owner, the project and
/// its sections in order, each carrying its tasks in creation order.
///
/// The [`pending`] module layers in-flight mutations on top of a board to
/// derive the optimistic [`BoardView`](pending::BoardView), and
/// [`inline_edit`] models the commit/cancel behaviour of editable fields.

pub mod inline_edit;
pub mod pending;

use serde::Serialize;

use crate::models::{project::Project, section::Section, task::Task, user::UserSummary};

pub use inline_edit::{EditOutcome, InlineEdit};
pub use pending::{BoardView, Mutation, MutationKind, PendingMutations, Ticket};

/// A section together with its tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBoard {
    #[serde(flatten)]
    pub section: Section,
    pub tasks: Vec<Task>,
}

/// Authoritative board data for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub owner: UserSummary,
    pub project: Project,
    pub sections: Vec<SectionBoard>,
}

impl Board {
    /// Groups flat section and task lists into a board
    ///
    /// Sections are ordered by position, tasks by `(created_at, id)`. Tasks
    /// whose section isn't in `sections` are dropped.
    pub fn from_parts(
        owner: UserSummary,
        project: Project,
        mut sections: Vec<Section>,
        mut tasks: Vec<Task>,
    ) -> Self {
        sections.sort_by_key(|s| s.position);
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let sections = sections
            .into_iter()
            .map(|section| {
                let tasks = tasks
                    .iter()
                    .filter(|t| t.section_id == section.id)
                    .cloned()
                    .collect();
                SectionBoard { section, tasks }
            })
            .collect();

        Self {
            owner,
            project,
            sections,
        }
    }

    pub fn section(&self, id: uuid::Uuid) -> Option<&SectionBoard> {
        self.sections.iter().find(|s| s.section.id == id)
    }

    pub fn task(&self, id: uuid::Uuid) -> Option<&Task> {
        self.sections
            .iter()
            .flat_map(|s| s.tasks.iter())
            .find(|t| t.id == id)
    }
}

/// Builders shared by the board tests
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    pub fn owner() -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
        }
    }

    pub fn project(owner: &UserSummary) -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            title: "Launch".to_string(),
            owner_id: owner.id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn section(project: &Project, title: &str, position: i32) -> Section {
        let now = Utc::now();
        Section {
            id: Uuid::new_v4(),
            title: title.to_string(),
            owner_id: project.owner_id,
            project_id: project.id,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Task created `minute` minutes after a fixed epoch
    pub fn task(section: &Section, title: &str, minute: i64) -> Task {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minute);
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            completed: false,
            owner_id: section.owner_id,
            section_id: section.id,
            project_id: section.project_id,
            created_at: created,
            updated_at: created,
        }
    }

    /// Board with "To do" (two tasks) and "Done" (one task)
    pub fn board() -> Board {
        let owner = owner();
        let project = project(&owner);
        let todo = section(&project, "To do", 0);
        let done = section(&project, "Done", 1);
        let tasks = vec![
            task(&todo, "Write copy", 0),
            task(&todo, "Pick colours", 1),
            task(&done, "Buy domain", 2),
        ];
        Board::from_parts(owner, project, vec![todo, done], tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_from_parts_orders_sections_and_tasks() {
        let owner = owner();
        let project = project(&owner);
        let later = section(&project, "Later", 2);
        let now = section(&project, "Now", 0);
        let second = task(&now, "second", 5);
        let first = task(&now, "first", 1);
        let elsewhere = task(&later, "elsewhere", 0);

        let board = Board::from_parts(
            owner,
            project,
            vec![later.clone(), now.clone()],
            vec![second.clone(), elsewhere.clone(), first.clone()],
        );

        assert_eq!(board.sections[0].section.id, now.id);
        assert_eq!(board.sections[1].section.id, later.id);
        assert_eq!(board.sections[0].tasks, vec![first, second]);
        assert_eq!(board.sections[1].tasks, vec![elsewhere]);
    }

    #[test]
    fn test_from_parts_drops_orphan_tasks() {
        let owner = owner();
        let project = project(&owner);
        let kept = section(&project, "Kept", 0);
        let gone = section(&project, "Gone", 1);
        let orphan = task(&gone, "orphan", 0);

        let board = Board::from_parts(owner, project, vec![kept], vec![orphan.clone()]);

        assert!(board.sections[0].tasks.is_empty());
        assert!(board.task(orphan.id).is_none());
    }

    #[test]
    fn test_equal_timestamps_fall_back_to_id() {
        let owner = owner();
        let project = project(&owner);
        let s = section(&project, "Same time", 0);
        let a = task(&s, "a", 0);
        let b = task(&s, "b", 0);

        let board = Board::from_parts(owner, project, vec![s], vec![a.clone(), b.clone()]);
        let ids: Vec<_> = board.sections[0].tasks.iter().map(|t| t.id).collect();

        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_board_serializes_section_fields_inline() {
        let board = board();
        let json = serde_json::to_value(&board).unwrap();

        let first = &json["sections"][0];
        assert_eq!(first["title"], "To do");
        assert_eq!(first["order"], 0);
        assert_eq!(first["tasks"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["owner"]["username"], "ada");
    }
}
