//! services/client/src/session/directory.rs
//!
//! The study directory: all of a user's studies, bucketed into groups by
//! inferred subject. Groups and the studies within them are ordered
//! most-recently-created first.

use study_tutor_core::domain::{Study, StudyGroup};
use study_tutor_core::subject::Subject;
use uuid::Uuid;

/// Grouping of studies by subject. Each study belongs to exactly one group;
/// lookups go by stable study id, never by position.
#[derive(Debug, Default)]
pub struct StudyDirectory {
    groups: Vec<StudyGroup>,
}

impl StudyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[StudyGroup] {
        &self.groups
    }

    /// Inserts a new study, prepending it into its subject's group. A
    /// subject seen for the first time gets a new group, prepended ahead of
    /// the existing ones.
    pub fn insert(&mut self, study: Study) {
        match self.groups.iter_mut().find(|g| g.subject == study.subject) {
            Some(group) => group.studies.insert(0, study),
            None => {
                let mut group = StudyGroup::new(study.subject);
                group.studies.push(study);
                self.groups.insert(0, group);
            }
        }
    }

    pub fn study(&self, study_id: Uuid) -> Option<&Study> {
        self.groups
            .iter()
            .flat_map(|g| g.studies.iter())
            .find(|s| s.id == study_id)
    }

    /// Mutable access to a study. The directory entry is the single owned
    /// copy, so callers mutating through here keep every view consistent.
    pub fn study_mut(&mut self, study_id: Uuid) -> Option<&mut Study> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.studies.iter_mut())
            .find(|s| s.id == study_id)
    }

    /// All studies, in directory order (group order, then newest-first
    /// within each group).
    pub fn studies(&self) -> impl Iterator<Item = &Study> {
        self.groups.iter().flat_map(|g| g.studies.iter())
    }

    pub fn group_for_subject(&self, subject: Subject) -> Option<&StudyGroup> {
        self.groups.iter().find(|g| g.subject == subject)
    }
}
