//! crates/study_tutor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any wire format or storage layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::subject::Subject;

// Represents a user - created at login, held for the session lifetime.
// The id is client-generated: the Unix-millisecond timestamp at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl User {
    /// Creates a new user stamped with the current time as its id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Utc::now().timestamp_millis(),
            name: name.into(),
            email: email.into(),
            avatar: None,
        }
    }
}

/// One user-selected topic of learning, with its own conversation
/// and progress.
#[derive(Debug, Clone)]
pub struct Study {
    pub id: Uuid,
    pub title: String,
    pub subject: Subject,
    pub last_active: DateTime<Utc>,
    /// Mastery progress, 0 to 100.
    pub progress: u8,
    pub questions_answered: u32,
    /// Difficulty level, 1 to 5.
    pub difficulty: u8,
}

impl Study {
    /// Creates a fresh study for the given topic title, classifying its
    /// subject from the title.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let subject = Subject::classify(&title);
        Self {
            id: Uuid::new_v4(),
            title,
            subject,
            last_active: Utc::now(),
            progress: 0,
            questions_answered: 0,
            difficulty: 1,
        }
    }

    /// Records one successful tutoring exchange: progress advances by a
    /// fixed step saturating at 100, and the activity timestamp refreshes.
    pub fn record_tutoring_exchange(&mut self) {
        self.progress = (self.progress + 10).min(100);
        self.questions_answered += 1;
        self.last_active = Utc::now();
    }
}

/// Studies bucketed by inferred subject, newest study first.
#[derive(Debug, Clone)]
pub struct StudyGroup {
    pub id: Uuid,
    pub subject: Subject,
    pub studies: Vec<Study>,
}

impl StudyGroup {
    pub fn new(subject: Subject) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            studies: Vec::new(),
        }
    }

    /// Display name of the group - the subject name.
    pub fn name(&self) -> &'static str {
        self.subject.name()
    }

    pub fn icon(&self) -> &'static str {
        self.subject.icon()
    }

    pub fn color(&self) -> &'static str {
        self.subject.color()
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Ai,
}

/// A single chat message within one study's conversation.
/// Ids are monotonic within an application session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Backend-issued opaque conversation identifier, one per study.
/// Reused for every exchange of that study and never invalidated
/// client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The result of one exchange with the tutoring backend.
#[derive(Debug, Clone)]
pub struct TutorReply {
    /// The tutor's reply text.
    pub message: String,
    /// Present when the backend (re)assigned a conversation token.
    pub session: Option<SessionToken>,
    /// Backend-reported stage of the tutoring dialogue,
    /// e.g. "feynman_tutoring".
    pub phase: Option<String>,
}

impl TutorReply {
    /// Whether the backend reported a tutoring phase for this exchange.
    /// Tutoring phases drive progress increments.
    pub fn is_tutoring_phase(&self) -> bool {
        self.phase
            .as_deref()
            .is_some_and(|p| p.contains("tutoring"))
    }
}
