//! crates/study_tutor_core/src/subject.rs
//!
//! Subject classification for study topics. A topic title is mapped to a
//! subject category by case-insensitive keyword matching against a fixed
//! ordered table; the first subject with any matching keyword wins.

use std::fmt;

/// The closed set of subject categories a study can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    ComputerScience,
    History,
    Literature,
    Geography,
    General,
}

/// The classification table. Order matters: the first subject whose keyword
/// set matches the title wins.
const KEYWORDS: &[(Subject, &[&str])] = &[
    (
        Subject::Mathematics,
        &[
            "math", "algebra", "calculus", "geometry", "trigonometry",
            "statistics", "probability", "equation",
        ],
    ),
    (
        Subject::Physics,
        &[
            "physics", "quantum", "mechanics", "relativity", "thermodynamics",
            "gravity", "electromagnet", "optics",
        ],
    ),
    (
        Subject::Chemistry,
        &[
            "chemistry", "chemical", "molecule", "atom", "reaction",
            "periodic", "organic",
        ],
    ),
    (
        Subject::Biology,
        &[
            "biology", "cell", "gene", "evolution", "ecology", "anatomy",
            "organism", "photosynthesis",
        ],
    ),
    (
        Subject::ComputerScience,
        &[
            "computer", "programming", "coding", "algorithm", "software",
            "data structure", "machine learning", "rust", "python",
        ],
    ),
    (
        Subject::History,
        &[
            "history", "war", "revolution", "ancient", "empire",
            "civilization", "medieval",
        ],
    ),
    (
        Subject::Literature,
        &[
            "literature", "poetry", "novel", "shakespeare", "writing",
            "grammar", "essay",
        ],
    ),
    (
        Subject::Geography,
        &["geography", "continent", "climate", "ocean", "volcano", "river"],
    ),
];

impl Subject {
    /// Classifies a free-text topic title into a subject category.
    ///
    /// Deterministic and total: titles matching no keyword fall back
    /// to `General`.
    pub fn classify(title: &str) -> Self {
        let lowered = title.to_lowercase();
        for (subject, keywords) in KEYWORDS {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return *subject;
            }
        }
        Subject::General
    }

    pub fn name(&self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::ComputerScience => "Computer Science",
            Subject::History => "History",
            Subject::Literature => "Literature",
            Subject::Geography => "Geography",
            Subject::General => "General",
        }
    }

    /// Display icon for the subject.
    pub fn icon(&self) -> &'static str {
        match self {
            Subject::Mathematics => "🧮",
            Subject::Physics => "⚛️",
            Subject::Chemistry => "🧪",
            Subject::Biology => "🧬",
            Subject::ComputerScience => "💻",
            Subject::History => "🏛️",
            Subject::Literature => "📖",
            Subject::Geography => "🌍",
            Subject::General => "📚",
        }
    }

    /// Display color (hex) for the subject. Unknown subjects are gray.
    pub fn color(&self) -> &'static str {
        match self {
            Subject::Mathematics => "#3b82f6",
            Subject::Physics => "#8b5cf6",
            Subject::Chemistry => "#10b981",
            Subject::Biology => "#22c55e",
            Subject::ComputerScience => "#f59e0b",
            Subject::History => "#b45309",
            Subject::Literature => "#ec4899",
            Subject::Geography => "#06b6d4",
            Subject::General => "#6b7280",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
