//! Static MPT subject groups and slug lookup.

/// A quiz-able subject inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub name: &'static str,
    pub slug: &'static str,
}

/// One MPT paper with its sub-subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectGroup {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub subjects: &'static [Subject],
}

const fn subject(name: &'static str, slug: &'static str) -> Subject {
    Subject { name, slug }
}

pub static SUBJECT_GROUPS: &[SubjectGroup] = &[
    SubjectGroup {
        name: "Islamic Studies",
        title: "Islamiat",
        description: "Islamic history, Quran, Sunnah and Fiqh",
        subjects: &[
            subject("Quran & Sunnah", "quran-sunnah"),
            subject("Islamic History", "islamic-history"),
            subject("Fiqh & Jurisprudence", "fiqh"),
        ],
    },
    SubjectGroup {
        name: "Urdu",
        title: "Urdu (Grammar & Translation)",
        description: "Urdu comprehension and language structure",
        subjects: &[
            subject("Grammar", "urdu-grammar"),
            subject("Translation", "urdu-translation"),
        ],
    },
    SubjectGroup {
        name: "English",
        title: "English (Vocabulary, Grammar, Comprehension)",
        description: "English comprehension, writing and grammar skills",
        subjects: &[
            subject("Vocabulary", "english-vocabulary"),
            subject("Grammar", "english-grammar"),
            subject("Comprehension", "english-comprehension"),
        ],
    },
    SubjectGroup {
        name: "General Knowledge",
        title: "General Knowledge",
        description: "Everyday science, Pakistan studies, current affairs",
        subjects: &[
            subject("Pakistan Studies", "pakistan-studies"),
            subject("Current Affairs", "current-affairs"),
            subject("Everyday Science", "everyday-science"),
        ],
    },
    SubjectGroup {
        name: "General Ability",
        title: "General Ability",
        description: "Arithmetic, Algebra, Geometry, Logic & Mental Ability",
        subjects: &[
            subject("Basic Arithmetic", "basic-arithmetic"),
            subject("Algebra", "algebra"),
            subject("Geometry", "geometry"),
            subject("Logical Reasoning", "logical-reasoning"),
            subject("Analytical Ability", "analytical-ability"),
            subject("Mental Ability", "mental-ability"),
        ],
    },
    SubjectGroup {
        name: "Ethics",
        title: "Ethics (For Non-Muslims)",
        description: "Ethics and comparative religion",
        subjects: &[
            subject("Moral Philosophy", "moral-philosophy"),
            subject("Comparative Religion", "comparative-religion"),
        ],
    },
];

/// Find a subject by slug along with the group that owns it.
#[must_use]
pub fn find_subject(slug: &str) -> Option<(&'static SubjectGroup, &'static Subject)> {
    SUBJECT_GROUPS.iter().find_map(|group| {
        group
            .subjects
            .iter()
            .find(|s| s.slug == slug)
            .map(|s| (group, s))
    })
}

/// Case-insensitive filter over subject names, slugs and group names.
///
/// A blank query returns every subject.
#[must_use]
pub fn search(query: &str) -> Vec<(&'static SubjectGroup, &'static Subject)> {
    let needle = query.trim().to_lowercase();
    SUBJECT_GROUPS
        .iter()
        .flat_map(|group| group.subjects.iter().map(move |s| (group, s)))
        .filter(|(group, s)| {
            needle.is_empty()
                || s.name.to_lowercase().contains(&needle)
                || s.slug.contains(&needle)
                || group.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Turn `"basic-arithmetic"` into `"Basic Arithmetic"`.
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The subject a quiz session is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubject {
    pub name: String,
    pub group: Option<String>,
}

impl QuizSubject {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Resolve a route slug. The name is always the title-cased slug, which keeps
    /// subjects that share a display name (both "Grammar" entries) distinct. Catalog
    /// slugs also carry their group.
    #[must_use]
    pub fn from_slug(slug: &str) -> Self {
        let subject = Self::new(title_from_slug(slug));
        match find_subject(slug) {
            Some((group, _)) => subject.with_group(group.name),
            None => subject,
        }
    }

    /// `true` when the name has no visible characters.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slugs_are_unique() {
        let mut seen = HashSet::new();
        for group in SUBJECT_GROUPS {
            for s in group.subjects {
                assert!(seen.insert(s.slug), "duplicate slug {}", s.slug);
            }
        }
        assert_eq!(seen.len(), 19);
    }

    #[test]
    fn finds_subject_with_group() {
        let (group, subject) = find_subject("logical-reasoning").unwrap();
        assert_eq!(group.name, "General Ability");
        assert_eq!(subject.name, "Logical Reasoning");
        assert!(find_subject("astrology").is_none());
    }

    #[test]
    fn search_matches_subjects_and_groups() {
        let grammar: Vec<_> = search("grammar").iter().map(|(_, s)| s.slug).collect();
        assert_eq!(grammar, vec!["urdu-grammar", "english-grammar"]);

        let ethics = search("ETHICS");
        assert_eq!(ethics.len(), 2);

        assert_eq!(search("  ").len(), 19);
        assert!(search("zzz").is_empty());
    }

    #[test]
    fn title_cases_unknown_slugs() {
        assert_eq!(title_from_slug("basic-arithmetic"), "Basic Arithmetic");
        assert_eq!(title_from_slug("x--ray"), "X Ray");
        assert_eq!(title_from_slug(""), "");
    }

    #[test]
    fn quiz_subject_from_slug() {
        assert_eq!(
            QuizSubject::from_slug("fiqh"),
            QuizSubject::new("Fiqh").with_group("Islamic Studies")
        );
        assert_eq!(
            QuizSubject::from_slug("world-history"),
            QuizSubject::new("World History")
        );
    }

    #[test]
    fn subjects_sharing_a_display_name_stay_distinct() {
        let urdu = QuizSubject::from_slug("urdu-grammar");
        let english = QuizSubject::from_slug("english-grammar");

        assert_eq!(urdu, QuizSubject::new("Urdu Grammar").with_group("Urdu"));
        assert_eq!(english, QuizSubject::new("English Grammar").with_group("English"));
        assert_ne!(urdu.name, english.name);
    }

    #[test]
    fn blank_slugs_give_blank_subjects() {
        assert!(QuizSubject::from_slug("").is_blank());
        assert!(QuizSubject::from_slug("--").is_blank());
        assert!(QuizSubject::new("  ").is_blank());
        assert!(!QuizSubject::from_slug("algebra").is_blank());
    }
}
