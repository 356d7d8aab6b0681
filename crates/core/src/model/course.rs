use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, QuestionId};

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Catalog entry for a course.
///
/// Only the fields the engines read are modelled; presentation data (icons,
/// colours, descriptions) belongs to the content layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub total_lessons: u32,
}

impl Course {
    #[must_use]
    pub fn new(id: CourseId, name: impl Into<String>, total_lessons: u32) -> Self {
        Self {
            id,
            name: name.into(),
            total_lessons,
        }
    }
}

/// Finds a course by id in an ordered catalog.
#[must_use]
pub fn find_course<'a>(catalog: &'a [Course], id: &CourseId) -> Option<&'a Course> {
    catalog.iter().find(|course| &course.id == id)
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question from a course's question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Lesson that introduces the concept, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson: Option<u32>,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
    ) -> Self {
        Self {
            id,
            lesson: None,
            prompt: prompt.into(),
            options,
            correct_answer,
        }
    }

    #[must_use]
    pub fn for_lesson(mut self, lesson: u32) -> Self {
        self.lesson = Some(lesson);
        self
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_course_matches_by_id() {
        let catalog = vec![
            Course::new(CourseId::new("python-basics"), "Python", 20),
            Course::new(CourseId::new("web-dev"), "Web", 25),
        ];

        let found = find_course(&catalog, &CourseId::new("web-dev")).unwrap();
        assert_eq!(found.total_lessons, 25);
        assert!(find_course(&catalog, &CourseId::new("rust")).is_none());
    }

    #[test]
    fn question_checks_selected_option() {
        let q = Question::new(
            QuestionId::new(1),
            "What is 10 % 3?",
            vec!["3".into(), "1".into()],
            1,
        )
        .for_lesson(3);

        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.lesson, Some(3));
    }
}
