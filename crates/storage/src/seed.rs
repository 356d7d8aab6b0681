//! Demo content for local runs and integration tests.

use restart_core::model::{Course, CourseId, Question, QuestionId};

use crate::repository::Catalog;

fn course(id: &str, name: &str, total_lessons: u32) -> Course {
    Course::new(CourseId::new(id), name, total_lessons)
}

fn question(id: u64, prompt: &str, options: [&str; 4], correct: usize) -> Question {
    Question::new(
        QuestionId::new(id),
        prompt,
        options.iter().map(|o| (*o).to_owned()).collect(),
        correct,
    )
}

/// The four starter courses, in catalog order.
#[must_use]
pub fn demo_courses() -> Vec<Course> {
    vec![
        course("python-basics", "Python Programming Basics", 20),
        course("web-dev", "Web Development Fundamentals", 25),
        course("data-science", "Data Science Essentials", 30),
        course("ui-design", "UI/UX Design Principles", 18),
    ]
}

/// Review questions for `python-basics`, each tied to the lesson that teaches it.
#[must_use]
pub fn python_question_bank() -> Vec<Question> {
    vec![
        question(
            1,
            "Which of these is a valid Python variable name?",
            ["2cool4school", "my_variable", "my-variable", "my variable"],
            1,
        )
        .for_lesson(1),
        question(
            2,
            "What is the type of: 3.14?",
            ["Integer", "String", "Float", "Boolean"],
            2,
        )
        .for_lesson(2),
        question(3, "What is the result of 10 % 3?", ["3", "1", "10", "0"], 1).for_lesson(3),
        question(
            4,
            "Which keyword is used for \"else if\" in Python?",
            ["elseif", "else if", "elif", "otherwise"],
            2,
        )
        .for_lesson(6),
        question(
            5,
            "How do you access the first element of a list named \"fruits\"?",
            ["fruits[1]", "fruits(0)", "fruits[0]", "fruits.first()"],
            2,
        )
        .for_lesson(8),
        question(
            6,
            "What does a \"for\" loop do?",
            [
                "Tests if a condition is true",
                "Defines a new function",
                "Iterates over a sequence",
                "Stores data in a variable",
            ],
            2,
        )
        .for_lesson(9),
        question(
            7,
            "How do you define a function in Python?",
            ["function myFunc():", "def myFunc():", "create myFunc():", "func myFunc():"],
            1,
        )
        .for_lesson(11),
    ]
}

/// Review questions for `web-dev`. These are not tied to lessons.
#[must_use]
pub fn web_question_bank() -> Vec<Question> {
    vec![
        question(
            1,
            "Which HTML tag is used for the largest heading?",
            ["<heading>", "<h6>", "<h1>", "<head>"],
            2,
        ),
        question(
            2,
            "How do you select an element with class \"button\" in CSS?",
            ["#button", ".button", "button", "*button"],
            1,
        ),
    ]
}

/// Demo catalog with question banks and the built-in badge rules.
#[must_use]
pub fn demo_catalog() -> Catalog {
    Catalog::new(demo_courses())
        .with_question_bank(CourseId::new("python-basics"), python_question_bank())
        .with_question_bank(CourseId::new("web-dev"), web_question_bank())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_bank_answers_point_at_options() {
        for q in python_question_bank() {
            assert!(q.correct_answer < q.options.len(), "question {}", q.id);
            assert!(q.lesson.is_some());
        }
    }

    #[test]
    fn demo_catalog_starts_with_python() {
        let catalog = demo_catalog();
        assert_eq!(catalog.courses[0].id, CourseId::new("python-basics"));
        assert_eq!(catalog.courses[0].total_lessons, 20);
        assert_eq!(catalog.question_banks.len(), 2);
    }
}
