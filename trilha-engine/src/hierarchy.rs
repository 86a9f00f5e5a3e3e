//! Canonical course outline
//!
//! The backend is free to deliver modules and lessons in any order; the
//! engine sorts both by their `order` field before anything else looks at
//! them. Duplicate order values (and duplicate identifiers) are flagged as
//! [`Error::InconsistentHierarchy`] at build time rather than silently
//! resolved — a course that fails to build exposes no accessible lessons.

use std::collections::HashMap;

use trilha_common::models::{Course, CourseId, Lesson, LessonId, Module, ModuleId};
use trilha_common::{Error, Result};

/// A course hierarchy in canonical order, with ordinal lookups
///
/// Immutable once built; a fresh outline is built per hierarchy fetch.
#[derive(Debug, Clone)]
pub struct CourseOutline {
    course_id: CourseId,
    modules: Vec<Module>,
    module_index: HashMap<ModuleId, usize>,
    /// lesson id -> (module position, lesson position within module)
    lesson_index: HashMap<LessonId, (usize, usize)>,
    total_lessons: usize,
}

impl CourseOutline {
    /// Build the canonical outline: modules ascending by `order`, lessons
    /// ascending by `order` within each module.
    pub fn build(mut course: Course) -> Result<Self> {
        course.modules.sort_by_key(|m| m.order);
        check_distinct_orders(
            course.modules.iter().map(|m| m.order),
            &format!("course {}: duplicate module order", course.id),
        )?;

        for module in &mut course.modules {
            module.lessons.sort_by_key(|l| l.order);
            check_distinct_orders(
                module.lessons.iter().map(|l| l.order),
                &format!("module {}: duplicate lesson order", module.id),
            )?;
        }

        let mut module_index = HashMap::new();
        let mut lesson_index = HashMap::new();
        let mut total_lessons = 0;

        for (module_pos, module) in course.modules.iter().enumerate() {
            if module_index.insert(module.id, module_pos).is_some() {
                return Err(inconsistent(format!(
                    "course {}: duplicate module id {}",
                    course.id, module.id
                )));
            }
            for (lesson_pos, lesson) in module.lessons.iter().enumerate() {
                if lesson_index
                    .insert(lesson.id, (module_pos, lesson_pos))
                    .is_some()
                {
                    return Err(inconsistent(format!(
                        "course {}: duplicate lesson id {}",
                        course.id, lesson.id
                    )));
                }
                total_lessons += 1;
            }
        }

        Ok(Self {
            course_id: course.id,
            modules: course.modules,
            module_index,
            lesson_index,
            total_lessons,
        })
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    /// Modules in canonical (ascending order) sequence
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Total lesson count across all modules
    pub fn total_lessons(&self) -> usize {
        self.total_lessons
    }

    pub fn contains_lesson(&self, lesson_id: LessonId) -> bool {
        self.lesson_index.contains_key(&lesson_id)
    }

    /// The module owning the given lesson
    pub fn module_of(&self, lesson_id: LessonId) -> Option<&Module> {
        let (module_pos, _) = self.lesson_index.get(&lesson_id)?;
        Some(&self.modules[*module_pos])
    }

    /// Ordinal position of a module within the course (0-based)
    pub fn module_position(&self, module_id: ModuleId) -> Option<usize> {
        self.module_index.get(&module_id).copied()
    }

    /// Ordinal position of a lesson within its module (0-based)
    pub fn lesson_position(&self, lesson_id: LessonId) -> Option<usize> {
        self.lesson_index.get(&lesson_id).map(|(_, pos)| *pos)
    }

    /// (module position, lesson position) for a lesson, both 0-based
    pub fn locate(&self, lesson_id: LessonId) -> Option<(usize, usize)> {
        self.lesson_index.get(&lesson_id).copied()
    }

    /// The first lesson of the first module, if both exist.
    ///
    /// This is the one lesson previewable without enrollment. A course whose
    /// first module is empty has no preview lesson.
    pub fn first_lesson(&self) -> Option<LessonId> {
        self.modules
            .first()
            .and_then(|m| m.lessons.first())
            .map(|l| l.id)
    }

    /// All lessons in canonical (module order, lesson order) sequence
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

fn check_distinct_orders(orders: impl Iterator<Item = u32>, context: &str) -> Result<()> {
    let mut prev: Option<u32> = None;
    for order in orders {
        // Input is sorted, so duplicates are adjacent
        if prev == Some(order) {
            return Err(inconsistent(format!("{context} {order}")));
        }
        prev = Some(order);
    }
    Ok(())
}

fn inconsistent(message: String) -> Error {
    tracing::warn!(%message, "Inconsistent hierarchy, denying access");
    Error::InconsistentHierarchy(message)
}
