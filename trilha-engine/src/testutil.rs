//! Builders shared by the unit tests

use trilha_common::models::{Course, CourseId, Lesson, LessonId, Module, ModuleId};

pub(crate) fn lesson(id: i64, module_id: i64, order: u32) -> Lesson {
    Lesson {
        id: LessonId(id),
        module_id: ModuleId(module_id),
        order,
    }
}

pub(crate) fn module(id: i64, course_id: i64, order: u32, lessons: Vec<Lesson>) -> Module {
    Module {
        id: ModuleId(id),
        course_id: CourseId(course_id),
        order,
        lessons,
    }
}

pub(crate) fn course(id: i64, modules: Vec<Module>) -> Course {
    Course {
        id: CourseId(id),
        modules,
    }
}
