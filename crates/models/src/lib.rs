pub mod course;
pub mod instance;
pub mod term;
pub mod validation;

pub use course::{Course, CourseId, NewCourse};
pub use instance::{
    CourseInstance, EmbeddedCourse, FlatInstance, InstanceKey, NestedInstance, NewInstance,
    RawInstance, normalize_instance,
};
pub use term::{InvalidSemester, Semester, Term, Year};
pub use validation::{CourseForm, Field, FormErrors, InstanceForm};
