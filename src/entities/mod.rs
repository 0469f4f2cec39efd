//! Entity kinds stored by the catalog
//!
//! Each kind is a plain struct with its line layout (`LineRecord`) and its
//! store behavior (`Record`): primary key, secondary key, foreign keys and
//! live validation.

mod course;
mod department;
mod enrollment;
mod instructor;
mod phone;
mod student;
pub mod validation;

pub use course::Course;
pub use department::Department;
pub use enrollment::{Enrollment, EnrollmentStatus, Grade};
pub use instructor::{full_name, Instructor};
pub use phone::PhoneNumber;
pub use student::Student;
