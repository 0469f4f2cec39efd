//! Persistence across catalog reopen
//!
//! Every live mutation reaches the entity files; a fresh catalog over the
//! same directory sees exactly the surviving records.

use campusdb::catalog::{Catalog, CatalogOptions};
use campusdb::entities::{Department, Enrollment, EnrollmentStatus, Grade, Instructor};
use std::fs;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Catalog {
    Catalog::open(dir.path(), CatalogOptions::default()).unwrap()
}

/// Inserts, updates and deletes survive a reopen.
#[test]
fn test_reopen_sees_all_mutations() {
    let dir = TempDir::new().unwrap();
    {
        let catalog = open(&dir);
        catalog.insert(Department::new(1, "CS", "12345")).unwrap();
        catalog.insert(Department::new(2, "Math", "222")).unwrap();
        catalog
            .insert(Instructor::new(7, "Ada", "Lovelace", "ada@uni.edu", 1))
            .unwrap();
        catalog.update_department_phone(1, "+9000").unwrap();
        catalog.update_instructor_email(7, "ada@cs.uni.edu").unwrap();
        catalog.add_instructor_phone(7, "111").unwrap();
        catalog.delete::<Department>(2).unwrap();
    }

    let catalog = open(&dir);
    assert_eq!(catalog.departments().live_keys(), vec![1]);
    assert_eq!(catalog.get::<Department>(1).unwrap().phone, "+9000");
    assert_eq!(
        catalog.instructor_by_email("ada@cs.uni.edu").unwrap().id,
        7
    );
    assert_eq!(catalog.phones_of_instructor(7).len(), 1);
    assert_eq!(catalog.metrics().snapshot().records_loaded, 3);
}

/// File lines follow the documented layouts.
#[test]
fn test_file_layouts() {
    let dir = TempDir::new().unwrap();
    let catalog = open(&dir);
    catalog.insert(Department::new(1, "CS", "12345")).unwrap();
    catalog
        .insert(Instructor::new(7, "Ada", "Lovelace", "ada@uni.edu", 1))
        .unwrap();
    catalog.add_instructor_phone(7, "+4411").unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Departments.txt")).unwrap(),
        "1 CS 12345\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Instructors.txt")).unwrap(),
        "7 Ada Lovelace ada@uni.edu 1\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("instructor_phones.txt")).unwrap(),
        "1 7 +4411\n"
    );
    assert!(!dir.path().join("Departments_temp.txt").exists());
}

/// Enrollment grade and status are rewritten in place.
#[test]
fn test_enrollment_rewrite() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Departments.txt"), "1 CS 12345\n").unwrap();
    fs::write(dir.path().join("Instructors.txt"), "7 Ada Lovelace ada@uni.edu 1\n").unwrap();
    fs::write(
        dir.path().join("Students.txt"),
        "3 Alan Turing alan@uni.edu 5550001 1\n",
    )
    .unwrap();
    fs::write(dir.path().join("Courses.txt"), "10 Compilers 4 1 7\n").unwrap();
    fs::write(dir.path().join("Enrollments.txt"), "1 3 10 - 0\n2 3 10 - 1\n").unwrap();

    let catalog = open(&dir);
    catalog.update_enrollment_grade(1, Some(Grade::B)).unwrap();
    catalog
        .update_enrollment_status(1, EnrollmentStatus::Completed)
        .unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("Enrollments.txt")).unwrap(),
        "1 3 10 B 2\n2 3 10 - 1\n"
    );
    let stats = catalog.course_stats(10).unwrap();
    assert_eq!((stats.enrolled, stats.dropped, stats.completed), (0, 1, 1));
    assert_eq!(catalog.enrollment_for(3, 10).map(|e: Enrollment| e.id), Some(1));
}

/// Records loaded from disk skip validation; live inserts do not.
#[test]
fn test_load_bypasses_validation() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Departments.txt"), "1 CS not-a-phone\n").unwrap();

    let catalog = open(&dir);
    assert_eq!(catalog.get::<Department>(1).unwrap().phone, "not-a-phone");

    let err = catalog
        .insert(Department::new(2, "Math", "not-a-phone"))
        .unwrap_err();
    assert_eq!(err.code(), "CAMPUS_VALIDATION_ERROR");
}

/// A malformed line fails the open and names its line number.
#[test]
fn test_malformed_line_fails_open() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Courses.txt"), "10 Compilers 4 1 7\n11 Algebra\n").unwrap();

    let err = Catalog::open(dir.path(), CatalogOptions::default()).unwrap_err();
    assert_eq!(err.code(), "CAMPUS_MALFORMED_RECORD");
    assert!(err.to_string().contains("Courses.txt:2"), "got: {}", err);
}

/// A failed append reports an IO error but keeps the in-memory insert.
#[test]
fn test_io_failure_does_not_roll_back() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let catalog = Catalog::open(&data, CatalogOptions::default()).unwrap();

    fs::remove_dir_all(&data).unwrap();
    let err = catalog.insert(Department::new(1, "CS", "12345")).unwrap_err();

    assert_eq!(err.code(), "CAMPUS_IO_ERROR");
    assert!(err.mutation_applied());
    assert_eq!(catalog.department_by_name("CS").unwrap().id, 1);
    assert_eq!(catalog.metrics().snapshot().persistence_failures, 1);
}
