use webgrade::names::{self, NameError};

#[test]
fn display_name_puts_middle_and_last_before_first() {
    assert_eq!(
        names::resolve("Maria Jane Smith-Doe").unwrap(),
        "janesmithdoemaria"
    );
    assert_eq!(names::resolve("Bob Jones").unwrap(), "jonesbob");
    assert_eq!(
        names::resolve("  Ana  de la   Cruz ").unwrap(),
        "delacruzana"
    );
}

#[test]
fn filename_key_is_the_prefix_verbatim() {
    assert_eq!(names::resolve("bob_dungeon.html").unwrap(), "bob");
    assert_eq!(
        names::resolve("McKay_my_first_webpage_LATE_1.html").unwrap(),
        "McKay"
    );
    assert_eq!(names::key_from_filename("amy.html").unwrap(), "amy");
}

#[test]
fn malformed_names_are_errors() {
    assert_eq!(
        names::key_from_display_name("Prince"),
        Err(NameError::InvalidNameFormat("Prince".into()))
    );
    assert_eq!(
        names::resolve("Cher"),
        Err(NameError::InvalidNameFormat("Cher".into()))
    );
    assert_eq!(
        names::key_from_filename("_dungeon.html"),
        Err(NameError::EmptyKey("_dungeon.html".into()))
    );
}

#[test]
fn late_marker_is_detected_anywhere_in_the_name() {
    assert!(names::is_late("bob_LATE_dungeon.html"));
    assert!(names::is_late("bob_dungeon_LATE_2.html"));
    assert!(!names::is_late("bob_late_dungeon.html"));
    assert!(!names::is_late("bob_dungeon.html"));
}
