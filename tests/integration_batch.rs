use labtui::cli::seed_from_file;
use labtui::core::roster::{Roster, TubeColor};

#[test]
fn roster_session_end_to_end() {
    let mut roster = Roster::new();

    let first = roster.add("Іван", "Петренко", TubeColor::Red).expect("add");
    assert_eq!(first.id, 1);
    let second = roster
        .add("Олена", "Коваль", TubeColor::Green)
        .expect("add");
    assert_eq!(second.id, 2);

    let summary = roster.summary();
    assert_eq!(summary.count(TubeColor::Red), 1);
    assert_eq!(summary.count(TubeColor::Yellow), 0);
    assert_eq!(summary.count(TubeColor::Green), 1);
    assert_eq!(summary.count(TubeColor::Blue), 0);

    roster.remove("1").expect("remove");
    let summary = roster.summary();
    assert_eq!(summary.count(TubeColor::Red), 0);
    assert_eq!(summary.count(TubeColor::Green), 1);
    assert_eq!(summary.total(), roster.len());

    // The id is gone for good.
    assert!(roster.remove("1").is_err());
    let third = roster.add("Іван", "Петренко", TubeColor::Red).expect("add");
    assert_eq!(third.id, 3);
}

#[test]
fn seed_file_populates_the_roster() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roster.yaml");
    std::fs::write(
        &path,
        r#"
version: "1.0"
entries:
  - name: Іван
    surname: Петренко
    color: Червона
  - name: Олена
    surname: Коваль
    color: green
  - name: Ґанна
    surname: Їжакевич
"#,
    )
    .expect("write seed");

    let mut roster = Roster::new();
    seed_from_file(&mut roster, TubeColor::Blue, &path.to_string_lossy()).expect("seed");

    assert_eq!(roster.len(), 3);
    assert_eq!(roster.entries()[0].color, TubeColor::Red);
    assert_eq!(roster.entries()[1].color, TubeColor::Green);
    // No color in the file: the default applies.
    assert_eq!(roster.entries()[2].color, TubeColor::Blue);

    let summary = roster.summary();
    assert_eq!(summary.count(TubeColor::Red), 1);
    assert_eq!(summary.count(TubeColor::Green), 1);
    assert_eq!(summary.count(TubeColor::Blue), 1);
    assert_eq!(summary.total(), 3);

    let json = serde_json::to_value(roster.entries()).expect("json");
    assert_eq!(json[0]["color"], "Червона");
}

#[test]
fn seed_file_rejects_bad_versions_and_entries() {
    let dir = tempfile::tempdir().expect("tempdir");

    let path = dir.path().join("old.yaml");
    std::fs::write(&path, "version: \"2.0\"\nentries: []\n").expect("write");
    let mut roster = Roster::new();
    assert!(seed_from_file(&mut roster, TubeColor::Red, &path.to_string_lossy()).is_err());

    let path = dir.path().join("latin.yaml");
    std::fs::write(
        &path,
        "version: \"1.0\"\nentries:\n  - name: Ivan\n    surname: Petrenko\n",
    )
    .expect("write");
    let mut roster = Roster::new();
    assert!(seed_from_file(&mut roster, TubeColor::Red, &path.to_string_lossy()).is_err());
    assert!(roster.is_empty());
}
