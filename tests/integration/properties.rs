//! Edit policies observed through the session API.

use ssh_config_editor::{EditError, Resource, Session, Value};

fn list(items: &[&str]) -> Value {
    Value::from(items.to_vec())
}

#[test]
fn write_then_write_again_changes_nothing() {
    let mut session = Session::open("Host a\n    User x\n").unwrap();
    session.write_value("a", "Port", &Value::from("22")).unwrap();
    session.write_comment("a", "Port", "ssh").unwrap();
    let first = session.render();

    session.write_value("a", "Port", &Value::from("22")).unwrap();
    session.write_comment("a", "Port", "ssh").unwrap();
    assert_eq!(session.render(), first);
    assert_eq!(first, "Host a\n    User x\n    # Port: ssh\n    Port 22\n");
}

#[test]
fn simple_directive_shrinks_and_grows() {
    let text = "\
Host a
    LocalForward 1 h:1
    LocalForward 2 h:2
    LocalForward 3 h:3
    User u
";
    let mut session = Session::open(text).unwrap();

    session.write_value("a", "LocalForward", &list(&["9 h:9"])).unwrap();
    assert_eq!(session.render(), "Host a\n    LocalForward 9 h:9\n    User u\n");

    session
        .write_value("a", "LocalForward", &list(&["9 h:9", "8 h:8", "7 h:7"]))
        .unwrap();
    assert_eq!(
        session.render(),
        "Host a\n    LocalForward 9 h:9\n    LocalForward 8 h:8\n    LocalForward 7 h:7\n    User u\n"
    );
    assert_eq!(
        session.read_value("a", "LocalForward").unwrap(),
        vec!["9 h:9", "8 h:8", "7 h:7"]
    );
}

#[test]
fn multi_valued_directive_collapses_to_one_line() {
    let mut session = Session::open("Host a\n    Ciphers x\n    MACs m\n    ciphers y,z\n").unwrap();
    session.write_value("a", "Ciphers", &list(&["x", "y"])).unwrap();
    assert_eq!(session.render(), "Host a\n    Ciphers x,y\n    MACs m\n");

    session.write_value("a", "SendEnv", &list(&["LANG", "LC_*"])).unwrap();
    assert_eq!(
        session.render(),
        "Host a\n    Ciphers x,y\n    MACs m\n    SendEnv LANG LC_*\n"
    );
}

#[test]
fn annotation_must_sit_directly_above_its_key() {
    let text = "Host a\n    # Port: stale\n    User u\n    Port 22\n";
    let mut session = Session::open(text).unwrap();
    assert_eq!(session.read_comment("a", "Port").unwrap(), "");

    session.write_comment("a", "Port", "fresh").unwrap();
    assert_eq!(
        session.render(),
        "Host a\n    # Port: stale\n    User u\n    # Port: fresh\n    Port 22\n"
    );
    assert_eq!(session.read_comment("a", "Port").unwrap(), "fresh");

    session.write_comment("a", "Port", "").unwrap();
    assert_eq!(session.render(), text);
}

#[test]
fn annotation_on_missing_key_is_rejected() {
    let mut session = Session::open("Host a\n    User u\n").unwrap();
    let err = session.write_comment("a", "Port", "text").unwrap_err();
    assert!(matches!(err, EditError::KeyNotFound { .. }));
    session.write_comment("a", "Port", "").unwrap();
    assert!(!session.is_modified());
}

#[test]
fn only_true_templates_attract_new_entries() {
    let text = "Host a\n#Portal x\n#Port.old 1\n    User u\n";
    let mut session = Session::open(text).unwrap();
    session.write_value("a", "Port", &Value::from("22")).unwrap();
    assert_eq!(
        session.render(),
        "Host a\n#Portal x\n#Port.old 1\n    User u\n    Port 22\n"
    );

    let mut session = Session::open("Host a\n    User u\n#  port=22\n").unwrap();
    session.write_value("a", "Port", &Value::from("2222")).unwrap();
    assert_eq!(session.render(), "Host a\n    User u\n    Port 2222\n#  port=22\n");
}

#[test]
fn host_and_key_match_case_insensitively() {
    let mut session = Session::open("Host Example\n  port 22\n").unwrap();
    assert!(session.exists("EXAMPLE", "Port"));
    session.write_value("example", "PORT", &Value::from("2222")).unwrap();
    assert_eq!(session.render(), "Host Example\n  port 2222\n");
}

#[test]
fn host_names_are_literals() {
    let mut session = Session::open("Host a.b\n  User x\nHost axb\n  User y\n").unwrap();
    session.write_value("a.b", "User", &Value::from("z")).unwrap();
    assert_eq!(session.render(), "Host a.b\n  User z\nHost axb\n  User y\n");
}

#[test]
fn destroy_removes_entries_and_annotation() {
    let text = "Host a\n  # Port: old\n  Port 22\n  Port 23\n  User x\n";
    let mut session = Session::open(text).unwrap();
    session.destroy("a", "Port").unwrap();
    assert_eq!(session.render(), "Host a\n  User x\n");
    assert!(!session.exists("a", "Port"));
}

#[test]
fn create_appends_host_block() {
    let mut session = Session::open("Host a\n  User x\n\n").unwrap();
    session
        .create(&Resource::new("b", "Ciphers", list(&["c1", "c2"])))
        .unwrap();
    assert_eq!(session.render(), "Host a\n  User x\n\nHost b\n    Ciphers c1,c2\n");
    assert!(session.working_path().unwrap().to_string().contains("Ciphers"));

    let err = session
        .create(&Resource::new("c", "Port", Vec::<String>::new()))
        .unwrap_err();
    assert!(matches!(err, EditError::EmptyValue { .. }));
}

#[test]
fn write_to_missing_host_fails() {
    let mut session = Session::open("Host a\n").unwrap();
    let err = session.write_value("b", "Port", &Value::from("22")).unwrap_err();
    assert_eq!(err.to_string(), "host block not found: b");
}

#[test]
fn instances_cover_every_host() {
    let session = Session::open("User g\nHost a\n  Port 1\nHost b\n  Port 2\n  Port 3\n").unwrap();
    let all = session.instances().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].host, "a");
    assert_eq!(all[1].value, list(&["2", "3"]));
}

#[test]
fn multi_line_value_cannot_add_host_blocks() {
    let text = "Host a\n    User x\n";
    let mut session = Session::open(text).unwrap();

    let err = session
        .write_value("a", "User", &Value::from("bob\nHost evil\n    ProxyCommand sh"))
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidValue { .. }));

    let err = session.write_comment("a", "User", "note\nPort 1").unwrap_err();
    assert!(matches!(err, EditError::InvalidValue { .. }));

    let err = session
        .create(&Resource::new("b\nHost evil", "User", "x"))
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidHost { .. }));

    assert!(!session.is_modified());
    assert_eq!(session.instances().unwrap().len(), 1);
}

#[test]
fn value_must_survive_a_reparse() {
    let mut session = Session::open("Host a\n    User x\n").unwrap();
    let err = session
        .write_value("a", "User", &Value::from("bob # not a comment"))
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidValue { .. }));

    let command = "sh -c \"nc %h %p # via jump\"";
    session
        .write_value("a", "ProxyCommand", &Value::from(command))
        .unwrap();
    let reopened = Session::open(&session.close()).unwrap();
    assert_eq!(reopened.read_value("a", "ProxyCommand").unwrap(), vec![command]);
}

#[test]
fn create_rejects_bad_input_without_touching_the_file() {
    let mut session = Session::open("Host a\n    User x\n").unwrap();
    let err = session
        .create(&Resource::new("b", "User", "x").with_comment("two\nlines"))
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidValue { .. }));
    let err = session
        .create(&Resource::new("b", "Bad Key", "22"))
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidKey { .. }));
    assert!(!session.is_modified());
}

#[test]
fn key_names_follow_the_grammar() {
    let mut session = Session::open("Host a\n").unwrap();
    let err = session
        .write_value("a", "Bad Key", &Value::from("22"))
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid directive name: 'Bad Key'");
    assert!(!session.is_modified());
}

#[test]
fn list_items_read_back_as_written() {
    let mut session = Session::open("Host a\n    User x\n").unwrap();

    session.write_value("a", "Ciphers", &list(&[""])).unwrap();
    assert!(!session.is_modified());

    session.write_value("a", "Ciphers", &list(&["", "y"])).unwrap();
    assert_eq!(session.render(), "Host a\n    User x\n    Ciphers y\n");
    let reopened = Session::open(&session.render()).unwrap();
    assert_eq!(
        reopened.read_value("a", "Ciphers").unwrap(),
        session.read_value("a", "Ciphers").unwrap()
    );

    let err = session
        .write_value("a", "SendEnv", &list(&["A B"]))
        .unwrap_err();
    assert!(matches!(err, EditError::InvalidValue { .. }));
}
