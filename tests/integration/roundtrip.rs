//! Parse/render identity, including generated inputs.

use proptest::prelude::*;
use ssh_config_editor::{LensError, Session, Value};

#[test]
fn awkward_layout_survives_untouched() {
    let text = "\
# global
Compression=yes
  ServerAliveInterval = 30   # keepalive

Host a b\t# two patterns
\tUser\tx
  ProxyCommand ssh -W \"%h:%p\" jump # quoted
    Ciphers aes128-ctr,aes256-ctr

Match host *.internal exec \"test -f ~/.vpn\"
  User internal
Host last
  Port 22";
    let session = Session::open(text).unwrap();
    assert_eq!(session.render(), text);
    assert!(session.diff().is_empty());
}

#[test]
fn crlf_line_endings_survive_an_edit() {
    let text = "Host a\r\n  Port 22\r\n  User x\r\n";
    let mut session = Session::open(text).unwrap();
    session.write_value("a", "Port", &Value::from("2222")).unwrap();
    assert_eq!(session.close(), "Host a\r\n  Port 2222\r\n  User x\r\n");
}

#[test]
fn edit_elsewhere_keeps_other_lines_byte_identical() {
    let text = "Host a\n  User   x   # odd spacing\nHost b\n  Port=22\n";
    let mut session = Session::open(text).unwrap();
    session.write_value("b", "Port", &Value::from("2200")).unwrap();
    assert_eq!(
        session.close(),
        "Host a\n  User   x   # odd spacing\nHost b\n  Port=2200\n"
    );
}

#[test]
fn parse_errors_report_line_numbers() {
    let err = Session::open("Host a\n  User x\n  Bad-Key y\n").unwrap_err();
    assert!(matches!(err, LensError::MalformedLine { line: 3, .. }));
    assert!(err.to_string().starts_with("line 3:"));

    let err = Session::open("Host a\n  ProxyCommand \"ssh jump\n").unwrap_err();
    assert_eq!(err, LensError::UnterminatedQuote { line: 2 });

    let err = Session::open("\nHost\n").unwrap_err();
    assert_eq!(err, LensError::MissingHostPattern { line: 2 });
}

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ \t]{0,4}",
        "[ \t]{0,4}#[ a-zA-Z0-9:.,]{0,24}",
        ("[ \t]{0,4}", "[A-Za-z][A-Za-z0-9]{0,14}", "( |\t|=| = )", "[a-z0-9*][a-z0-9.,*:@ -]{0,20}")
            .prop_map(|(indent, key, sep, value)| format!("{indent}{key}{sep}{}", value.trim_end())),
        "[a-z0-9*][a-z0-9.*-]{0,12}".prop_map(|pattern| format!("Host {pattern}")),
    ]
}

fn document() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(line(), 0..24),
        prop_oneof![Just("\n"), Just("\r\n")],
        any::<bool>(),
    )
        .prop_map(|(lines, eol, final_newline)| {
            let mut text = lines.join(eol);
            if final_newline && !lines.is_empty() {
                text.push_str(eol);
            }
            text
        })
}

proptest! {
    #[test]
    fn generated_documents_round_trip(text in document()) {
        let session = Session::open(&text).unwrap();
        prop_assert_eq!(session.close(), text);
    }

    #[test]
    fn writes_are_idempotent(
        key in prop_oneof![Just("Port"), Just("LocalForward"), Just("Ciphers"), Just("SendEnv")],
        values in prop::collection::vec("[a-z0-9]{1,8}", 0..5),
    ) {
        let text = "Host a\n  User x\n  LocalForward 1 h:1\n#Port 22\n  Ciphers aes128-ctr\n";
        let mut session = Session::open(text).unwrap();
        let value = Value::from(values.clone());

        session.write_value("a", key, &value).unwrap();
        prop_assert_eq!(session.read_value("a", key).unwrap(), values);

        let once = session.render();
        session.write_value("a", key, &value).unwrap();
        prop_assert_eq!(session.render(), once);
    }
}
