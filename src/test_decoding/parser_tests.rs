use super::message::*;
use super::parser::parse;
use rstest::rstest;

fn crud(line: &str) -> CrudMessage {
    match parse(line) {
        Ok(Message::Crud(msg)) => msg,
        other => panic!("expected a CRUD message, got {:?}", other),
    }
}

#[rstest]
#[case("BEGIN 501", TransactionCommand::Begin, 501)]
#[case("COMMIT 95", TransactionCommand::Commit, 95)]
#[case("BEGIN 0", TransactionCommand::Begin, 0)]
#[case("COMMIT 18446744073709551615", TransactionCommand::Commit, u64::MAX)]
fn test_parse_transaction(#[case] line: &str, #[case] command: TransactionCommand, #[case] lsn: u64) {
    assert_eq!(
        parse(line).unwrap(),
        Message::Transaction(TransactionMessage { command, lsn })
    );
}

#[test]
fn test_parse_crud() {
    let line = "table public.account: INSERT: id[integer]:5 email[text]:'e@e.c' is_e_vd[boolean]:false";
    assert_eq!(
        crud(line),
        CrudMessage {
            command: CrudCommand::Insert,
            schema: Some("public".to_string()),
            table: "account".to_string(),
            columns: vec![
                Column::new("id", "integer", Some("5")),
                Column::new("email", "text", Some("e@e.c")),
                Column::new("is_e_vd", "boolean", Some("false")),
            ],
            old_key: Vec::new(),
        }
    );
}

#[test]
fn test_parse_crud_hard() {
    let line = "table public.account: INSERT: id[integer]:5 email[text]:'e@e.c' is_e_vd[boolean]:false xxx[timestamp without time zone]:'2021 012 11' somearr[integer[]]:'{4,3}'";
    let msg = crud(line);

    assert_eq!(
        msg.columns,
        vec![
            Column::new("id", "integer", Some("5")),
            Column::new("email", "text", Some("e@e.c")),
            Column::new("is_e_vd", "boolean", Some("false")),
            Column::new("xxx", "timestamp without time zone", Some("2021 012 11")),
            Column::new("somearr", "integer[]", Some("{4,3}")),
        ]
    );
}

#[test]
fn test_parse_update_and_delete() {
    let msg = crud("table public.account: UPDATE: id[integer]:5 is_email_verified[boolean]:true");
    assert_eq!(msg.command, CrudCommand::Update);
    assert_eq!(msg.columns.len(), 2);

    let msg = crud("table public.account: DELETE: id[integer]:5");
    assert_eq!(msg.command, CrudCommand::Delete);
    assert_eq!(msg.columns, vec![Column::new("id", "integer", Some("5"))]);
}

#[test]
fn test_null_and_quoted_null_differ() {
    let msg = crud("table public.t: INSERT: a[text]:null b[text]:'null' c[text]:null");

    assert_eq!(msg.columns[0].value, None);
    assert_eq!(msg.columns[1].value.as_deref(), Some("null"));
    assert_eq!(msg.columns[2].value, None);
}

#[test]
fn test_escaped_quotes() {
    let msg = crud("table public.t: INSERT: a[text]:'it''s' b[text]:'''' c[text]:'''quoted''' d[text]:''");

    assert_eq!(msg.columns[0].value.as_deref(), Some("it's"));
    assert_eq!(msg.columns[1].value.as_deref(), Some("'"));
    assert_eq!(msg.columns[2].value.as_deref(), Some("'quoted'"));
    assert_eq!(msg.columns[3].value.as_deref(), Some(""));
}

#[test]
fn test_values_keep_delimiter_characters() {
    let msg = crud("table public.t: INSERT: a[text]:'x: [y] z' b[text]:'[]' c[json]:'{\"k\": \"v\"}'");

    assert_eq!(msg.columns[0].value.as_deref(), Some("x: [y] z"));
    assert_eq!(msg.columns[1].value.as_deref(), Some("[]"));
    assert_eq!(msg.columns[2].value.as_deref(), Some("{\"k\": \"v\"}"));
}

#[test]
fn test_nested_array_types() {
    let msg = crud("table public.t: INSERT: grid[integer[][]]:'{{1,2},{3,4}}' tags[character varying(20)[]]:'{a,b}'");

    assert_eq!(msg.columns[0].data_type, "integer[][]");
    assert_eq!(msg.columns[1].data_type, "character varying(20)[]");
}

#[test]
fn test_unqualified_table() {
    let msg = crud("table account: INSERT: id[integer]:1");

    assert_eq!(msg.schema, None);
    assert_eq!(msg.table, "account");
}

#[test]
fn test_quoted_identifiers() {
    let msg = crud(r#"table "My Schema"."Some ""Table""": INSERT: "User Id"[integer]:1 plain[text]:'a'"#);

    assert_eq!(msg.schema.as_deref(), Some("My Schema"));
    assert_eq!(msg.table, "Some \"Table\"");
    assert_eq!(msg.columns[0].column, "User Id");
    assert_eq!(msg.qualified_name(), "My Schema.Some \"Table\"");

    let msg = crud(r#"table "dotted.schema".t: DELETE: id[integer]:1"#);
    assert_eq!(msg.schema.as_deref(), Some("dotted.schema"));
    assert_eq!(msg.table, "t");
}

#[test]
fn test_rows_without_columns() {
    let msg = crud("table public.t: DELETE: (no-tuple-data)");
    assert_eq!(msg.command, CrudCommand::Delete);
    assert!(msg.columns.is_empty());

    let msg = crud("table public.empty: INSERT:");
    assert_eq!(msg.command, CrudCommand::Insert);
    assert!(msg.columns.is_empty());
}

#[test]
fn test_update_with_old_key() {
    let msg = crud("table public.account: UPDATE: old-key: id[integer]:5 new-tuple: id[integer]:6 email[text]:'a@b.c'");

    assert_eq!(msg.old_key, vec![Column::new("id", "integer", Some("5"))]);
    assert_eq!(
        msg.columns,
        vec![
            Column::new("id", "integer", Some("6")),
            Column::new("email", "text", Some("a@b.c")),
        ]
    );
}

#[test]
fn test_unchanged_toast_value_is_kept_verbatim() {
    let msg = crud("table public.doc: UPDATE: id[integer]:1 body[text]:unchanged-toast-datum");
    assert_eq!(msg.columns[1].value.as_deref(), Some("unchanged-toast-datum"));
}

#[rstest]
#[case("")]
#[case("xyz")]
#[case("message: transactional: 1 prefix: p, sz: 1 content:x")]
#[case("BEGIN")]
#[case("BEGIN abc")]
#[case("BEGIN 12 ")]
#[case("COMMIT 601 (at 2021-01-01 00:00:00+00)")]
#[case("CHECKPOINT 1")]
#[case("COMMIT 18446744073709551616")]
#[case("tables public.t: INSERT: id[integer]:1")]
#[case("table public.t INSERT id[integer]:1")]
#[case("table public.t: INSERT id[integer]:1")]
#[case("table public.t: TRUNCATE: (no-flags)")]
#[case("table public.t: INSERT: garbage")]
#[case("table public.t: INSERT: id[integer:1")]
#[case("table public.t: INSERT: email[text]:'unterminated")]
#[case("table public.t: UPDATE: old-key: id[integer]:1")]
#[case("table .t: INSERT: id[integer]:1")]
#[case("table public.t: INSERT: a[text]:'\u{0}'")]
fn test_malformed_lines_fail(#[case] line: &str) {
    let err = parse(line).unwrap_err();
    assert_eq!(err.line, line);
}

#[test]
fn test_failure_message_names_the_line() {
    let err = parse("xyz").unwrap_err();
    assert!(err.to_string().contains("xyz"));
}
