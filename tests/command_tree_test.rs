//! Command tree lifecycle: parenting, init ordering and execution rules.

use std::sync::Arc;

use botcmd::internal::command::{ExecutionContext, SharedState, Signature};
use botcmd::parser::{Cursor, Parser, ParserRef, UnionParser, Value, boolean, integer, string};
use botcmd::{ArgDefinition, Command, Invocation, Message};

fn noop(_: Invocation) -> std::future::Ready<anyhow::Result<serde_json::Value>> {
    std::future::ready(Ok(serde_json::Value::Null))
}

fn unit() -> SharedState {
    Arc::new(())
}

fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_child_keeps_first_parent() {
    let child = Command::new("child", "");
    let first = Command::new("first", "").sub(child.clone());
    let second = Command::new("second", "").sub(child.clone());
    let first = first.sub(child.clone());

    assert_eq!(child.parent(), Some(first.clone()));
    assert_eq!(first.subs().len(), 1);
    assert!(second.subs().is_empty());
    assert_eq!(child.full_name(), "first child");
}

#[tokio::test]
async fn test_signature_order_after_init() {
    let shapes: Vec<Vec<ArgDefinition>> = vec![
        vec![],
        vec![ArgDefinition::optional("a", string())],
        vec![ArgDefinition::required("a", string())],
        vec![
            ArgDefinition::required("a", string()),
            ArgDefinition::required("b", string()),
        ],
        vec![
            ArgDefinition::required("a", string()),
            ArgDefinition::optional("b", string()),
            ArgDefinition::optional("c", string()),
        ],
        vec![ArgDefinition::optional("a", string())],
        vec![
            ArgDefinition::optional("a", string()),
            ArgDefinition::optional("b", string()),
        ],
    ];
    let mut command = Command::new("shapes", "");
    for args in shapes {
        command = command.signature(noop, args);
    }
    let declared = command.signatures();
    command.init(&unit()).await.unwrap();
    let sorted = command.signatures();

    let index = |s: &Arc<Signature>| {
        declared.iter().position(|d| Arc::ptr_eq(d, s)).unwrap()
    };
    for pair in sorted.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.min_arg_needed() >= b.min_arg_needed());
        if a.min_arg_needed() == b.min_arg_needed() {
            assert!(a.arg_count() >= b.arg_count());
            if a.arg_count() == b.arg_count() {
                assert!(index(a) < index(b));
            }
        }
    }

    // A second init is a no-op.
    command.init(&unit()).await.unwrap();
    let again: Vec<usize> = command.signatures().iter().map(index).collect();
    let first: Vec<usize> = sorted.iter().map(index).collect();
    assert_eq!(again, first);
}

#[tokio::test]
#[should_panic(expected = "before it is initialized")]
async fn test_execute_requires_init() {
    let command = Command::new("early", "").signature(noop, vec![]);
    command
        .execute(&[], &ExecutionContext::new(Message::new("!early", "u")))
        .await;
}

#[tokio::test]
async fn test_no_match_is_not_a_fault() {
    let command = Command::new("n", "").signature(noop, vec![ArgDefinition::required("x", integer())]);
    command.init(&unit()).await.unwrap();
    let result = command
        .execute(&tokens(&["abc"]), &ExecutionContext::new(Message::new("!n abc", "u")))
        .await;
    assert!(result.is_signature_not_found());
    assert!(!result.is_error());
}

#[test]
fn test_failing_union_member_does_not_consume() {
    let toks = tokens(&["true", "rest"]);

    let union = UnionParser::new(vec![integer() as ParserRef, boolean() as ParserRef]).unwrap();
    let mut cursor = Cursor::new(&toks);
    let via_union = union.parse(&mut cursor).unwrap();
    let union_position = cursor.position();

    let mut alone = Cursor::new(&toks);
    let via_boolean = boolean().parse(&mut alone).unwrap();

    assert_eq!(via_union, via_boolean);
    assert_eq!(via_union, Value::Boolean(true));
    assert_eq!(union_position, alone.position());
}
