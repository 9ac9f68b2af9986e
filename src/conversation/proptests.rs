//! Property-based tests for the conversation histories
//!
//! Whatever sequence of operations a session sees, both histories only grow
//! and existing entries keep their content.

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    /// A full turn answered in text
    TextTurn(String, String),
    /// A full turn answered by a tool
    ToolTurn(String, String),
    /// A turn whose model call failed after the user message was recorded
    AbandonedTurn(String),
    /// Attempt to overwrite history with an arbitrary snapshot
    Rewrite(Vec<String>),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[a-z ]{0,20}", "[a-z ]{0,20}").prop_map(|(q, a)| Op::TextTurn(q, a)),
        ("[a-z ]{0,20}", "[a-z]{1,10}").prop_map(|(q, tool)| Op::ToolTurn(q, tool)),
        "[a-z ]{0,20}".prop_map(Op::AbandonedTurn),
        proptest::collection::vec("[a-z]{0,5}", 0..6).prop_map(Op::Rewrite),
    ]
}

fn apply(session: &mut Session, op: Op) -> usize {
    match op {
        Op::TextTurn(q, a) => {
            session.record_user_message(&q).unwrap();
            session
                .finalize_response(
                    ModelMessage::assistant(a.clone()),
                    Display::AssistantText { text: a },
                )
                .unwrap();
            2
        }
        Op::ToolTurn(q, tool) => {
            session.record_user_message(&q).unwrap();
            session
                .finalize_response(
                    ModelMessage::function(tool.clone(), "{}"),
                    Display::ToolError {
                        tool,
                        message: "unavailable".to_string(),
                    },
                )
                .unwrap();
            2
        }
        Op::AbandonedTurn(q) => {
            session.record_user_message(&q).unwrap();
            1
        }
        Op::Rewrite(contents) => {
            let snapshot = contents.into_iter().map(ModelMessage::user).collect();
            // Accepted only when it extends the current history
            let _ = session.ai.update(snapshot);
            0
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_model_history_only_grows(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut session = Session::new("prop");

        for op in ops {
            let before: Vec<ModelMessage> = session.ai.get().to_vec();
            let finalized_before = session.ai.finalized_len();

            apply(&mut session, op);

            prop_assert!(session.ai.get().len() >= before.len());
            prop_assert!(session.ai.finalized_len() >= finalized_before);
            prop_assert!(session.ai.get().len() >= session.ai.finalized_len());
            prop_assert_eq!(&session.ai.get()[..before.len()], before.as_slice());
        }
    }

    #[test]
    fn prop_display_history_only_grows(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let mut session = Session::new("prop");
        let mut expected = 0;

        for op in ops {
            expected += apply(&mut session, op);
            prop_assert_eq!(session.ui.items().len(), expected);
        }

        let ids: Vec<i64> = session.ui.items().iter().map(|item| item.id).collect();
        prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
