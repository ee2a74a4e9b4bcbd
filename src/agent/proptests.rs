//! Property tests for the conversation-ordering invariant

use super::store::{ConversationStore, MemoryStore};
use super::testing::{assert_tool_results_correlated, text_response, tool_call_response, ScriptedLlm};
use super::{Dispatcher, SchedulingAgent};
use crate::db::Database;
use crate::llm::{Gateway, Role};
use crate::scheduling::testing::RecordingProvider;
use crate::tools::ToolRegistry;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn tool_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("GOOGLECALENDAR_FIND_FREE_SLOTS"),
        Just("GMAIL_CREATE_EMAIL_DRAFT"),
        Just("NO_SUCH_TOOL"),
    ]
}

fn input_for(name: &str) -> serde_json::Value {
    match name {
        "GOOGLECALENDAR_FIND_FREE_SLOTS" => json!({"date": "2025-03-04"}),
        "GMAIL_CREATE_EMAIL_DRAFT" => {
            json!({"recipient": "a@b.com", "subject": "s", "body": "b"})
        }
        _ => json!({}),
    }
}

fn run_scripted_turn(rounds: &[Vec<&'static str>]) -> Vec<crate::llm::Message> {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let mut script = Vec::new();
        for round in rounds {
            let calls: Vec<_> = round.iter().map(|name| (*name, input_for(name))).collect();
            script.push(Ok(tool_call_response(&calls)));
        }
        script.push(Ok(text_response("done")));

        let store = Arc::new(MemoryStore::default());
        let provider = Arc::new(RecordingProvider::default());
        let registry = Arc::new(ToolRegistry::new(
            provider,
            Database::open_in_memory().unwrap(),
            "UTC".to_string(),
        ));
        let gateway = Gateway::new(
            Arc::new(ScriptedLlm::new(script)),
            0,
            Duration::from_millis(1),
            Duration::from_secs(5),
        );
        let dispatcher = Dispatcher::new(
            registry.clone(),
            0,
            Duration::from_millis(1),
            Duration::from_secs(5),
        );
        let agent = SchedulingAgent::new(
            store.clone(),
            gateway,
            dispatcher,
            registry,
            "UTC".to_string(),
            25,
        );

        agent.run_turn("t", "hello").await.unwrap();
        store.history("t").await.unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn tool_results_always_answer_the_preceding_assistant(
        rounds in prop::collection::vec(prop::collection::vec(tool_name(), 1..=3), 0..4)
    ) {
        let history = run_scripted_turn(&rounds);
        assert_tool_results_correlated(&history);

        // Every requested call got exactly one result, even the unknown ones.
        let requested: usize = history
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.tool_uses().len())
            .sum();
        let answered = history.iter().filter(|m| m.role == Role::Tool).count();
        prop_assert_eq!(requested, answered);
    }
}
