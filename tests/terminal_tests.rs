use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptrelay::{
    Candidate, CompletionProvider, CompletionRelay, FailureKind, FailurePolicy, LlmError, Part,
    RawProviderResponse, SessionSummary, TerminalError, TerminalSession,
};
use tokio_util::sync::CancellationToken;

/// Echoes the prompt back in upper case, except the prompt `fail`, which
/// produces an empty response. Records every prompt it sees.
#[derive(Default)]
struct Echo {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionProvider for Echo {
    async fn generate(&self, prompt: &str) -> Result<Option<RawProviderResponse>, LlmError> {
        self.seen.lock().unwrap().push(prompt.to_string());
        if prompt == "fail" {
            return Ok(None);
        }
        Ok(Some(RawProviderResponse {
            candidates: vec![Candidate {
                parts: vec![Part::Text(prompt.to_uppercase())],
            }],
        }))
    }

    fn model(&self) -> &str {
        "echo"
    }
}

async fn run(
    input: &[u8],
    policy: FailurePolicy,
) -> (
    Result<SessionSummary, TerminalError>,
    String,
    String,
    Vec<String>,
) {
    let provider = Arc::new(Echo::default());
    let session = TerminalSession::new(CompletionRelay::new(provider.clone()), policy);

    let mut output = Vec::new();
    let mut diagnostics = Vec::new();
    let result = session.run(input, &mut output, &mut diagnostics).await;

    let seen = provider.seen.lock().unwrap().clone();
    (
        result,
        String::from_utf8(output).unwrap(),
        String::from_utf8(diagnostics).unwrap(),
        seen,
    )
}

#[tokio::test]
async fn replies_are_printed_in_order() {
    let (result, output, diagnostics, seen) =
        run(b"hello\r\nworld\nlast line without newline", FailurePolicy::Continue).await;

    assert_eq!(
        result.unwrap(),
        SessionSummary {
            exchanges: 3,
            failures: 0,
            skipped_lines: 0,
        }
    );
    assert_eq!(
        output,
        "You: HELLO\nYou: WORLD\nYou: LAST LINE WITHOUT NEWLINE\nYou: "
    );
    assert!(diagnostics.is_empty());
    assert_eq!(seen, vec!["hello", "world", "last line without newline"]);
}

#[tokio::test]
async fn empty_line_is_forwarded_as_empty_prompt() {
    let (result, _, _, seen) = run(b"\n", FailurePolicy::Continue).await;
    assert_eq!(result.unwrap().exchanges, 1);
    assert_eq!(seen, vec![String::new()]);
}

#[tokio::test]
async fn failures_are_reported_and_loop_continues() {
    let (result, output, diagnostics, _) =
        run(b"one\nfail\ntwo\n", FailurePolicy::Continue).await;

    let summary = result.unwrap();
    assert_eq!(summary.exchanges, 3);
    assert_eq!(summary.failures, 1);
    assert_eq!(output, "You: ONE\nYou: You: TWO\nYou: ");
    assert_eq!(diagnostics, "error [EmptyResponse]: no candidates\n");
}

#[tokio::test]
async fn abort_policy_stops_at_first_failure() {
    let (result, output, diagnostics, seen) =
        run(b"one\nfail\ntwo\n", FailurePolicy::Abort).await;

    match result {
        Err(TerminalError::Aborted(failure)) => {
            assert_eq!(failure.kind, FailureKind::EmptyResponse)
        }
        other => panic!("expected aborted session, got {other:?}"),
    }
    assert_eq!(output, "You: ONE\nYou: ");
    assert!(diagnostics.starts_with("error [EmptyResponse]"));
    assert_eq!(seen, vec!["one", "fail"]);
}

#[tokio::test]
async fn invalid_utf8_line_is_skipped() {
    let (result, output, diagnostics, seen) =
        run(b"ok\n\xff\xfe\nstill ok\n", FailurePolicy::Continue).await;

    let summary = result.unwrap();
    assert_eq!(summary.exchanges, 2);
    assert_eq!(summary.skipped_lines, 1);
    assert_eq!(output, "You: OK\nYou: You: STILL OK\nYou: ");
    assert!(diagnostics.starts_with("skipped line:"));
    assert_eq!(seen, vec!["ok", "still ok"]);
}

#[tokio::test]
async fn cancelled_session_stops_reading() {
    let provider = Arc::new(Echo::default());
    let token = CancellationToken::new();
    token.cancel();

    let session = TerminalSession::new(CompletionRelay::new(provider.clone()), FailurePolicy::Abort)
        .with_shutdown(token);

    let mut output = Vec::new();
    let mut diagnostics = Vec::new();
    let summary = session
        .run(&b"never sent\n"[..], &mut output, &mut diagnostics)
        .await
        .unwrap();

    assert_eq!(summary, SessionSummary::default());
    assert!(provider.seen.lock().unwrap().is_empty());
}
