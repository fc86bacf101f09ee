// Composition tests: dictionary file -> detector -> bulk filter.
//
// These exercise the full moderation path without the HTTP layer: the custom
// dictionary shipped in data/ is merged over the built-in one, compiled, and
// driven through FilterService exactly as the service does at startup.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chat_filter::dictionary::ProfanityDictionary;
use chat_filter::error::ModerationError;
use chat_filter::filter::{Action, ChatMessage, ChatMessageBulk, FilterService};
use chat_filter::profanity::detector::DictionaryDetector;
use chat_filter::profanity::traits::ProfanityFilter;

const CUSTOM_DICTIONARY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/profanities.json");

fn service() -> FilterService {
    let dictionary = ProfanityDictionary::load(Some(Path::new(CUSTOM_DICTIONARY))).unwrap();
    FilterService::new(Arc::new(DictionaryDetector::new(&dictionary).unwrap()))
}

fn msg(id: &str, text: &str, timestamp: i64) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        message: text.to_string(),
        timestamp,
    }
}

fn bulk(messages: Vec<ChatMessage>) -> Option<ChatMessageBulk> {
    Some(ChatMessageBulk { messages })
}

// ============================================================
// Scenarios
// ============================================================

#[tokio::test]
async fn clean_message_passes_through() {
    let result = service()
        .filter_bulk(bulk(vec![msg("1", "hello friend", 100)]))
        .await
        .unwrap();

    assert_eq!(result.data.len(), 1);
    let r = &result.data[0];
    assert_eq!(r.id, "1");
    assert_eq!(r.timestamp, 100);
    assert_eq!(r.action, Action::Pass);
    assert_eq!(r.message, "hello friend");
    assert!(r.classification.is_empty());
}

#[tokio::test]
async fn custom_overrides_apply_end_to_end() {
    let before = chrono::Utc::now().timestamp();
    let result = service()
        .filter_bulk(bulk(vec![msg("1", "you are ibad and yourbad", 100)]))
        .await
        .unwrap();

    let r = &result.data[0];
    assert_eq!(r.action, Action::Censored);
    assert_eq!(r.message, "you are ibad and *******");
    assert!(r.timestamp >= before, "censored result must be restamped");
}

#[tokio::test]
async fn absent_batch_fails_invalid_argument() {
    let err = service().filter_bulk(None).await.unwrap_err();
    assert!(matches!(err, ModerationError::InvalidArgument(_)));
}

// ============================================================
// Ordering and identity
// ============================================================

#[tokio::test]
async fn results_are_index_aligned_with_mixed_batch() {
    let messages = vec![
        msg("a", "bad", 1),
        msg("b", "good", 2),
        msg("c", "", 3),
        msg("d", "holy shit", 4),
        msg("e", "yourbad day", 5),
        msg("a", "duplicate id is fine", 6),
    ];
    let result = service().filter_bulk(bulk(messages.clone())).await.unwrap();

    assert_eq!(result.data.len(), messages.len());
    for (input, output) in messages.iter().zip(&result.data) {
        assert_eq!(input.id, output.id);
    }

    let actions: Vec<Action> = result.data.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![
            Action::Censored,
            Action::Pass,
            Action::Pass,
            Action::Censored,
            Action::Censored,
            Action::Pass,
        ]
    );
    assert_eq!(result.data[2].timestamp, 3);
    assert_eq!(result.data[2].message, "");
}

#[tokio::test]
async fn input_batch_is_not_mutated() {
    let messages = vec![msg("1", "bad", 10)];
    let request = bulk(messages.clone());
    let copy = request.clone();
    service().filter_bulk(request).await.unwrap();
    assert_eq!(copy.unwrap().messages, messages);
}

// ============================================================
// Engine usage
// ============================================================

/// Counts calls so tests can see how the orchestrator drives the engine.
struct CountingFilter {
    inner: DictionaryDetector,
    checks: AtomicUsize,
    censors: AtomicUsize,
}

impl ProfanityFilter for CountingFilter {
    fn is_profane(&self, text: &str) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.is_profane(text)
    }

    fn censor(&self, text: &str) -> String {
        self.censors.fetch_add(1, Ordering::SeqCst);
        self.inner.censor(text)
    }
}

#[tokio::test]
async fn engine_called_once_per_message_and_censor_only_on_hits() {
    let filter = Arc::new(CountingFilter {
        inner: DictionaryDetector::new(&ProfanityDictionary::built_in().unwrap()).unwrap(),
        checks: AtomicUsize::new(0),
        censors: AtomicUsize::new(0),
    });
    let service = FilterService::new(filter.clone());

    service
        .filter_bulk(bulk(vec![
            msg("1", "fine", 1),
            msg("2", "shit", 2),
            msg("3", "also fine", 3),
        ]))
        .await
        .unwrap();

    assert_eq!(filter.checks.load(Ordering::SeqCst), 3);
    assert_eq!(filter.censors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_batches_share_one_engine() {
    let service = service();
    let mut tasks = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            let messages = (0..50)
                .map(|j| msg(&format!("{i}-{j}"), if j % 2 == 0 { "bad" } else { "ok" }, j))
                .collect();
            service.filter_bulk(bulk(messages)).await.unwrap()
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let result = task.await.unwrap();
        assert_eq!(result.data.len(), 50);
        for (j, r) in result.data.iter().enumerate() {
            assert_eq!(r.id, format!("{i}-{j}"));
            let expected = if j % 2 == 0 { Action::Censored } else { Action::Pass };
            assert_eq!(r.action, expected);
        }
    }
}
