//! Integration tests for the rate-limited client wrapper.
#![cfg(feature = "tokio-runtime")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use prometheus_admission::config::SchedulerSettings;
use prometheus_admission::core::{CancelToken, ChatId, RequestScheduler, SchedulerError};
use prometheus_admission::runtime::RateLimitedClient;

/// Stand-in for an HTTP bot client.
#[derive(Debug, Default)]
struct FakeBotApi {
    sent: AtomicUsize,
}

impl FakeBotApi {
    async fn send_message(&self, chat: &ChatId, text: &str) -> String {
        self.sent.fetch_add(1, Ordering::SeqCst);
        format!("{chat:?}: {text}")
    }
}

fn scheduler() -> Arc<RequestScheduler> {
    let settings = SchedulerSettings::default()
        .with_general_interval(Duration::from_millis(5))
        .with_private_chat_interval(Duration::from_millis(100))
        .with_group_chat_interval(Duration::from_millis(200));
    Arc::new(RequestScheduler::new(settings).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_calls_are_paced_per_chat() {
    let client = RateLimitedClient::new(FakeBotApi::default(), scheduler());
    let chat = ChatId::Id(4242);
    let cancel = CancelToken::new();
    let start = Instant::now();

    for text in ["one", "two"] {
        let reply = client
            .call(&chat, &cancel, |api| {
                let chat = chat.clone();
                async move { api.send_message(&chat, text).await }
            })
            .await
            .unwrap();
        assert!(reply.ends_with(text));
    }

    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(client.inner().sent.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clones_share_the_scheduler() {
    let client = RateLimitedClient::new(FakeBotApi::default(), scheduler());
    let other = client.clone();
    assert!(Arc::ptr_eq(client.control(), other.control()));

    client.control().stop();
    let result = other
        .call(1_i64, &CancelToken::new(), |api| async move {
            api.send_message(&ChatId::Id(1), "late").await
        })
        .await;
    assert_eq!(result, Err(SchedulerError::Closed));
    assert_eq!(client.inner().sent.load(Ordering::SeqCst), 0);
}
