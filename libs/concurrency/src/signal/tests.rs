use std::sync::Arc;

use super::Once;

#[tokio::test]
async fn test_send_fires_once() {
    let once = Once::new();
    assert!(!once.try_recv());
    assert!(once.send());
    assert!(once.try_recv());
    assert!(!once.send());
    assert!(!once.send());
    // Already fired, so this returns immediately.
    once.recv().await;
}

#[tokio::test]
async fn test_all_waiters_wake_up() {
    let once = Arc::new(Once::new());
    let waiters: Vec<_> = (0..5)
        .map(|_| {
            let once = once.clone();
            tokio::spawn(async move { once.recv().await })
        })
        .collect();
    tokio::task::yield_now().await;
    assert!(once.send());
    for w in waiters {
        w.await.unwrap();
    }
}
