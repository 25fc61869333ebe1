//! Housekeeping running alongside issuance.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use keyward_auth::Provider;
use keyward_auth::types::{Scopes, TokenSpec};
use keyward_memory::InMemoryProvider;

const ROUNDS: usize = 20_000;

fn spec() -> TokenSpec {
    TokenSpec {
        client_id: "testclient".to_string(),
        scope: Scopes::new(),
        owner: Some("test_user".to_string()),
        include_refresh_token: true,
        expires_in: Duration::from_secs(600),
        refresh_expires_in: Duration::from_secs(3600),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_purge_never_loses_fresh_refresh_tokens() {
    let provider = Arc::new(InMemoryProvider::new());
    let stop = Arc::new(AtomicBool::new(false));

    let purger = {
        let provider = provider.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut removed = 0;
            while !stop.load(Ordering::Relaxed) {
                removed += provider.purge_inactive();
            }
            removed
        })
    };

    let mut lost = 0;
    let mut revoked = 0;
    for round in 0..ROUNDS {
        let token = provider.generate_token(spec()).await.unwrap();
        let refresh = token.refresh_token.as_deref().unwrap();

        match provider.find_token_by_refresh(refresh).await.unwrap() {
            Some(found) => assert_eq!(found.value, token.value),
            None => lost += 1,
        }

        // Give the purge something to remove as well.
        if round % 2 == 0 {
            assert!(provider.revoke_token(&token.value).await.unwrap());
            revoked += 1;
        }
    }

    stop.store(true, Ordering::Relaxed);
    let removed = purger.join().expect("purge panicked") + provider.purge_inactive();

    assert_eq!(lost, 0);
    assert_eq!(removed, revoked);
    assert_eq!(provider.token_count(), ROUNDS - revoked);
}
