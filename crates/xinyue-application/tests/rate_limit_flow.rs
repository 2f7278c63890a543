use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use xinyue_application::{Admission, RateLimiter};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_let_exactly_the_limit_through() {
    let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(60)));

    let handles = (0..6).map(|_| {
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move { limiter.check("alice") })
    });
    let admissions: Vec<Admission> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let allowed = admissions.iter().filter(|a| a.is_allowed()).count();
    assert_eq!(allowed, 5);
    assert!(admissions
        .iter()
        .any(|a| matches!(a, Admission::Limited { wait_secs } if *wait_secs >= 1)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identities_do_not_share_windows() {
    let limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(60)));

    let handles = ["alice", "bob", "carol"].into_iter().flat_map(|identity| {
        let limiter = Arc::clone(&limiter);
        (0..2).map(move |_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.check(identity) })
        })
    });
    let admissions = join_all(handles).await;

    assert!(admissions
        .into_iter()
        .all(|joined| joined.unwrap().is_allowed()));
    assert_eq!(limiter.tracked_identities(), 3);
}
