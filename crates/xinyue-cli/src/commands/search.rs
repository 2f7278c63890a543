use anyhow::Result;
use xinyue_application::SearchEngine;
use xinyue_core::backend::SearchTarget;

use super::print_replies;

pub async fn run(engine: &SearchEngine, identity: &str, keyword: &str, target: SearchTarget) -> Result<()> {
    let replies = engine.search(identity, keyword, target).await;
    print_replies(&replies);
    Ok(())
}

pub async fn run_local(engine: &SearchEngine, identity: &str, keyword: &str) -> Result<()> {
    let replies = engine.local_search(identity, keyword).await;
    print_replies(&replies);
    Ok(())
}
