// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use promptdrop_core::{Aggregator, GalleryConfig, OwnershipProber, PatternSet};
use promptdrop_ethereum::test_utils::{test_address, MemoryNftContract};
use test_case::test_case;

fn config(scan_bound: u64, max_in_flight: usize) -> GalleryConfig {
    GalleryConfig {
        scan_bound,
        max_in_flight,
        ..GalleryConfig::default()
    }
}

/// Tokens 1..=10, where `alice` owns 2, 5, 6 and 9, and token 4 was never minted.
async fn populated_contract() -> Arc<MemoryNftContract> {
    let alice = test_address(1);
    let bob = test_address(2);
    let contract = MemoryNftContract::default();
    for token_id in [1, 3, 7, 8, 10] {
        contract.insert(token_id, bob, format!("bob #{token_id}")).await;
    }
    for token_id in [2, 5, 6, 9] {
        let descriptor = format!(
            "prompt {token_id}\n\n[图像URL: https://x.com/{token_id}.png]\n[生成模型: cogview-3]"
        );
        contract.insert(token_id, alice, descriptor).await;
    }
    Arc::new(contract)
}

#[test_log::test(tokio::test)]
async fn test_probe_owned_token() {
    let contract = populated_contract().await;
    let prober = OwnershipProber::new(contract.clone());

    let probe = prober.probe(2, test_address(1)).await.unwrap();
    assert!(probe.record.is_owner);
    assert_eq!(probe.record.owner, test_address(1));
    assert!(probe.descriptor.unwrap().starts_with("prompt 2"));
    assert_eq!(contract.content_queries(), 1);
}

#[test_log::test(tokio::test)]
async fn test_probe_token_of_someone_else() {
    let contract = populated_contract().await;
    let prober = OwnershipProber::new(contract.clone());

    let probe = prober.probe(3, test_address(1)).await.unwrap();
    assert!(!probe.record.is_owner);
    assert_eq!(probe.record.owner, test_address(2));
    assert_eq!(probe.descriptor, None);
    assert_eq!(contract.content_queries(), 0);
}

#[test_log::test(tokio::test)]
async fn test_probe_unreadable_tokens_are_absent() {
    let contract = populated_contract().await;
    contract.fail_reads_for(5).await;
    let prober = OwnershipProber::new(contract.clone());

    assert_eq!(prober.probe(4, test_address(1)).await, None);
    assert_eq!(prober.probe(5, test_address(1)).await, None);
    assert_eq!(prober.probe(11, test_address(1)).await, None);
}

#[test_log::test(tokio::test)]
async fn test_probe_unwraps_json_metadata() {
    let contract = MemoryNftContract::default();
    contract
        .insert(
            1,
            test_address(1),
            r#"{"name":"PromptNFT #1","description":"a fox\n\n[image URL: https://x.com/fox.png]"}"#,
        )
        .await;
    let aggregator = Aggregator::new(Arc::new(contract), &GalleryConfig::default());

    let tokens = aggregator.collect(test_address(1), 1).await;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].content.clean_prompt, "a fox");
    assert_eq!(
        tokens[0].content.image_url.as_deref(),
        Some("https://x.com/fox.png")
    );
}

#[test_log::test(tokio::test)]
async fn test_zero_balance_does_not_probe() {
    let contract = populated_contract().await;
    let aggregator = Aggregator::new(contract.clone(), &GalleryConfig::default());

    assert!(aggregator.collect(test_address(1), 0).await.is_empty());
    assert_eq!(contract.owner_queries(), 0);
}

#[test_case(1; "sequentially")]
#[test_case(4; "with four probes in flight")]
#[test_case(16; "with sixteen probes in flight")]
#[test_log::test(tokio::test)]
async fn test_collect_is_ascending_and_complete(max_in_flight: usize) {
    let contract = populated_contract().await;
    let aggregator = Aggregator::new(contract, &config(50, max_in_flight));

    let tokens = aggregator.collect(test_address(1), 4).await;
    let ids: Vec<u64> = tokens.iter().map(|token| token.token_id()).collect();
    assert_eq!(ids, vec![2, 5, 6, 9]);
    for token in &tokens {
        let id = token.token_id();
        assert!(token.record.is_owner);
        assert_eq!(token.content.clean_prompt, format!("prompt {id}"));
        assert_eq!(
            token.content.image_url,
            Some(format!("https://x.com/{id}.png"))
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_collect_stops_at_balance() {
    let contract = populated_contract().await;
    let aggregator = Aggregator::new(contract.clone(), &config(50, 1));

    let tokens = aggregator.collect(test_address(1), 2).await;
    let ids: Vec<u64> = tokens.iter().map(|token| token.token_id()).collect();
    assert_eq!(ids, vec![2, 5]);
    // The scan ends with the probe of token 5.
    assert_eq!(contract.owner_queries(), 5);
}

#[test_log::test(tokio::test)]
async fn test_collect_stops_at_bound() {
    let contract = populated_contract().await;
    let aggregator = Aggregator::new(contract.clone(), &config(6, 2));

    let tokens = aggregator.collect(test_address(1), 4).await;
    let ids: Vec<u64> = tokens.iter().map(|token| token.token_id()).collect();
    assert_eq!(ids, vec![2, 5, 6]);
    assert_eq!(contract.owner_queries(), 6);
}

#[test_log::test(tokio::test)]
async fn test_collect_with_stale_balance_scans_to_bound() {
    let contract = populated_contract().await;
    let aggregator = Aggregator::new(contract.clone(), &config(20, 4));

    let tokens = aggregator.collect(test_address(1), 10).await;
    assert_eq!(tokens.len(), 4);
    assert!(tokens.iter().all(|token| (1..=20).contains(&token.token_id())));
    assert_eq!(contract.owner_queries(), 20);
}

#[test_log::test(tokio::test)]
async fn test_collect_skips_unreadable_tokens() {
    let contract = populated_contract().await;
    contract.fail_reads_for(2).await;
    let aggregator = Aggregator::new(contract, &config(50, 4));

    let tokens = aggregator.collect(test_address(1), 4).await;
    let ids: Vec<u64> = tokens.iter().map(|token| token.token_id()).collect();
    assert_eq!(ids, vec![5, 6, 9]);
}

#[test_log::test(tokio::test)]
async fn test_progress_is_reported_in_order() {
    let contract = populated_contract().await;
    let aggregator = Aggregator::new(contract, &config(50, 8));

    let mut probed = Vec::new();
    aggregator
        .collect_with_progress(test_address(1), 3, |token_id| probed.push(token_id))
        .await;
    assert_eq!(probed, vec![1, 2, 3, 4, 5, 6]);
}

#[test_log::test(tokio::test)]
async fn test_tagged_patterns_ignore_plain_urls() {
    let contract = MemoryNftContract::default();
    contract
        .insert(1, test_address(1), "see https://x.com/ref.png")
        .await;
    let config = GalleryConfig {
        pattern_set: PatternSet::Tagged,
        ..GalleryConfig::default()
    };
    let aggregator = Aggregator::new(Arc::new(contract), &config);

    let tokens = aggregator.collect(test_address(1), 1).await;
    assert_eq!(tokens[0].content.image_url, None);
    assert_eq!(tokens[0].content.clean_prompt, "see https://x.com/ref.png");
}
