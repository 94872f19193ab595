// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use rand::{rngs::StdRng, SeedableRng as _};

use super::*;

#[test]
fn test_style_descriptions() {
    assert_eq!(style_description("watercolor"), "水墨画风格，意境深远");
    assert_eq!(style_description("ai山海经"), "中国古代山海经插画风格，古典神话");
    assert_eq!(style_description(DEFAULT_STYLE), "精美插画风格");
    assert_eq!(style_description("baroque"), "精美插画风格");
}

#[test]
fn test_enhance_prompt_shape() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let enhanced = enhance_prompt("九尾火狐", "anime", &mut rng);
        assert!(enhanced.starts_with("九尾火狐，动漫插画风格，色彩鲜明，融入"));
        assert!(enhanced.ends_with(PROMPT_SUFFIX));

        let elements = enhanced
            .strip_prefix("九尾火狐，动漫插画风格，色彩鲜明，融入")
            .and_then(|rest| rest.strip_suffix(&format!("，{PROMPT_SUFFIX}")))
            .unwrap();
        let elements: Vec<&str> = elements.split('，').collect();
        assert!((1..=2).contains(&elements.len()), "{elements:?}");
        assert!(elements.iter().all(|element| ELEMENTS.contains(element)));
        if elements.len() == 2 {
            assert_ne!(elements[0], elements[1]);
        }
    }
}

#[test]
fn test_enhance_prompt_is_deterministic_per_seed() {
    let first = enhance_prompt("harbor", "vintage", &mut StdRng::seed_from_u64(7));
    let second = enhance_prompt("harbor", "vintage", &mut StdRng::seed_from_u64(7));
    assert_eq!(first, second);
}
