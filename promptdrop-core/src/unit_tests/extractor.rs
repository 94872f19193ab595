// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use test_case::test_case;

use super::*;

const SAMPLES: &[&str] = &[
    "九尾火狐\n\n[图像URL: https://x.com/a.png]\n[生成时间: 2024-01-01T00:00:00Z]",
    "A lighthouse at dusk\n\n[image URL: https://cdn.example.com/l.jpg]\n[generation model: cogview-3]\n[generation time: 2024-03-05T10:00:00.000Z]",
    "mixed [生成模型: CogView-3] and [generation time: later] tags",
    "prompt [生成时[生成模型: m]间: 2024]",
    "loose image URL: https://a.com/x.gif inside text",
    "  nothing to see here  ",
    "[图像URL: https://x.com/a.png][图像URL: https://x.com/b.png]",
    "",
];

#[test_case(
    "九尾火狐\n\n[图像URL: https://x.com/a.png]\n[生成时间: 2024-01-01T00:00:00Z]",
    Some("https://x.com/a.png"),
    "九尾火狐";
    "with chinese tags"
)]
#[test_case(
    "A lighthouse\n\n[image URL: https://cdn.example.com/l.jpg]\n[generation model: cogview-3]",
    Some("https://cdn.example.com/l.jpg"),
    "A lighthouse";
    "with english tags"
)]
#[test_case(
    "[image URL: https://a.com/x.png  ] harbor",
    Some("https://a.com/x.png"),
    "harbor";
    "with padded tag url"
)]
#[test_case(
    "a cat image URL: https://a.com/cat",
    Some("https://a.com/cat"),
    "a cat";
    "with loose marker"
)]
#[test_case(
    "see https://a.com/page and https://b.com/pic.JPG",
    Some("https://b.com/pic.JPG"),
    "see https://a.com/page and https://b.com/pic.JPG";
    "with image file url"
)]
#[test_case(
    "visit https://a.com/page",
    Some("https://a.com/page"),
    "visit https://a.com/page";
    "with any url"
)]
#[test_case("  just words \n", None, "just words"; "without tags")]
#[test_case("prompt [生成时[生成模型: m]间: 2024]", None, "prompt"; "with nested tags")]
#[test_case("[生成模型: m][生成时间: t]", None, ""; "with only tags")]
fn test_extract(descriptor: &str, image_url: Option<&str>, clean_prompt: &str) {
    let extracted = ContentExtractor::default().extract(descriptor);
    assert_eq!(extracted.image_url.as_deref(), image_url);
    assert_eq!(extracted.clean_prompt, clean_prompt);
}

#[test]
fn test_tagged_url_wins_over_earlier_plain_url() {
    let descriptor = "inspired by https://a.com/ref.png\n\n[图像URL: https://x.com/mine.png]";
    let extracted = ContentExtractor::default().extract(descriptor);
    assert_eq!(extracted.image_url.as_deref(), Some("https://x.com/mine.png"));
    assert_eq!(extracted.clean_prompt, "inspired by https://a.com/ref.png");
}

#[test_case(PatternSet::Full, Some("https://a.com/x.png"); "full")]
#[test_case(PatternSet::Tagged, None; "tagged")]
#[test_case(PatternSet::TaggedOrAny, Some("https://a.com/x.png"); "tagged or any")]
fn test_pattern_sets_on_untagged_url(set: PatternSet, expected: Option<&str>) {
    let extractor = ContentExtractor::new(set.patterns(), &TagLabelSet::All.labels());
    assert_eq!(
        extractor.image_url("a harbor https://a.com/x.png").as_deref(),
        expected
    );
}

#[test]
fn test_label_set_restricts_recognized_tags() {
    let extractor = ContentExtractor::new(PatternSet::Tagged.patterns(), &[TagLabels::ENGLISH]);
    let extracted = extractor.extract("fox\n[图像URL: https://x.com/a.png]");
    assert_eq!(extracted.image_url, None);
    assert_eq!(extracted.clean_prompt, "fox\n[图像URL: https://x.com/a.png]");
}

#[test]
fn test_clean_prompt_has_no_known_tags() {
    let extractor = ContentExtractor::default();
    let openers: Vec<String> = TagLabelSet::All
        .labels()
        .iter()
        .flat_map(|labels| labels.all())
        .map(|label| format!("[{label}:"))
        .collect();
    for descriptor in SAMPLES {
        let clean_prompt = extractor.clean_prompt(descriptor);
        for opener in &openers {
            assert!(
                !clean_prompt.contains(opener.as_str()),
                "{clean_prompt:?} still contains {opener}"
            );
        }
    }
}

#[test]
fn test_clean_prompt_is_idempotent() {
    let extractor = ContentExtractor::default();
    for descriptor in SAMPLES {
        let once = extractor.clean_prompt(descriptor);
        let twice = extractor.extract(&once).clean_prompt;
        assert_eq!(once, twice, "re-extracting {descriptor:?}");
    }
}

#[test]
fn test_untagged_text_is_kept_whole() {
    let extractor = ContentExtractor::default();
    for descriptor in ["a red fox", "  spaced out\n\n", "brackets [are] fine", ""] {
        let extracted = extractor.extract(descriptor);
        assert_eq!(extracted.image_url, None);
        assert_eq!(extracted.clean_prompt, descriptor.trim());
    }
}

#[test]
fn test_extracted_content_json() {
    let extracted = ContentExtractor::default().extract("[image URL: https://a.com/x.png] fox");
    let json = serde_json::to_value(&extracted).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "imageUrl": "https://a.com/x.png", "cleanPrompt": "fox" })
    );
}
