// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use chrono::TimeZone as _;
use test_case::test_case;

use super::*;
use crate::extractor::ContentExtractor;

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_compose_without_image_keeps_prompt() {
    let descriptor = compose("a quiet harbor", None, &TagLabels::CHINESE, new_year());
    assert_eq!(descriptor, "a quiet harbor");
}

#[test]
fn test_compose_layout() {
    let image = ImageAttachment {
        url: "https://x.com/a.png".to_string(),
        model: Some("cogview-3".to_string()),
    };
    let descriptor = compose("九尾火狐", Some(&image), &TagLabels::CHINESE, new_year());
    assert_eq!(
        descriptor,
        "九尾火狐\n\n[图像URL: https://x.com/a.png]\n[生成模型: cogview-3]\n[生成时间: 2024-01-01T00:00:00.000Z]"
    );
}

#[test]
fn test_compose_defaults_model() {
    let image = ImageAttachment {
        url: "https://x.com/a.png".to_string(),
        model: None,
    };
    let descriptor = compose("harbor", Some(&image), &TagLabels::ENGLISH, new_year());
    assert!(descriptor.contains("[generation model: CogView-3]"));
    assert!(descriptor.contains("[image URL: https://x.com/a.png]"));
}

#[test_case(TagLabels::ENGLISH; "with english labels")]
#[test_case(TagLabels::CHINESE; "with chinese labels")]
fn test_compose_then_extract(labels: TagLabels) {
    let image = ImageAttachment {
        url: "https://cdn.example.com/images/fox.webp".to_string(),
        model: None,
    };
    let prompt = "A fox made of embers,\nwalking through snow";
    let descriptor = compose(prompt, Some(&image), &labels, new_year());

    let extracted = ContentExtractor::default().extract(&descriptor);
    assert_eq!(extracted.image_url.as_deref(), Some(image.url.as_str()));
    assert_eq!(extracted.clean_prompt, prompt);
}

#[test_case("plain prompt", "plain prompt"; "with plain text")]
#[test_case(r#"{"description":"from description","prompt":"from prompt"}"#, "from description"; "with description")]
#[test_case(r#"{"description":"","prompt":"from prompt"}"#, "from prompt"; "with empty description")]
#[test_case(r#"{"name":"PromptNFT #3"}"#, r#"{"name":"PromptNFT #3"}"#; "without known fields")]
#[test_case(r#"["not", "an", "object"]"#, r#"["not", "an", "object"]"#; "with json array")]
#[test_case("{broken json", "{broken json"; "with broken json")]
fn test_descriptor_from_content(raw: &str, expected: &str) {
    assert_eq!(descriptor_from_content(raw), expected);
}

#[test]
fn test_label_sets() {
    assert_eq!(TagLabelSet::All.labels().len(), 2);
    assert_eq!(TagLabelSet::English.labels(), vec![TagLabels::ENGLISH]);
    assert_eq!(TagLabelSet::All.writer_labels(), TagLabels::CHINESE);
    assert_eq!(TagLabelSet::English.writer_labels(), TagLabels::ENGLISH);
}
